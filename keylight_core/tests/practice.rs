mod common;

use common::{Span, session, session_with, smf, temp_file};
use keylight_core::{Config, Error, Event, Pitch, PlaybackClock};
use std::{collections::HashSet, time::Duration};

const MELODY: &[Span] = &[(69, 0, 480), (72, 480, 960)];
const BASS: &[Span] = &[(45, 0, 960)];

fn pitches<'a>(notes: impl IntoIterator<Item = &'a keylight_core::Note>) -> HashSet<u8> {
	notes.into_iter().map(|note| note.pitch.0).collect()
}

#[test]
fn notes_at_and_after_the_start() {
	let (mut session, _) = session();
	let path = temp_file("scenario", &smf(480, &[("Melody", MELODY)]));

	let file = session.load(&path).unwrap();
	assert_eq!(file.resolution(), 480);
	assert_eq!(file.duration(), 960);
	assert_eq!(file.tracks().len(), 1);
	assert_eq!(&*file.tracks()[0].name, "Melody");

	let at = session.notes_at(0);
	assert_eq!(pitches(&at), HashSet::from([69]));
	assert!(at.iter().all(|note| note.start == 0 && note.end == 480));

	let after = session.notes_after(0);
	assert_eq!(pitches(&after), HashSet::from([72]));
	assert!(after.iter().all(|note| note.start == 480));
}

#[test]
fn failed_load_keeps_the_session() {
	let (mut session, _) = session();
	session
		.load(temp_file("kept", &smf(480, &[("Melody", MELODY)])))
		.unwrap();
	session.handle(Event::PositionChanged(480));

	let garbage = temp_file("garbage", b"definitely not a midi file");
	assert!(matches!(session.load(&garbage), Err(Error::Parse(_))));

	let missing = std::env::temp_dir().join("keylight-this-file-does-not-exist.mid");
	assert!(matches!(session.load(&missing), Err(Error::Io { .. })));

	assert_eq!(session.tracks().len(), 1);
	assert_eq!(session.position(), 480);
	assert_eq!(session.file().duration(), 960);
}

#[test]
fn file_shorter_than_the_lead_loads_at_its_end() {
	let (mut session, _) = session_with(Config::default());
	let path = temp_file("short", &smf(480, &[("Hit", &[(60, 0, 10)])]));

	let file = session.load(&path).unwrap();
	assert_eq!(file.duration(), 0);

	assert_eq!(session.position(), 0);
	assert!(session.finished());

	session.handle(Event::PositionChanged(100));
	assert_eq!(session.position(), 0);
	session.page_backward();
	assert_eq!(session.position(), 0);
}

#[test]
fn loading_starts_over() {
	let (mut session, _) = session();
	let path = temp_file("restart", &smf(480, &[("Melody", MELODY)]));

	session.load(&path).unwrap();
	session.handle(Event::PositionChanged(500));
	session.mark_repeat();
	session.play_pause();

	session.load(&path).unwrap();

	assert_eq!(session.position(), 0);
	assert!(!session.playing());
	assert_eq!(session.repeats().count(), 0);
}

#[test]
fn only_the_latest_two_repeats_are_kept() {
	let (mut session, _) = session();
	session
		.load(temp_file("repeats", &smf(480, &[("Melody", MELODY)])))
		.unwrap();

	for position in [100, 200, 300] {
		session.handle(Event::PositionChanged(position));
		session.mark_repeat();
	}
	assert_eq!(session.repeats().collect::<Vec<_>>(), [200, 300]);

	session.play_pause();
	session.handle(Event::PositionChanged(400));
	assert_eq!(session.position(), 200);

	session.clear_repeats();
	assert_eq!(session.repeats().count(), 0);
	session.handle(Event::PositionChanged(400));
	assert_eq!(session.position(), 400);
}

#[test]
fn autoplayed_tracks_never_hold_playback() {
	let (mut session, _) = session();
	session
		.load(temp_file("autoplay", &smf(480, &[("Melody", MELODY), ("Bass", BASS)])))
		.unwrap();

	let mut position = 0;
	while position <= 960 {
		session.handle(Event::PositionChanged(position));
		assert!(!session.is_waiting(), "waiting at {position}");
		position += 7;
	}

	let melody = session.tracks()[0].id;
	session.set_autoplay(melody, false).unwrap();
	session.handle(Event::PositionChanged(0));
	session.handle(Event::PositionChanged(480));

	assert!(session.is_waiting());
	assert_eq!(pitches(&session.required()), HashSet::from([72]));
}

#[test]
fn early_keys_are_not_required_again() {
	let (mut session, _) = session();
	session
		.load(temp_file("early", &smf(480, &[("Melody", MELODY)])))
		.unwrap();

	let melody = session.tracks()[0].id;
	session.set_autoplay(melody, false).unwrap();

	session.handle(Event::KeyDown(Pitch(72)));
	session.handle(Event::KeyUp(Pitch(72)));
	session.handle(Event::PositionChanged(480));

	assert!(!session.is_waiting());
}

#[test]
fn resolving_a_wait_plays_the_accompaniment_once() {
	let (mut session, recorder) = session();
	// slow enough that no release arrives during the test
	session.handle(Event::TempoChanged(40));
	session
		.load(temp_file("resolve", &smf(480, &[
			("Melody", &[(69, 0, 480)]),
			("Bass", &[(45, 0, 480)]),
		])))
		.unwrap();

	let melody = session.tracks()[0].id;
	session.set_autoplay(melody, false).unwrap();

	session.handle(Event::PositionChanged(480));
	recorder.take();

	session.handle(Event::PositionChanged(0));
	assert!(session.is_waiting());
	assert!(recorder.take_channel(1).is_empty());

	session.handle(Event::KeyDown(Pitch(69)));
	assert!(!session.is_waiting());
	assert_eq!(
		recorder.take_channel(1),
		[vec![0xc1, 0], vec![0x81, 45, 0], vec![0x91, 45, 100]]
	);

	session.handle(Event::KeyDown(Pitch(69)));
	assert!(recorder.take_channel(1).is_empty());
}

#[test]
fn lights_point_at_the_next_chord() {
	let (mut session, recorder) = session();
	session
		.load(temp_file("lights", &smf(480, &[("Melody", MELODY)])))
		.unwrap();
	assert_eq!(session.lit(), &HashSet::from([Pitch(69)]));
	recorder.take();

	let melody = session.tracks()[0].id;
	session.set_autoplay(melody, false).unwrap();

	assert_eq!(session.lit(), &HashSet::from([Pitch(72)]));
	assert_eq!(
		recorder.take_channel(0),
		[vec![0x90, 72, 1], vec![0x90, 69, 0]]
	);
}

#[test]
fn transposing_lights_twice_changes_nothing() {
	let (mut session, recorder) = session();
	session
		.load(temp_file("transpose", &smf(480, &[("Melody", MELODY)])))
		.unwrap();
	recorder.take();

	session.transpose_lights(5).unwrap();
	let lit = session.lit().clone();
	let first = recorder.take();

	session.transpose_lights(5).unwrap();
	assert_eq!(session.lit(), &lit);
	assert_eq!(recorder.take(), first);
	assert_eq!(first.last(), Some(&vec![0x90, 74, 1]));

	assert!(matches!(session.transpose_lights(13), Err(Error::Transpose(13))));
	assert!(recorder.take().is_empty());
}

#[test]
fn clock_interval_stays_within_bounds() {
	let (mut session, _) = session();

	for tempo in [0, 39, 40, 65, 80, 81, u8::MAX] {
		session.handle(Event::TempoChanged(tempo));

		let interval = session.clock().interval();
		assert!(PlaybackClock::TEMPO_RANGE.contains(&session.clock().tempo()));
		assert!(interval >= Duration::from_millis(2));
		assert!(interval <= Duration::from_millis(42));
	}
}
