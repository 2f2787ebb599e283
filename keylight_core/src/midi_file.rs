use crate::{
	Error, IngestConfig, Note, Pitch, Result, Tick, TimeSignature, Track, TrackId,
};
use log::{debug, info};
use midly::{MetaMessage, MidiMessage, Timing, TrackEventKind};
use std::{
	collections::{HashMap, HashSet},
	fs,
	path::Path,
};

/// A track event reduced to what ingestion looks at.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RawMessage {
	NoteOn { channel: u8, key: u8, velocity: u8 },
	NoteOff { channel: u8, key: u8 },
	TrackName(Vec<u8>),
	TimeSignature { numerator: u8, exponent: u8 },
}

impl RawMessage {
	fn from_midly(kind: TrackEventKind<'_>) -> Option<Self> {
		match kind {
			TrackEventKind::Midi {
				channel,
				message: MidiMessage::NoteOn { key, vel },
			} => Some(Self::NoteOn {
				channel: channel.as_int(),
				key: key.as_int(),
				velocity: vel.as_int(),
			}),
			TrackEventKind::Midi {
				channel,
				message: MidiMessage::NoteOff { key, .. },
			} => Some(Self::NoteOff {
				channel: channel.as_int(),
				key: key.as_int(),
			}),
			TrackEventKind::Meta(MetaMessage::TrackName(name)) => {
				Some(Self::TrackName(name.to_vec()))
			}
			TrackEventKind::Meta(MetaMessage::TimeSignature(numerator, exponent, ..)) => {
				Some(Self::TimeSignature {
					numerator,
					exponent,
				})
			}
			_ => None,
		}
	}
}

/// The events of one track at absolute ticks, in file order.
pub type RawTrack = Vec<(Tick, RawMessage)>;

/// Decodes a standard midi file into its resolution and raw tracks. Every
/// track starts counting at tick 0.
pub fn decode(bytes: &[u8]) -> Result<(u16, Vec<RawTrack>)> {
	let (header, tracks) = midly::parse(bytes)?;

	let resolution = match header.timing {
		Timing::Metrical(ticks_per_beat) => ticks_per_beat.as_int(),
		Timing::Timecode(_, ticks_per_frame) => u16::from(ticks_per_frame),
	};

	let mut raw_tracks = Vec::new();
	for track in tracks {
		let mut tick: Tick = 0;
		let mut raw_track = RawTrack::new();

		for event in track? {
			let event = event?;
			tick += Tick::from(event.delta.as_int());

			if let Some(message) = RawMessage::from_midly(event.kind) {
				raw_track.push((tick, message));
			}
		}

		raw_tracks.push(raw_track);
	}

	Ok((resolution, raw_tracks))
}

/// Pairs note-on and note-off events into closed notes.
#[derive(Clone, Copy, Debug)]
pub struct Ingester {
	tick_offset: Tick,
}

impl Ingester {
	#[must_use]
	pub const fn new(config: &IngestConfig) -> Self {
		Self {
			tick_offset: config.tick_offset,
		}
	}

	/// Builds a file from decoded tracks. Tracks without a single closed note
	/// are left out, but still count towards the track numbers.
	///
	/// A second note-on for a key that is already held on the same channel
	/// replaces the held note, which is then lost. Notes still held when their
	/// track ends are dropped.
	#[must_use]
	pub fn ingest(&self, resolution: u16, raw_tracks: impl IntoIterator<Item = RawTrack>) -> MidiFile {
		let mut time_signature = TimeSignature::default();
		let mut tracks = Vec::new();

		for (number, raw_track) in (1..).zip(raw_tracks) {
			let mut track = Track::new(number);
			let mut held = HashMap::<(u8, u8), Note>::new();

			for (tick, message) in raw_track {
				let tick = tick + self.tick_offset;

				match message {
					RawMessage::NoteOn {
						channel,
						key,
						velocity,
					} if velocity > 0 => {
						let note = Note {
							pitch: Pitch(key & 0x7f),
							velocity: velocity & 0x7f,
							track: track.id,
							start: tick,
							end: tick,
						};

						if let Some(replaced) = held.insert((key, channel), note) {
							debug!("note {replaced} in track {number} was never released");
						}
					}
					RawMessage::NoteOn { channel, key, .. } | RawMessage::NoteOff { channel, key } => {
						if let Some(mut note) = held.remove(&(key, channel)) {
							note.end = tick.max(note.start);
							track.push(note);
						}
					}
					RawMessage::TrackName(text) => {
						let name = String::from_utf8_lossy(&text);
						let name = name.trim_matches(|c: char| c == '\0' || c.is_whitespace());

						if !name.is_empty() {
							track.name = name.into();
						}
					}
					RawMessage::TimeSignature {
						numerator,
						exponent,
					} => time_signature = TimeSignature::from_midi(numerator, exponent),
				}
			}

			if !held.is_empty() {
				debug!("dropping {} unreleased notes in track {number}", held.len());
			}

			if track.is_empty() {
				debug!("skipping track {number} without notes");
			} else {
				tracks.push(track);
			}
		}

		MidiFile::new(resolution, tracks, time_signature)
	}
}

/// A loaded midi file. Replaced as a whole when another file is loaded; only
/// the track flags change in place.
#[derive(Clone, Debug)]
pub struct MidiFile {
	resolution: u16,
	tracks: Vec<Track>,
	time_signature: TimeSignature,
	duration: Tick,
}

impl Default for MidiFile {
	fn default() -> Self {
		Self::new(480, Vec::new(), TimeSignature::default())
	}
}

impl MidiFile {
	#[must_use]
	pub fn new(resolution: u16, tracks: Vec<Track>, time_signature: TimeSignature) -> Self {
		let duration = tracks
			.iter()
			.flat_map(Track::notes)
			.map(|note| note.end)
			.max()
			.unwrap_or_default()
			.max(0);

		Self {
			resolution,
			tracks,
			time_signature,
			duration,
		}
	}

	pub fn open(path: impl AsRef<Path>, config: &IngestConfig) -> Result<Self> {
		let path = path.as_ref();

		let bytes = fs::read(path).map_err(|source| Error::Io {
			path: path.to_owned(),
			source,
		})?;

		let file = Self::parse(&bytes, config)?;

		info!(
			"loaded {}: {} tracks, resolution {}, {} ticks in {}",
			path.display(),
			file.tracks.len(),
			file.resolution,
			file.duration,
			file.time_signature,
		);

		Ok(file)
	}

	pub fn parse(bytes: &[u8], config: &IngestConfig) -> Result<Self> {
		let (resolution, raw_tracks) = decode(bytes)?;

		Ok(Ingester::new(config).ingest(resolution, raw_tracks))
	}

	/// Ticks per quarter note.
	#[must_use]
	pub const fn resolution(&self) -> u16 {
		self.resolution
	}

	#[must_use]
	pub fn tracks(&self) -> &[Track] {
		&self.tracks
	}

	#[must_use]
	pub const fn time_signature(&self) -> TimeSignature {
		self.time_signature
	}

	/// The latest end of any note.
	#[must_use]
	pub const fn duration(&self) -> Tick {
		self.duration
	}

	#[must_use]
	pub fn track(&self, id: TrackId) -> Option<&Track> {
		self.tracks.iter().find(|track| track.id == id)
	}

	pub(crate) fn track_mut(&mut self, id: TrackId) -> Option<&mut Track> {
		self.tracks.iter_mut().find(|track| track.id == id)
	}

	pub fn notes(&self) -> impl Iterator<Item = &Note> + Clone {
		self.tracks.iter().flat_map(Track::notes)
	}

	#[must_use]
	pub fn is_active(&self, note: &Note) -> bool {
		self.track(note.track).is_some_and(|track| track.active)
	}

	/// Whether the session has to wait for the user to play `note`.
	#[must_use]
	pub fn is_waitable(&self, note: &Note) -> bool {
		self.track(note.track).is_some_and(Track::is_performed)
	}

	#[must_use]
	pub fn is_autoplayed(&self, note: &Note) -> bool {
		self.track(note.track).is_some_and(Track::is_autoplayed)
	}

	/// Whether any active track has to be played by the user.
	#[must_use]
	pub fn any_performed(&self) -> bool {
		self.tracks.iter().any(Track::is_performed)
	}

	/// Every note sounding at `tick`, regardless of the track flags.
	#[must_use]
	pub fn notes_at(&self, tick: Tick) -> HashSet<Note> {
		self.notes().filter(|note| note.contains(tick)).copied().collect()
	}

	/// The notes with the earliest start strictly after `tick`.
	#[must_use]
	pub fn notes_after(&self, tick: Tick) -> HashSet<Note> {
		next_notes(self.notes(), tick)
	}

	/// Like [`Self::notes_after`], but only considering waitable notes.
	#[must_use]
	pub fn waitable_notes_after(&self, tick: Tick) -> HashSet<Note> {
		next_notes(self.notes().filter(|note| self.is_waitable(note)), tick)
	}
}

fn next_notes<'a>(notes: impl Iterator<Item = &'a Note> + Clone, tick: Tick) -> HashSet<Note> {
	let Some(next) = notes
		.clone()
		.map(|note| note.start)
		.filter(|&start| start > tick)
		.min()
	else {
		return HashSet::new();
	};

	notes.filter(|note| note.start == next).copied().collect()
}
