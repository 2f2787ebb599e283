use keylight_core::{Config, Keyboard, OutputPort, Session};
use midir::SendError;
use midly::{
	Format, Header, MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind,
	num::{u4, u7, u15, u28},
};
use std::sync::{Arc, Mutex};

/// Remembers every message sent to the device.
#[derive(Clone, Debug, Default)]
pub struct Recorder(Arc<Mutex<Vec<Vec<u8>>>>);

impl Recorder {
	pub fn take(&self) -> Vec<Vec<u8>> {
		std::mem::take(&mut *self.0.lock().unwrap())
	}

	/// Messages sent on `channel`, ignoring everything else.
	pub fn take_channel(&self, channel: u8) -> Vec<Vec<u8>> {
		self.take()
			.into_iter()
			.filter(|message| message[0] & 0x0f == channel)
			.collect()
	}
}

impl OutputPort for Recorder {
	fn send(&mut self, bytes: &[u8]) -> Result<(), SendError> {
		self.0.lock().unwrap().push(bytes.to_vec());
		Ok(())
	}
}

/// A note as (key, start, end) in ticks.
pub type Span = (u8, u32, u32);

/// Encodes a format 1 file with one track per entry of `tracks`.
pub fn smf(resolution: u16, tracks: &[(&str, &[Span])]) -> Vec<u8> {
	let tracks = tracks
		.iter()
		.map(|&(name, notes)| {
			let mut events = Vec::new();
			for &(key, start, end) in notes {
				events.push((start, MidiMessage::NoteOn {
					key: u7::new(key),
					vel: u7::new(100),
				}));
				events.push((end, MidiMessage::NoteOff {
					key: u7::new(key),
					vel: u7::new(0),
				}));
			}
			events.sort_by_key(|&(tick, _)| tick);

			let mut track = vec![TrackEvent {
				delta: u28::new(0),
				kind: TrackEventKind::Meta(MetaMessage::TrackName(name.as_bytes())),
			}];

			let mut last = 0;
			for (tick, message) in events {
				track.push(TrackEvent {
					delta: u28::new(tick - last),
					kind: TrackEventKind::Midi {
						channel: u4::new(0),
						message,
					},
				});
				last = tick;
			}

			track.push(TrackEvent {
				delta: u28::new(0),
				kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
			});
			track
		})
		.collect();

	let smf = Smf {
		header: Header::new(Format::Parallel, Timing::Metrical(u15::new(resolution))),
		tracks,
	};

	let mut bytes = Vec::new();
	smf.write_std(&mut bytes).unwrap();
	bytes
}

/// Writes `bytes` to a fresh file in the temp directory.
pub fn temp_file(name: &str, bytes: &[u8]) -> std::path::PathBuf {
	let path = std::env::temp_dir().join(format!("keylight-{}-{name}.mid", std::process::id()));
	std::fs::write(&path, bytes).unwrap();
	path
}

/// A session without the ingestion lead, sending to a recorder.
pub fn session() -> (Session, Recorder) {
	let mut config = Config::default();
	config.ingest.tick_offset = 0;

	session_with(config)
}

/// A session using `config`, sending to a recorder.
pub fn session_with(config: Config) -> (Session, Recorder) {
	let recorder = Recorder::default();
	let keyboard = Keyboard::with_output(recorder.clone(), &config.keyboard);

	(Session::new(config, keyboard), recorder)
}
