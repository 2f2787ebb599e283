mod clock;
mod config;
mod error;
mod guide_lights;
mod keyboard;
mod midi_file;
mod note;
mod pitch;
mod repeats;
mod session;
mod time_signature;
mod track;
mod waiting_notes;

pub use clock::PlaybackClock;
pub use config::{CONFIG_PATH, ClockConfig, Config, IngestConfig, KeyboardConfig};
pub use error::{Error, Result};
pub use guide_lights::{GuideLights, LightDiff, project as project_lights};
pub use keyboard::{Keyboard, OutputPort, ShortMessage, preferred_port};
pub use midi_file::{Ingester, MidiFile, RawMessage, RawTrack, decode};
pub use note::{Note, Tick};
pub use pitch::{Key, Pitch};
pub use repeats::Repeats;
pub use session::{Event, Session};
pub use time_signature::TimeSignature;
pub use track::{Track, TrackId};
pub use waiting_notes::{Autoplay, WaitingNotes};
