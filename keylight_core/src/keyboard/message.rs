use crate::Pitch;

/// The short messages exchanged with the device. Everything else coming from
/// the device is ignored.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ShortMessage {
	NoteOn {
		channel: u8,
		pitch: Pitch,
		velocity: u8,
	},
	NoteOff {
		channel: u8,
		pitch: Pitch,
	},
	ProgramChange {
		channel: u8,
		program: u8,
	},
}

impl ShortMessage {
	/// Decodes raw bytes from the device. A note-on without velocity is a
	/// note-off.
	#[must_use]
	pub fn parse(bytes: &[u8]) -> Option<Self> {
		let (&status, data) = bytes.split_first()?;
		let channel = status & 0x0f;

		match (status & 0xf0, data) {
			(0x90, &[key, velocity, ..]) if velocity & 0x7f > 0 => Some(Self::NoteOn {
				channel,
				pitch: Pitch(key & 0x7f),
				velocity: velocity & 0x7f,
			}),
			(0x80 | 0x90, &[key, _, ..]) => Some(Self::NoteOff {
				channel,
				pitch: Pitch(key & 0x7f),
			}),
			(0xc0, &[program, ..]) => Some(Self::ProgramChange {
				channel,
				program: program & 0x7f,
			}),
			_ => None,
		}
	}

	#[must_use]
	pub fn to_bytes(self) -> Vec<u8> {
		match self {
			Self::NoteOn {
				channel,
				pitch,
				velocity,
			} => vec![0x90 | (channel & 0x0f), pitch.0 & 0x7f, velocity & 0x7f],
			Self::NoteOff { channel, pitch } => vec![0x80 | (channel & 0x0f), pitch.0 & 0x7f, 0],
			Self::ProgramChange { channel, program } => {
				vec![0xc0 | (channel & 0x0f), program & 0x7f]
			}
		}
	}
}
