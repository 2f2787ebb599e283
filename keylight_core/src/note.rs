use crate::{Pitch, TrackId};
use std::fmt::{Display, Formatter};

/// Time in midi ticks from the beginning of the file. Ingestion applies a
/// negative lead, so the first notes may start slightly below zero.
pub type Tick = i64;

/// A closed note from a midi file. Two notes are only equal if they also
/// belong to the same track.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Note {
	pub pitch: Pitch,
	pub velocity: u8,
	pub track: TrackId,
	pub start: Tick,
	pub end: Tick,
}

impl Note {
	#[must_use]
	pub const fn duration(self) -> Tick {
		self.end - self.start
	}

	/// Whether the note is sounding at `tick`. The end is exclusive, so a
	/// zero-length note never sounds.
	#[must_use]
	pub const fn contains(self, tick: Tick) -> bool {
		self.start <= tick && tick < self.end
	}

	#[must_use]
	pub fn transpose(self, semitones: i8) -> Option<Self> {
		Some(Self {
			pitch: self.pitch.transpose(semitones)?,
			..self
		})
	}
}

impl Display for Note {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"{} ({}) {} - {}",
			self.pitch, self.velocity, self.start, self.end
		)
	}
}
