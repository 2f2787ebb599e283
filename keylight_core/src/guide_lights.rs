use crate::{Error, MidiFile, Pitch, Result, Tick, WaitingNotes};
use std::{collections::HashSet, ops::RangeInclusive};

/// Pitches to light up at `position`.
///
/// While the user performs at least one track, this is what they have to play
/// now, or when nothing is required, the next chord they will have to play.
/// Otherwise the lights just follow every active note at the position.
#[must_use]
pub fn project(file: &MidiFile, waiting: &WaitingNotes, position: Tick) -> HashSet<Pitch> {
	if !file.any_performed() {
		return file
			.notes_at(position)
			.iter()
			.filter(|note| file.is_active(note))
			.map(|note| note.pitch)
			.collect();
	}

	if waiting.is_waiting(file) {
		waiting.required(file).map(|note| note.pitch).collect()
	} else {
		file.waitable_notes_after(position)
			.iter()
			.map(|note| note.pitch)
			.collect()
	}
}

/// Key numbers to switch on the device, in ascending order. When `clear` is
/// set, every light has to be switched off first.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct LightDiff {
	pub clear: bool,
	pub on: Vec<u8>,
	pub off: Vec<u8>,
}

impl LightDiff {
	#[must_use]
	pub fn is_empty(&self) -> bool {
		!self.clear && self.on.is_empty() && self.off.is_empty()
	}
}

/// The lit keys of the device, so that only changes have to be sent.
#[derive(Clone, Debug, Default)]
pub struct GuideLights {
	lit: HashSet<Pitch>,
	transpose: i8,
}

impl GuideLights {
	pub const TRANSPOSE_RANGE: RangeInclusive<i8> = -12..=12;

	#[must_use]
	pub fn lit(&self) -> &HashSet<Pitch> {
		&self.lit
	}

	#[must_use]
	pub const fn transpose(&self) -> i8 {
		self.transpose
	}

	pub fn update(&mut self, next: HashSet<Pitch>) -> LightDiff {
		let on = self.keys(next.difference(&self.lit));
		let off = self.keys(self.lit.difference(&next));
		self.lit = next;

		LightDiff {
			clear: false,
			on,
			off,
		}
	}

	/// Shifts every light by `semitones`, resending the whole set.
	pub fn set_transpose(&mut self, semitones: i8) -> Result<LightDiff> {
		if !Self::TRANSPOSE_RANGE.contains(&semitones) {
			return Err(Error::Transpose(semitones));
		}

		self.transpose = semitones;

		Ok(LightDiff {
			clear: true,
			on: self.keys(&self.lit),
			off: Vec::new(),
		})
	}

	/// Forgets the lit keys after the device has been cleared.
	pub fn clear(&mut self) {
		self.lit.clear();
	}

	fn keys<'a>(&self, pitches: impl IntoIterator<Item = &'a Pitch>) -> Vec<u8> {
		let mut keys: Vec<_> = pitches
			.into_iter()
			.filter_map(|pitch| pitch.transpose(self.transpose))
			.map(|pitch| pitch.0)
			.collect();
		keys.sort_unstable();
		keys
	}
}
