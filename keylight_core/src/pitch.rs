use crate::Error;
use keylight_utils::variants;
use std::{
	fmt::{Display, Formatter},
	ops::RangeInclusive,
	str::FromStr,
};

variants! {
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Key {
	C,
	CSharp,
	D,
	DSharp,
	E,
	F,
	FSharp,
	G,
	GSharp,
	A,
	ASharp,
	B,
}
}

impl Key {
	#[must_use]
	pub const fn is_black(self) -> bool {
		matches!(
			self,
			Self::CSharp | Self::DSharp | Self::FSharp | Self::GSharp | Self::ASharp
		)
	}

	/// Line or space on the staff within an octave, counted from C.
	/// Sharps share the position of their natural.
	#[must_use]
	pub const fn degree(self) -> i32 {
		match self {
			Self::C | Self::CSharp => 0,
			Self::D | Self::DSharp => 1,
			Self::E => 2,
			Self::F | Self::FSharp => 3,
			Self::G | Self::GSharp => 4,
			Self::A | Self::ASharp => 5,
			Self::B => 6,
		}
	}

	const fn name(self) -> &'static str {
		match self {
			Self::C => "C",
			Self::CSharp => "C#",
			Self::D => "D",
			Self::DSharp => "D#",
			Self::E => "E",
			Self::F => "F",
			Self::FSharp => "F#",
			Self::G => "G",
			Self::GSharp => "G#",
			Self::A => "A",
			Self::ASharp => "A#",
			Self::B => "B",
		}
	}
}

impl Display for Key {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.name())
	}
}

/// A single key on a keyboard, identified by its midi key number.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Pitch(pub u8);

impl Pitch {
	pub const MIDDLE_C: Self = Self(60);
	pub const MAX: Self = Self(127);

	/// Keys of a standard 88-key piano, A0 to C8.
	pub const PIANO: RangeInclusive<u8> = 21..=108;

	#[must_use]
	pub fn key(self) -> Key {
		Key::VARIANTS[usize::from(self.0 % 12)]
	}

	#[must_use]
	pub const fn octave(self) -> i8 {
		(self.0 / 12) as i8 - 1
	}

	#[must_use]
	pub fn is_black(self) -> bool {
		self.key().is_black()
	}

	#[must_use]
	pub fn is_on_piano(self) -> bool {
		Self::PIANO.contains(&self.0)
	}

	/// Position on the grand staff relative to middle C, in lines and spaces.
	/// `C4` and `C#4` are 0, `D4` is 1 and `B3` is -1.
	#[must_use]
	pub fn staff_position(self) -> i32 {
		self.key().degree() + (i32::from(self.octave()) - 4) * 7
	}

	/// The pitch `semitones` away, or `None` outside of 0..=127.
	#[must_use]
	pub fn transpose(self, semitones: i8) -> Option<Self> {
		let raw = i16::from(self.0) + i16::from(semitones);

		u8::try_from(raw)
			.ok()
			.filter(|&raw| raw <= Self::MAX.0)
			.map(Self)
	}
}

impl Display for Pitch {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}{}", self.key(), self.octave())
	}
}

impl FromStr for Pitch {
	type Err = Error;

	/// Parses names such as `A#0` or `c4`; the octave must be a single digit
	/// from 0 to 8.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let invalid = || Error::PitchName(s.to_owned());

		let mut chars = s.chars();
		let octave = chars
			.next_back()
			.and_then(|c| c.to_digit(10))
			.filter(|&octave| octave <= 8)
			.ok_or_else(invalid)?;

		let name = chars.as_str().to_uppercase();
		let key = Key::VARIANTS
			.iter()
			.find(|key| key.name() == name)
			.ok_or_else(invalid)?;

		Ok(Self(octave as u8 * 12 + 12 + key.index() as u8))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn names_and_octaves() {
		assert_eq!(Pitch(69).to_string(), "A4");
		assert_eq!(Pitch(21).to_string(), "A0");
		assert_eq!(Pitch(61).to_string(), "C#4");
		assert_eq!(Pitch(60).octave(), 4);
		assert_eq!(Pitch(59).octave(), 3);
		assert_eq!(Pitch(0).octave(), -1);
	}

	#[test]
	fn black_keys() {
		let black: Vec<_> = (60..72).map(Pitch).filter(|p| p.is_black()).collect();

		assert_eq!(black, [Pitch(61), Pitch(63), Pitch(66), Pitch(68), Pitch(70)]);
	}

	#[test]
	fn staff_positions_are_relative_to_middle_c() {
		assert_eq!(Pitch::MIDDLE_C.staff_position(), 0);
		assert_eq!("C#4".parse::<Pitch>().unwrap().staff_position(), 0);
		assert_eq!("D4".parse::<Pitch>().unwrap().staff_position(), 1);
		assert_eq!("B3".parse::<Pitch>().unwrap().staff_position(), -1);
		assert_eq!("C5".parse::<Pitch>().unwrap().staff_position(), 7);
		assert_eq!("A0".parse::<Pitch>().unwrap().staff_position(), -23);
	}

	#[test]
	fn parses_names() {
		assert_eq!("A4".parse::<Pitch>().unwrap(), Pitch(69));
		assert_eq!("a#0".parse::<Pitch>().unwrap(), Pitch(22));
		assert_eq!("C8".parse::<Pitch>().unwrap(), Pitch(108));
		assert_eq!("C0".parse::<Pitch>().unwrap(), Pitch(12));
	}

	#[test]
	fn rejects_malformed_names() {
		for name in ["", "4", "C", "C9", "H4", "Cb4", "C#-1", "CC4"] {
			assert!(
				matches!(name.parse::<Pitch>(), Err(Error::PitchName(n)) if n == name),
				"{name:?} should be rejected"
			);
		}
	}

	#[test]
	fn transpose_stays_in_midi_range() {
		assert_eq!(Pitch(60).transpose(12), Some(Pitch(72)));
		assert_eq!(Pitch(60).transpose(-12), Some(Pitch(48)));
		assert_eq!(Pitch(120).transpose(12), None);
		assert_eq!(Pitch(3).transpose(-4), None);
	}

	#[test]
	fn equality_is_by_key_number() {
		assert_eq!("G#2".parse::<Pitch>().unwrap(), Pitch(44));
		assert!(Pitch(44).is_on_piano());
		assert!(!Pitch(12).is_on_piano());
	}
}
