use crate::Tick;
use std::fmt::{Display, Formatter};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TimeSignature {
	pub numerator: u8,
	pub denominator: u32,
}

impl Default for TimeSignature {
	fn default() -> Self {
		Self {
			numerator: 4,
			denominator: 4,
		}
	}
}

impl TimeSignature {
	/// Midi stores the denominator as a power of two.
	#[must_use]
	pub const fn from_midi(numerator: u8, exponent: u8) -> Self {
		let exponent = if exponent > 31 { 31 } else { exponent };

		Self {
			numerator,
			denominator: 1 << exponent,
		}
	}

	/// Length of one bar for a file with `resolution` ticks per quarter note.
	#[must_use]
	pub fn ticks_per_bar(self, resolution: u16) -> Tick {
		Tick::from(resolution) * 4 * Tick::from(self.numerator) / Tick::from(self.denominator)
	}
}

impl Display for TimeSignature {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}/{}", self.numerator, self.denominator)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn denominator_is_a_power_of_two() {
		assert_eq!(TimeSignature::from_midi(6, 3), TimeSignature {
			numerator: 6,
			denominator: 8
		});
		assert_eq!(TimeSignature::from_midi(3, 2).to_string(), "3/4");
	}

	#[test]
	fn bar_length() {
		assert_eq!(TimeSignature::default().ticks_per_bar(480), 1920);
		assert_eq!(TimeSignature::from_midi(6, 3).ticks_per_bar(480), 1440);
		assert_eq!(TimeSignature::from_midi(2, 1).ticks_per_bar(96), 384);
	}
}
