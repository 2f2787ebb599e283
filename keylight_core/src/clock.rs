use crate::{ClockConfig, Tick};
use std::{
	ops::RangeInclusive,
	time::{Duration, Instant},
};

/// Scrolls the position forward in small steps while playing.
///
/// The clock never sleeps itself: the owner asks for the [`deadline`] and
/// calls [`fire`] once it has passed. Every firing schedules the next one,
/// whether or not it moved the position.
///
/// [`deadline`]: Self::deadline
/// [`fire`]: Self::fire
#[derive(Clone, Copy, Debug)]
pub struct PlaybackClock {
	tempo: u8,
	scale: u8,
	step: Tick,
	initial_delay: Duration,
	playing: bool,
	deadline: Option<Instant>,
}

impl PlaybackClock {
	pub const TEMPO_RANGE: RangeInclusive<u8> = 40..=80;
	pub const SCALE_RANGE: RangeInclusive<u8> = 1..=8;

	#[must_use]
	pub fn new(tempo: u8, scale: u8, config: &ClockConfig) -> Self {
		Self {
			tempo: clamp(tempo, Self::TEMPO_RANGE),
			scale: clamp(scale, Self::SCALE_RANGE),
			step: config.step,
			initial_delay: Duration::from_millis(config.initial_delay_ms),
			playing: false,
			deadline: None,
		}
	}

	#[must_use]
	pub const fn tempo(&self) -> u8 {
		self.tempo
	}

	#[must_use]
	pub const fn scale(&self) -> u8 {
		self.scale
	}

	#[must_use]
	pub const fn playing(&self) -> bool {
		self.playing
	}

	#[must_use]
	pub const fn deadline(&self) -> Option<Instant> {
		self.deadline
	}

	/// Takes effect from the next firing on.
	pub fn set_tempo(&mut self, tempo: u8) {
		self.tempo = clamp(tempo, Self::TEMPO_RANGE);
	}

	pub fn set_scale(&mut self, scale: u8) {
		self.scale = clamp(scale, Self::SCALE_RANGE);
	}

	/// Time between two firings, from 2ms at the fastest tempo to 42ms at the
	/// slowest.
	#[must_use]
	pub fn interval(&self) -> Duration {
		Duration::from_millis(u64::from(82 - self.tempo))
	}

	/// Ticks moved per firing: whole display rows of `scale` ticks, at least
	/// one.
	#[must_use]
	pub fn step_ticks(&self) -> Tick {
		let scale = Tick::from(self.scale);

		(self.step / scale).max(1) * scale
	}

	/// How long `ticks` take to scroll past at the current rate.
	#[must_use]
	pub fn ticks_to_duration(&self, ticks: Tick) -> Duration {
		let millis = ticks.max(0) as u128 * self.interval().as_millis() / self.step_ticks() as u128;

		Duration::from_millis(millis as u64)
	}

	/// Starts or stops playback, returning whether it's playing now.
	pub fn toggle(&mut self, now: Instant) -> bool {
		if self.playing {
			self.stop();
		} else {
			self.start(now);
		}

		self.playing
	}

	/// Schedules the first firing after the initial delay, or right away if
	/// that delay is too far out to represent.
	pub fn start(&mut self, now: Instant) {
		self.playing = true;
		self.deadline = Some(now.checked_add(self.initial_delay).unwrap_or(now));
	}

	pub fn stop(&mut self) {
		self.playing = false;
		self.deadline = None;
	}

	/// Re-arms the clock and returns how far to move, unless playback is held
	/// back by `waiting`. Does nothing before the deadline.
	pub fn fire(&mut self, now: Instant, waiting: bool) -> Option<Tick> {
		let deadline = self.deadline?;
		if now < deadline {
			return None;
		}

		self.deadline = Some(now + self.interval());

		(!waiting).then(|| self.step_ticks())
	}
}

fn clamp(value: u8, range: RangeInclusive<u8>) -> u8 {
	value.clamp(*range.start(), *range.end())
}
