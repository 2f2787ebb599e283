use crate::{
	Autoplay, Config, Error, GuideLights, Keyboard, MidiFile, Note, Pitch, PlaybackClock, Repeats,
	Result, Tick, Track, TrackId, WaitingNotes, guide_lights,
};
use async_channel::Receiver;
use log::{info, trace, warn};
use smol::{Timer, future};
use std::{
	collections::{BTreeSet, HashSet},
	path::Path,
	time::Instant,
};

mod event;

pub use event::Event;

/// A practice session over one loaded file.
///
/// Owns all of the playback state and is driven from a single thread, either
/// by calling the handlers directly or through [`Session::run_to_end`].
#[derive(Debug)]
pub struct Session {
	config: Config,
	file: MidiFile,
	position: Tick,
	/// the notes sounding at the previous position
	previous: HashSet<Note>,
	waiting: WaitingNotes,
	lights: GuideLights,
	repeats: Repeats,
	clock: PlaybackClock,
	keyboard: Keyboard,
	pressed: BTreeSet<Pitch>,
}

enum Wake {
	Event(Event),
	Closed,
	Fire,
}

impl Session {
	#[must_use]
	pub fn new(config: Config, keyboard: Keyboard) -> Self {
		let clock = PlaybackClock::new(config.tempo, config.scale, &config.clock);

		Self {
			config,
			file: MidiFile::default(),
			position: 0,
			previous: HashSet::new(),
			waiting: WaitingNotes::default(),
			lights: GuideLights::default(),
			repeats: Repeats::default(),
			clock,
			keyboard,
			pressed: BTreeSet::new(),
		}
	}

	/// Replaces the loaded file. On failure the session stays as it was.
	pub fn load(&mut self, path: impl AsRef<Path>) -> Result<&MidiFile> {
		let file = MidiFile::open(path, &self.config.ingest)?;
		self.set_file(file);

		Ok(&self.file)
	}

	/// Starts over with `file`, stopped at the beginning.
	pub fn set_file(&mut self, file: MidiFile) {
		self.clock.stop();
		self.repeats.clear();
		self.waiting.reset();
		self.previous.clear();
		self.lights.clear();
		self.keyboard.clear_lights();

		self.file = file;
		self.position = 0;
		self.on_position_changed(0);
	}

	#[must_use]
	pub const fn file(&self) -> &MidiFile {
		&self.file
	}

	#[must_use]
	pub fn tracks(&self) -> &[Track] {
		self.file.tracks()
	}

	pub fn set_active(&mut self, track: TrackId, active: bool) -> Result<()> {
		self.track_mut(track)?.active = active;
		self.flags_changed();

		Ok(())
	}

	pub fn set_autoplay(&mut self, track: TrackId, autoplay: bool) -> Result<()> {
		self.track_mut(track)?.autoplay = autoplay;
		self.flags_changed();

		Ok(())
	}

	fn track_mut(&mut self, id: TrackId) -> Result<&mut Track> {
		self.file.track_mut(id).ok_or_else(|| {
			warn!("no track {id} to change");
			Error::UnknownTrack(id)
		})
	}

	fn flags_changed(&mut self) {
		if let Some(autoplay) = self.waiting.refresh(&self.file) {
			play(&self.keyboard, &self.clock, &self.file, &autoplay);
		}

		self.refresh_lights();
	}

	#[must_use]
	pub fn notes_at(&self, position: Tick) -> HashSet<Note> {
		self.file.notes_at(position)
	}

	#[must_use]
	pub fn notes_after(&self, position: Tick) -> HashSet<Note> {
		self.file.notes_after(position)
	}

	pub fn handle(&mut self, event: Event) {
		trace!("{event:?}");

		match event {
			Event::KeyDown(pitch) => self.on_key_down(pitch),
			Event::KeyUp(pitch) => self.on_key_up(pitch),
			Event::PositionChanged(position) => self.on_position_changed(position),
			Event::TempoChanged(tempo) => self.on_tempo_changed(tempo),
			Event::ScaleChanged(scale) => self.on_scale_changed(scale),
		}
	}

	pub fn on_position_changed(&mut self, position: Tick) {
		let position = if self.clock.playing() {
			self.repeats.rewind(position).unwrap_or(position)
		} else {
			position
		};
		self.position = position.clamp(0, self.file.duration());

		let notes = self.file.notes_at(self.position);
		let new_notes: Vec<_> = notes.difference(&self.previous).copied().collect();

		self.waiting
			.position_changed(new_notes.iter().copied(), &self.file);

		let autoplay = Autoplay { notes: new_notes };
		if let Some(autoplay) = self.waiting.set_autoplay(autoplay, &self.file) {
			play(&self.keyboard, &self.clock, &self.file, &autoplay);
		}

		self.previous = notes;
		self.refresh_lights();
	}

	pub fn on_tempo_changed(&mut self, tempo: u8) {
		self.clock.set_tempo(tempo);
	}

	pub fn on_scale_changed(&mut self, scale: u8) {
		self.clock.set_scale(scale);
	}

	pub fn on_key_down(&mut self, pitch: Pitch) {
		self.pressed.insert(pitch);

		if let Some(autoplay) = self.waiting.key_down(pitch, &self.file) {
			play(&self.keyboard, &self.clock, &self.file, &autoplay);
		}

		self.refresh_lights();
	}

	pub fn on_key_up(&mut self, pitch: Pitch) {
		self.pressed.remove(&pitch);
	}

	pub fn mark_repeat(&mut self) {
		self.repeats.mark(self.position);
	}

	pub fn clear_repeats(&mut self) {
		self.repeats.clear();
	}

	pub fn transpose_lights(&mut self, semitones: i8) -> Result<()> {
		let diff = self.lights.set_transpose(semitones)?;
		self.keyboard.set_lights(&diff);

		Ok(())
	}

	/// Switches off every light on the device. They come back with the next
	/// change.
	pub fn clear_lights(&mut self) {
		self.keyboard.clear_lights();
		self.lights.clear();
	}

	/// Returns whether the session is playing now.
	pub fn play_pause(&mut self) -> bool {
		self.clock.toggle(Instant::now())
	}

	pub fn page_forward(&mut self) {
		self.on_position_changed(self.position + self.config.clock.page);
	}

	pub fn page_backward(&mut self) {
		self.on_position_changed(self.position - self.config.clock.page);
	}

	/// Advances the position if the clock is due and nothing is being waited
	/// for. Returns whether the clock was due.
	pub fn fire(&mut self, now: Instant) -> bool {
		let was_due = self.clock.deadline().is_some_and(|deadline| deadline <= now);
		let waiting = self.waiting.is_waiting(&self.file);

		if let Some(step) = self.clock.fire(now, waiting) {
			self.on_position_changed(self.position + step);
		}

		was_due
	}

	fn refresh_lights(&mut self) {
		let next = guide_lights::project(&self.file, &self.waiting, self.position);
		let diff = self.lights.update(next);

		if !diff.is_empty() {
			self.keyboard.set_lights(&diff);
		}
	}

	#[must_use]
	pub const fn position(&self) -> Tick {
		self.position
	}

	#[must_use]
	pub const fn playing(&self) -> bool {
		self.clock.playing()
	}

	#[must_use]
	pub const fn clock(&self) -> &PlaybackClock {
		&self.clock
	}

	#[must_use]
	pub fn is_waiting(&self) -> bool {
		self.waiting.is_waiting(&self.file)
	}

	/// The notes the user still has to play before playback goes on.
	#[must_use]
	pub fn required(&self) -> HashSet<Note> {
		self.waiting.required(&self.file).copied().collect()
	}

	/// Keys currently held down on the keyboard.
	#[must_use]
	pub const fn pressed(&self) -> &BTreeSet<Pitch> {
		&self.pressed
	}

	/// Pitches whose guide lights are on, before transposing.
	#[must_use]
	pub fn lit(&self) -> &HashSet<Pitch> {
		self.lights.lit()
	}

	pub fn repeats(&self) -> impl Iterator<Item = Tick> + '_ {
		self.repeats.marks()
	}

	/// Whether playback has nowhere left to go.
	#[must_use]
	pub fn finished(&self) -> bool {
		self.position >= self.file.duration()
			&& !self.is_waiting()
			&& self
				.repeats
				.rewind(self.position + self.clock.step_ticks())
				.is_none()
	}

	/// Handles events from `inbox` and fires the clock until the inbox is
	/// closed, or playback has reached the end of the file.
	pub fn run_to_end(&mut self, inbox: &Receiver<Event>) {
		smol::block_on(async {
			loop {
				if self.playing() && self.finished() {
					info!("reached the end at tick {}", self.position);
					return;
				}

				let timer = self.clock.deadline().map_or_else(Timer::never, Timer::at);

				let wake = future::or(
					async { inbox.recv().await.map_or(Wake::Closed, Wake::Event) },
					async {
						timer.await;
						Wake::Fire
					},
				)
				.await;

				match wake {
					Wake::Event(event) => self.handle(event),
					Wake::Closed => return,
					Wake::Fire => {
						self.fire(Instant::now());
					}
				}
			}
		});
	}

	pub fn close(self) {
		self.keyboard.close();
	}
}

/// Plays the notes of `autoplay` whose tracks are autoplayed right now.
fn play(keyboard: &Keyboard, clock: &PlaybackClock, file: &MidiFile, autoplay: &Autoplay) {
	for note in autoplay.notes.iter().filter(|note| file.is_autoplayed(note)) {
		keyboard.play(
			note.pitch,
			note.velocity,
			clock.ticks_to_duration(note.duration()),
		);
	}
}
