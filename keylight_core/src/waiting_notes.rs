use crate::{MidiFile, Note, Pitch};
use log::trace;
use std::collections::HashSet;

/// Notes to play once the user has caught up.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Autoplay {
	pub notes: Vec<Note>,
}

#[derive(Clone, Debug)]
enum State {
	/// nothing to wait for; keys pressed now count for the next position
	Idle { early: HashSet<Pitch> },
	Waiting { required: Vec<Note> },
}

impl Default for State {
	fn default() -> Self {
		Self::Idle {
			early: HashSet::new(),
		}
	}
}

/// Holds playback back until every waitable note entering at the current
/// position has been played.
///
/// Whether a note is waitable is looked up in the file on every query, so
/// flag changes take effect without recomputing the required set.
#[derive(Clone, Debug, Default)]
pub struct WaitingNotes {
	state: State,
	pending: Option<Autoplay>,
}

impl WaitingNotes {
	/// `new_notes` are the notes that weren't in scope at the previous
	/// position.
	pub fn position_changed(
		&mut self,
		new_notes: impl IntoIterator<Item = Note>,
		file: &MidiFile,
	) {
		let mut required: Vec<_> = new_notes
			.into_iter()
			.filter(|note| file.is_waitable(note))
			.collect();

		if required.is_empty() {
			if let State::Waiting { .. } = self.state {
				self.state = State::default();
			}
			return;
		}

		if let State::Idle { early } = &self.state {
			required.retain(|note| !early.contains(&note.pitch));
		}

		trace!("waiting for {} notes", required.len());

		self.state = if required.is_empty() {
			State::default()
		} else {
			State::Waiting { required }
		};
	}

	/// Returns the pending autoplay batch if this key was the last one
	/// missing.
	pub fn key_down(&mut self, pitch: Pitch, file: &MidiFile) -> Option<Autoplay> {
		match &mut self.state {
			State::Idle { early } => {
				early.insert(pitch);
				None
			}
			State::Waiting { required } => {
				required.retain(|note| note.pitch != pitch);
				self.refresh(file)
			}
		}
	}

	/// Registers the batch to play when the current wait ends, replacing any
	/// earlier one. When nothing is being waited for, it's handed back right
	/// away.
	pub fn set_autoplay(&mut self, autoplay: Autoplay, file: &MidiFile) -> Option<Autoplay> {
		self.pending = Some(autoplay);

		if self.is_waiting(file) {
			None
		} else {
			self.pending.take()
		}
	}

	/// Ends the wait if track flag changes left no waitable note behind.
	pub fn refresh(&mut self, file: &MidiFile) -> Option<Autoplay> {
		if !matches!(self.state, State::Waiting { .. }) || self.is_waiting(file) {
			return None;
		}

		self.state = State::default();
		self.pending.take()
	}

	#[must_use]
	pub fn is_waiting(&self, file: &MidiFile) -> bool {
		self.required(file).next().is_some()
	}

	/// Required notes whose tracks are still waitable.
	pub fn required<'a>(&'a self, file: &'a MidiFile) -> impl Iterator<Item = &'a Note> {
		let required = match &self.state {
			State::Idle { .. } => &[][..],
			State::Waiting { required } => required.as_slice(),
		};

		required.iter().filter(|note| file.is_waitable(note))
	}

	pub fn reset(&mut self) {
		*self = Self::default();
	}
}
