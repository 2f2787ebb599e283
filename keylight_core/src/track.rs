use crate::Note;
use keylight_utils::unique_id;
use std::sync::Arc;

unique_id!(track_id);

pub use track_id::Id as TrackId;

/// A track of a loaded midi file. Notes keep the order in which their
/// note-off events were read.
#[derive(Clone, Debug)]
pub struct Track {
	pub id: TrackId,
	/// 1-based index of the track in the file, counting skipped tracks
	pub number: usize,
	/// the track-name meta event, or "Track N"
	pub name: Arc<str>,
	/// shown and considered at all
	pub active: bool,
	/// played by the session rather than by the user
	pub autoplay: bool,
	notes: Vec<Note>,
}

impl Track {
	#[must_use]
	pub(crate) fn new(number: usize) -> Self {
		Self {
			id: TrackId::unique(),
			number,
			name: format!("Track {number}").into(),
			active: true,
			autoplay: true,
			notes: Vec::new(),
		}
	}

	pub(crate) fn push(&mut self, note: Note) {
		debug_assert_eq!(note.track, self.id);
		self.notes.push(note);
	}

	#[must_use]
	pub fn notes(&self) -> &[Note] {
		&self.notes
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.notes.is_empty()
	}

	/// The user has to play this track: the session waits for its notes.
	#[must_use]
	pub const fn is_performed(&self) -> bool {
		self.active && !self.autoplay
	}

	#[must_use]
	pub const fn is_autoplayed(&self) -> bool {
		self.active && self.autoplay
	}
}
