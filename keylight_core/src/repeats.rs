use crate::Tick;
use std::collections::VecDeque;

/// Up to two marked positions. With both set, playback loops between them.
#[derive(Clone, Debug, Default)]
pub struct Repeats {
	marks: VecDeque<Tick>,
}

impl Repeats {
	const MAX: usize = 2;

	/// Marks `position`, forgetting the oldest mark if there already are two.
	/// Marking the same position twice has no effect.
	pub fn mark(&mut self, position: Tick) {
		if self.marks.contains(&position) {
			return;
		}

		if self.marks.len() == Self::MAX {
			self.marks.pop_front();
		}

		self.marks.push_back(position);
	}

	pub fn clear(&mut self) {
		self.marks.clear();
	}

	/// Marks from oldest to newest.
	pub fn marks(&self) -> impl Iterator<Item = Tick> + '_ {
		self.marks.iter().copied()
	}

	/// Where to jump when playback has moved past the loop. The loop runs from
	/// the earlier to the later mark regardless of the order they were set in.
	#[must_use]
	pub fn rewind(&self, position: Tick) -> Option<Tick> {
		if self.marks.len() < Self::MAX {
			return None;
		}

		let start = self.marks.iter().copied().min()?;
		let end = self.marks.iter().copied().max()?;

		(position > end).then_some(start)
	}
}
