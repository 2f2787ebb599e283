use crate::{Pitch, Tick};

/// Everything that can happen to a session from the outside. Events from the
/// keyboard and the user interface are all funneled through [`Session::handle`].
///
/// [`Session::handle`]: crate::Session::handle
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Event {
	KeyDown(Pitch),
	KeyUp(Pitch),
	/// the view was scrolled to this tick
	PositionChanged(Tick),
	TempoChanged(u8),
	ScaleChanged(u8),
}
