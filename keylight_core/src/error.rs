use crate::TrackId;
use std::{io, path::PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
	/// The midi file couldn't be read from disk.
	#[error("couldn't read {}: {source}", path.display())]
	Io { path: PathBuf, source: io::Error },

	/// The midi container is corrupt or uses an unsupported layout.
	#[error("malformed midi file: {0}")]
	Parse(#[from] midly::Error),

	/// A pitch name such as `C#4` that doesn't name a key.
	#[error("invalid pitch name {0:?}")]
	PitchName(String),

	/// Guide lights can be shifted by at most an octave either way.
	#[error("light transpose {0} is outside -12..=12")]
	Transpose(i8),

	#[error("no track {0} in the loaded file")]
	UnknownTrack(TrackId),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
