mod no_debug;
mod unique_id;
mod variants;

pub use no_debug::NoDebug;
