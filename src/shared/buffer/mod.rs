mod buffer;

pub use buffer::*;

/// Alias used throughout the wire codec. A plain bits/bytes cursor
/// over an owned buffer, read from the front and written by appending.
pub type BitsBuf = BitsBuffer;
