//! Audio buffer and file decoding helpers.

pub mod buffer;
pub mod decoder;
