#![doc = include_str!("../README.md")]

// private mods (will be partly re-exported)
mod buffer;
mod engine;
mod envelope;
mod error;
mod panning;
mod parameters;
mod playhead;
mod pool;
mod randomizer;
mod scheduler;

// public, flat re-exports
pub use error::Error;

pub use buffer::{SampleBuffer, SampleData, SharedSampleBuffer};
pub use engine::{
    GrainEngine, GrainEngineHandle, GrainEngineMessage, GrainEngineOptions, GRAIN_POOL_SIZE,
    MAX_BUFFER_CHANNEL, MAX_OUTPUT_CHANNELS,
};
pub use envelope::{grain_envelope, GrainEnvelope};
pub use panning::pan_gain;
pub use parameters::{GrainParameters, GrainRange};

// public mods
pub mod utils;
