//! Sample buffers which grains read from.

use std::{
    ops::Deref,
    path::Path,
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, TryLockError},
};

use crate::{
    error::Error,
    utils::{buffer::planar_to_interleaved, decoder::AudioDecoder},
};

// -------------------------------------------------------------------------------------------------

/// Interleaved `f32` sample data with a fixed channel layout.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleData {
    samples: Box<[f32]>,
    channel_count: usize,
    sample_rate: u32,
}

impl Default for SampleData {
    fn default() -> Self {
        Self {
            samples: Box::new([]),
            channel_count: 1,
            sample_rate: 44100,
        }
    }
}

impl SampleData {
    /// Create new sample data from the given interleaved samples.
    pub fn new(samples: Vec<f32>, channel_count: usize, sample_rate: u32) -> Result<Self, Error> {
        if channel_count == 0 {
            return Err(Error::ParameterError(
                "sample data needs at least one channel".to_string(),
            ));
        }
        if samples.len() % channel_count != 0 {
            return Err(Error::ParameterError(format!(
                "sample count {} is not a multiple of the channel count {}",
                samples.len(),
                channel_count
            )));
        }
        if sample_rate == 0 {
            return Err(Error::ParameterError(
                "sample rate must be > 0".to_string(),
            ));
        }
        Ok(Self {
            samples: samples.into_boxed_slice(),
            channel_count,
            sample_rate,
        })
    }

    /// Create new sample data from the given, equally sized, planar channel buffers.
    pub fn from_planar<C: AsRef<[f32]>>(channels: &[C], sample_rate: u32) -> Result<Self, Error> {
        let frame_count = channels.first().map(|c| c.as_ref().len()).unwrap_or(0);
        if channels.iter().any(|c| c.as_ref().len() != frame_count) {
            return Err(Error::ParameterError(
                "all channels must have the same length".to_string(),
            ));
        }
        let mut samples = vec![0.0; frame_count * channels.len()];
        planar_to_interleaved(channels, &mut samples);
        Self::new(samples, channels.len(), sample_rate)
    }

    /// Decode the given audio file into new sample data.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let data = Self::from_decoder(AudioDecoder::from_file(path.as_ref())?)?;
        log::debug!(
            "Loaded sample file '{}': {} frames, {} channels @ {} Hz",
            path.as_ref().display(),
            data.frame_count(),
            data.channel_count(),
            data.sample_rate()
        );
        Ok(data)
    }

    /// Decode the given encoded audio file content into new sample data.
    pub fn from_encoded_bytes(bytes: Vec<u8>) -> Result<Self, Error> {
        let data = Self::from_decoder(AudioDecoder::from_buffer(bytes)?)?;
        log::debug!(
            "Loaded sample data: {} frames, {} channels @ {} Hz",
            data.frame_count(),
            data.channel_count(),
            data.sample_rate()
        );
        Ok(data)
    }

    fn from_decoder(mut decoder: AudioDecoder) -> Result<Self, Error> {
        let signal_spec = decoder.signal_spec();
        let samples = decoder.decode_all()?;
        Self::new(samples, signal_spec.channels.count(), signal_spec.rate)
    }

    /// Number of sample frames.
    pub fn frame_count(&self) -> usize {
        self.samples.len() / self.channel_count
    }

    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    /// Sample rate the data got recorded with. Informative only: grains always read the data
    /// frame by frame, regardless of the engine's sample rate.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Raw interleaved sample data.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Sample value at the given frame and channel. Frames out of bounds are silent.
    #[inline]
    pub fn sample(&self, frame: i64, channel: usize) -> f32 {
        debug_assert!(channel < self.channel_count, "Invalid channel index");
        if frame < 0 || frame as u64 >= self.frame_count() as u64 {
            return 0.0;
        }
        let index = frame as usize * self.channel_count + channel;
        self.samples.get(index).copied().unwrap_or(0.0)
    }
}

// -------------------------------------------------------------------------------------------------

/// Read access to sample data from within the audio thread.
///
/// The engine locks the buffer once per processed block and releases it by dropping the guard.
/// A buffer which can't be locked immediately should return None: the block then gets rendered
/// as silence, without advancing any grains.
pub trait SampleBuffer {
    type Guard<'a>: Deref<Target = SampleData>
    where
        Self: 'a;

    /// Try locking the buffer for reading, without blocking.
    fn lock(&self) -> Option<Self::Guard<'_>>;
}

impl SampleBuffer for SampleData {
    type Guard<'a> = &'a SampleData;

    fn lock(&self) -> Option<Self::Guard<'_>> {
        Some(self)
    }
}

// -------------------------------------------------------------------------------------------------

/// Sample data which can be shared with and replaced from other threads.
///
/// The audio thread only ever try-locks the data: while a control thread replaces it, the
/// engine renders silence.
#[derive(Debug, Clone, Default)]
pub struct SharedSampleBuffer {
    data: Arc<RwLock<SampleData>>,
}

impl SharedSampleBuffer {
    pub fn new(data: SampleData) -> Self {
        Self {
            data: Arc::new(RwLock::new(data)),
        }
    }

    /// Lock the shared data for writing. Blocks until all readers released the data.
    pub fn write(&self) -> RwLockWriteGuard<'_, SampleData> {
        self.data.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the shared data with new data. Returns the previous data.
    pub fn replace(&self, data: SampleData) -> SampleData {
        std::mem::replace(&mut *self.write(), data)
    }
}

impl SampleBuffer for SharedSampleBuffer {
    type Guard<'a> = RwLockReadGuard<'a, SampleData>;

    fn lock(&self) -> Option<Self::Guard<'_>> {
        match self.data.try_read() {
            Ok(guard) => Some(guard),
            Err(TryLockError::Poisoned(poisoned)) => Some(poisoned.into_inner()),
            Err(TryLockError::WouldBlock) => None,
        }
    }
}

// -------------------------------------------------------------------------------------------------
