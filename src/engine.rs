//! The real-time granular synthesis engine.

use std::sync::Arc;

use assume::assume;
use crossbeam_queue::ArrayQueue;

use crate::{
    buffer::SampleBuffer,
    envelope::GrainEnvelope,
    error::Error,
    panning::pan_gain,
    parameters::GrainParameters,
    playhead::{LoopRange, Playhead},
    pool::{Grain, GrainPool},
    randomizer::GrainRandomizer,
    scheduler::DispersionTimer,
    utils::buffer::clear_buffer,
};

// -------------------------------------------------------------------------------------------------

pub mod handle;

pub use handle::{GrainEngineHandle, GrainEngineMessage};

// -------------------------------------------------------------------------------------------------

/// Max number of simultaneously playing grains. New grains are dropped when all slots are busy.
pub const GRAIN_POOL_SIZE: usize = 512;

/// Max number of output channels an engine can render.
pub const MAX_OUTPUT_CHANNELS: usize = 32;

/// Highest selectable channel of a multichannel sample buffer.
pub const MAX_BUFFER_CHANNEL: usize = 3;

// -------------------------------------------------------------------------------------------------

/// Options to create a [`GrainEngine`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrainEngineOptions {
    /// By default 2. Number of output channels grains get panned across, in range 1..=32.
    /// Values out of range get clamped.
    pub output_channel_count: usize,

    /// By default 0. Channel of a multichannel sample buffer grains read from, in range 0..=3.
    /// Values out of range get clamped.
    pub buffer_channel: usize,

    /// By default None, which seeds the grain parameter randomizer from the OS. Set to some
    /// fixed seed to get reproducible grain streams.
    pub seed: Option<u64>,

    /// By default 1024. Capacity of the queue which passes messages from engine handles to
    /// the engine. Messages sent to a full queue get dropped.
    pub message_queue_size: usize,
}

impl Default for GrainEngineOptions {
    fn default() -> Self {
        Self {
            output_channel_count: 2,
            buffer_channel: 0,
            seed: None,
            message_queue_size: 1024,
        }
    }
}

impl GrainEngineOptions {
    pub fn output_channel_count(mut self, channel_count: usize) -> Self {
        self.output_channel_count = channel_count;
        self
    }

    pub fn buffer_channel(mut self, channel: usize) -> Self {
        self.buffer_channel = channel;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn message_queue_size(mut self, size: usize) -> Self {
        self.message_queue_size = size;
        self
    }

    /// Validate all options. Returns Error::ParameterError on errors.
    pub fn validate(&self) -> Result<(), Error> {
        if self.message_queue_size == 0 {
            return Err(Error::ParameterError(
                "engine options 'message_queue_size' must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

// -------------------------------------------------------------------------------------------------

/// Granular synthesis engine.
///
/// A main playhead loops through a [`SampleBuffer`]. Every dispersion period, a new grain gets
/// spawned at (or randomly around) the playhead's position, with its duration, playback rate,
/// amplitude, pan position and envelope drawn from the engine's [`GrainParameters`]. All active
/// grains are mixed into the output channels, panned with an equal power law.
///
/// The engine is meant to be owned and processed by an audio thread. Parameters can be set
/// directly or, from other threads, via a [`GrainEngineHandle`].
pub struct GrainEngine {
    parameters: GrainParameters,
    playhead: Playhead,
    timer: DispersionTimer,
    pool: GrainPool<GRAIN_POOL_SIZE>,
    randomizer: GrainRandomizer,
    sample_rate: u32,
    output_channel_count: usize,
    buffer_channel: usize,
    message_queue: Arc<ArrayQueue<GrainEngineMessage>>,
}

impl GrainEngine {
    /// Create a new engine with default parameters, running at the given sample rate.
    pub fn new(sample_rate: u32, options: GrainEngineOptions) -> Result<Self, Error> {
        options.validate()?;
        if sample_rate == 0 {
            return Err(Error::ParameterError(
                "engine sample rate must be > 0".to_string(),
            ));
        }
        let output_channel_count = options.output_channel_count.clamp(1, MAX_OUTPUT_CHANNELS);
        if output_channel_count != options.output_channel_count {
            log::warn!(
                "Clamped output channel count {} to {}",
                options.output_channel_count,
                output_channel_count
            );
        }
        let buffer_channel = Self::clamp_buffer_channel(options.buffer_channel);
        let message_queue = Arc::new(ArrayQueue::new(options.message_queue_size));
        log::debug!(
            "Creating grain engine: {output_channel_count} output channels @ {sample_rate} Hz"
        );
        Ok(Self {
            parameters: GrainParameters::default(),
            playhead: Playhead::new(),
            timer: DispersionTimer::new(),
            pool: GrainPool::new(),
            randomizer: GrainRandomizer::new(options.seed),
            sample_rate,
            output_channel_count,
            buffer_channel,
            message_queue,
        })
    }

    /// Create a new handle to change the engine's parameters from other threads.
    pub fn handle(&self) -> GrainEngineHandle {
        GrainEngineHandle::new(Arc::clone(&self.message_queue))
    }

    /// The engine's current parameters.
    pub fn parameters(&self) -> &GrainParameters {
        &self.parameters
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn output_channel_count(&self) -> usize {
        self.output_channel_count
    }

    /// Selected channel of multichannel sample buffers.
    pub fn buffer_channel(&self) -> usize {
        self.buffer_channel
    }

    /// Number of currently playing grains.
    pub fn population(&self) -> usize {
        self.pool.population()
    }

    /// Main playhead's position in sample buffer frames.
    pub fn playhead_position(&self) -> f64 {
        self.playhead.position()
    }

    pub fn set_rate(&mut self, rate: f64) {
        self.parameters.set_rate(rate);
    }

    pub fn set_loop(&mut self, start: f64, end: f64) {
        self.parameters.set_loop(start, end);
    }

    pub fn set_freq_range(&mut self, lower: f64, upper: f64) {
        self.parameters.set_freq_range(lower, upper);
    }

    pub fn set_dur_range(&mut self, lower: f64, upper: f64) {
        self.parameters.set_dur_range(lower, upper);
    }

    pub fn set_disp_range(&mut self, lower: f64, upper: f64) {
        self.parameters.set_disp_range(lower, upper);
    }

    pub fn set_amp_range(&mut self, lower: f64, upper: f64) {
        self.parameters.set_amp_range(lower, upper);
    }

    pub fn set_pan_range(&mut self, lower: f64, upper: f64) {
        self.parameters.set_pan_range(lower, upper);
    }

    pub fn set_envelope(&mut self, envelope: GrainEnvelope) {
        self.parameters.set_envelope(envelope);
    }

    pub fn set_buffer_randomness(&mut self, amount: f64) {
        self.parameters.set_buffer_randomness(amount);
    }

    /// Replace all parameters at once.
    pub fn set_parameters(&mut self, parameters: GrainParameters) {
        self.parameters = parameters;
    }

    /// Select the channel of multichannel sample buffers, which grains read from.
    pub fn set_buffer_channel(&mut self, channel: usize) {
        self.buffer_channel = Self::clamp_buffer_channel(channel);
    }

    /// Change the engine's sample rate. This resets all playing grains.
    pub fn set_sample_rate(&mut self, sample_rate: u32) -> Result<(), Error> {
        if sample_rate == 0 {
            return Err(Error::ParameterError(
                "engine sample rate must be > 0".to_string(),
            ));
        }
        self.sample_rate = sample_rate;
        self.reset();
        Ok(())
    }

    /// Stop all playing grains and spawn a new grain with the next processed sample.
    pub fn reset(&mut self) {
        log::debug!("Resetting grain engine @ {} Hz", self.sample_rate);
        self.pool.reset();
        self.timer.reset();
    }

    /// Render the next block of grains from the given buffer into the given output channels.
    ///
    /// All output channels get overwritten. The number of rendered frames is the length of the
    /// shortest output channel. When the buffer can't be locked, the block stays silent and no
    /// grains or playheads move.
    pub fn process<B: SampleBuffer + ?Sized>(&mut self, buffer: &B, output: &mut [&mut [f32]]) {
        Self::assert_no_alloc(|| self.process_block(buffer, output));
    }

    fn process_block<B: SampleBuffer + ?Sized>(&mut self, buffer: &B, output: &mut [&mut [f32]]) {
        self.process_messages();

        for channel in output.iter_mut() {
            clear_buffer(channel);
        }
        let Some(data) = buffer.lock() else {
            return;
        };

        let frame_count = output.iter().map(|c| c.len()).min().unwrap_or(0);
        let output_channel_count = self.output_channel_count;
        let sample_rate = self.sample_rate;
        let parameters = self.parameters;

        let buffer_frame_count = data.frame_count();
        let buffer_channel = self.buffer_channel.min(data.channel_count() - 1);
        let loop_range = LoopRange::from_relative(
            parameters.loop_start(),
            parameters.loop_end(),
            buffer_frame_count,
        );
        self.playhead.set_increment(parameters.rate());

        let randomizer = &mut self.randomizer;
        for frame in 0..frame_count {
            let playhead_position = self.playhead.advance(&loop_range);

            if self
                .timer
                .tick(|| randomizer.dispersion_samples(&parameters, sample_rate))
            {
                // silently dropped when the pool is saturated
                let _ = self.pool.spawn(|| {
                    let duration = randomizer.duration_samples(&parameters, sample_rate);
                    let pan = randomizer.pan(&parameters);
                    let position = randomizer.start_position(
                        &parameters,
                        buffer_frame_count,
                        playhead_position,
                    );
                    let increment = randomizer.increment(&parameters);
                    let amplitude = randomizer.amplitude(&parameters);
                    let envelope = randomizer.envelope(&parameters);
                    Grain::spawn(position, increment, duration, amplitude, pan, envelope)
                });
            }

            self.pool.process_active(|grain| {
                let position = grain.advance(&loop_range);
                let value = data.sample(position as i64, buffer_channel) as f64
                    * grain.amplitude()
                    * grain.envelope_gain();
                let channels = output.iter_mut().take(output_channel_count);
                for (channel_index, channel) in channels.enumerate() {
                    assume!(unsafe: frame < channel.len());
                    let gain = pan_gain(grain.pan(), channel_index, output_channel_count);
                    channel[frame] += (value * gain) as f32;
                }
            });
        }
    }

    fn process_messages(&mut self) {
        while let Some(message) = self.message_queue.pop() {
            self.process_message(message);
        }
    }

    fn process_message(&mut self, message: GrainEngineMessage) {
        match message {
            GrainEngineMessage::SetRate(rate) => self.set_rate(rate),
            GrainEngineMessage::SetLoop { start, end } => self.set_loop(start, end),
            GrainEngineMessage::SetFreqRange { lower, upper } => self.set_freq_range(lower, upper),
            GrainEngineMessage::SetDurRange { lower, upper } => self.set_dur_range(lower, upper),
            GrainEngineMessage::SetDispRange { lower, upper } => self.set_disp_range(lower, upper),
            GrainEngineMessage::SetAmpRange { lower, upper } => self.set_amp_range(lower, upper),
            GrainEngineMessage::SetPanRange { lower, upper } => self.set_pan_range(lower, upper),
            GrainEngineMessage::SetEnvelope(envelope) => self.set_envelope(envelope),
            GrainEngineMessage::SetBufferRandomness(amount) => self.set_buffer_randomness(amount),
            GrainEngineMessage::SetBufferChannel(channel) => {
                self.buffer_channel = channel.min(MAX_BUFFER_CHANNEL);
            }
            GrainEngineMessage::SetParameters(parameters) => self.set_parameters(parameters),
        }
    }

    fn clamp_buffer_channel(channel: usize) -> usize {
        if channel > MAX_BUFFER_CHANNEL {
            log::warn!("Clamped buffer channel {channel} to {MAX_BUFFER_CHANNEL}");
            MAX_BUFFER_CHANNEL
        } else {
            channel
        }
    }

    fn assert_no_alloc<T, F: FnOnce() -> T>(func: F) -> T {
        #[cfg(feature = "assert-allocs")]
        return assert_no_alloc::assert_no_alloc::<T, F>(func);

        #[cfg(not(feature = "assert-allocs"))]
        return func();
    }
}

// -------------------------------------------------------------------------------------------------
