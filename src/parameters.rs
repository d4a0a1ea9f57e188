//! Grain creation parameters, as set by the control layer.

use crate::envelope::GrainEnvelope;

// -------------------------------------------------------------------------------------------------

/// A `lower..upper` range from which grain parameter values are drawn.
///
/// The range's direction does not matter: a range with `upper < lower` draws values as if the
/// bounds were swapped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrainRange {
    lower: f64,
    upper: f64,
}

impl GrainRange {
    /// Create a new range from the given bounds.
    pub const fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// Create a zero-width range, which always draws `value`.
    pub const fn constant(value: f64) -> Self {
        Self::new(value, value)
    }

    /// The range's lower bound, as set.
    pub fn lower(&self) -> f64 {
        self.lower
    }

    /// The range's upper bound, as set.
    pub fn upper(&self) -> f64 {
        self.upper
    }

    /// True when both bounds are equal, so drawing from the range needs no random value.
    pub fn is_constant(&self) -> bool {
        self.lower == self.upper
    }

    /// Smallest value the range can produce.
    pub fn min(&self) -> f64 {
        self.lower.min(self.upper)
    }

    /// Largest value the range can produce.
    pub fn max(&self) -> f64 {
        self.lower.max(self.upper)
    }

    /// Map a uniform random value in range `[0, 1]` into the range.
    #[inline]
    pub fn map_random_value(&self, random: f64) -> f64 {
        if self.is_constant() {
            self.lower
        } else if self.upper > self.lower {
            (self.upper - self.lower) * random + self.lower
        } else {
            (self.lower - self.upper) * random + self.upper
        }
    }

    fn clamped(self, min: f64, max: f64) -> Self {
        Self::new(self.lower.clamp(min, max), self.upper.clamp(min, max))
    }

    fn at_least(self, min: f64) -> Self {
        Self::new(self.lower.max(min), self.upper.max(min))
    }
}

// -------------------------------------------------------------------------------------------------

/// Playhead and grain creation parameters of a [`GrainEngine`](crate::GrainEngine).
///
/// Every setter writes one disjoint group of values and sanitizes its input instead of failing:
/// negative durations and dispersions become 0, pan and buffer randomness values are clamped
/// to `[0, 1]`, conflicting loop points get swapped.
///
/// Parameters are plain `Copy` values, so a whole snapshot can be sent to the engine at once via
/// [`GrainEngineHandle::set_parameters`](crate::GrainEngineHandle::set_parameters).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrainParameters {
    rate: f64,
    loop_start: f64,
    loop_end: f64,
    frequency: GrainRange,
    duration: GrainRange,
    dispersion: GrainRange,
    amplitude: GrainRange,
    pan: GrainRange,
    envelope: GrainEnvelope,
    buffer_randomness: f64,
}

impl Default for GrainParameters {
    fn default() -> Self {
        Self {
            rate: 1.0,
            loop_start: 0.0,
            loop_end: 1.0,
            frequency: GrainRange::constant(1.0),
            duration: GrainRange::constant(50.0),
            dispersion: GrainRange::constant(60.0),
            amplitude: GrainRange::new(0.0, 1.0),
            pan: GrainRange::new(0.0, 1.0),
            envelope: GrainEnvelope::Sine,
            buffer_randomness: 0.0,
        }
    }
}

impl GrainParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Main playhead's position increment per sample. 1.0 plays the buffer at normal speed,
    /// negative values play it backwards.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Set the main playhead's increment per sample.
    pub fn set_rate(&mut self, rate: f64) {
        self.rate = rate;
    }

    /// Loop start point, relative to the buffer's frame count.
    pub fn loop_start(&self) -> f64 {
        self.loop_start
    }

    /// Loop end point, relative to the buffer's frame count.
    pub fn loop_end(&self) -> f64 {
        self.loop_end
    }

    /// Set the loop region from relative positions in range `[0, 1]`.
    ///
    /// When the new start lies behind the current end, or the new end lies before the current
    /// start, the two points get swapped before they are applied.
    pub fn set_loop(&mut self, start: f64, end: f64) {
        if start > self.loop_end || end < self.loop_start {
            self.loop_start = end.clamp(0.0, 1.0);
            self.loop_end = start.clamp(0.0, 1.0);
        } else {
            self.loop_start = start.clamp(0.0, 1.0);
            self.loop_end = end.clamp(0.0, 1.0);
        }
    }

    /// Grain playback rate range. 1.0 plays grains at normal speed, negative values play
    /// grains backwards.
    pub fn freq_range(&self) -> GrainRange {
        self.frequency
    }

    pub fn set_freq_range(&mut self, lower: f64, upper: f64) {
        self.frequency = GrainRange::new(lower, upper);
    }

    /// Grain duration range in milliseconds.
    pub fn dur_range(&self) -> GrainRange {
        self.duration
    }

    pub fn set_dur_range(&mut self, lower: f64, upper: f64) {
        self.duration = GrainRange::new(lower, upper).at_least(0.0);
    }

    /// Range of the time between two grain spawns in milliseconds.
    pub fn disp_range(&self) -> GrainRange {
        self.dispersion
    }

    pub fn set_disp_range(&mut self, lower: f64, upper: f64) {
        self.dispersion = GrainRange::new(lower, upper).at_least(0.0);
    }

    /// Linear grain amplitude range. Values are not limited to 1.
    pub fn amp_range(&self) -> GrainRange {
        self.amplitude
    }

    pub fn set_amp_range(&mut self, lower: f64, upper: f64) {
        self.amplitude = GrainRange::new(lower, upper);
    }

    /// Grain pan position range in `[0, 1]`: 0 is the first, 1 the last output channel.
    pub fn pan_range(&self) -> GrainRange {
        self.pan
    }

    pub fn set_pan_range(&mut self, lower: f64, upper: f64) {
        self.pan = GrainRange::new(lower, upper).clamped(0.0, 1.0);
    }

    /// Envelope shape selector for new grains.
    pub fn envelope(&self) -> GrainEnvelope {
        self.envelope
    }

    pub fn set_envelope(&mut self, envelope: GrainEnvelope) {
        self.envelope = envelope;
    }

    /// Amount of randomness in the grain start positions: 0 starts all grains at the main
    /// playhead, 1 starts grains anywhere within the loop region.
    pub fn buffer_randomness(&self) -> f64 {
        self.buffer_randomness
    }

    pub fn set_buffer_randomness(&mut self, amount: f64) {
        self.buffer_randomness = amount.clamp(0.0, 1.0);
    }
}

// -------------------------------------------------------------------------------------------------
