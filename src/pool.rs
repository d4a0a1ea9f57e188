//! Fixed size grain pool.

use crate::{
    envelope::{grain_envelope, GrainEnvelope},
    playhead::LoopRange,
};

// -------------------------------------------------------------------------------------------------

/// A single grain: an independent, enveloped reader of the sample buffer.
///
/// A grain is alive while its countdown is > 0. The countdown starts at the grain's duration,
/// truncated to whole samples, and decreases by one for every processed sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Grain {
    /// Fractional read position in buffer frames.
    position: f64,
    /// Position increment per sample. Negative values read backwards.
    increment: f64,
    /// Remaining lifetime in samples.
    countdown: u32,
    /// Total lifetime in samples. Time base of the envelope.
    duration: f64,
    amplitude: f64,
    pan: f64,
    /// Resolved, never random, envelope shape.
    envelope: GrainEnvelope,
}

impl Default for Grain {
    fn default() -> Self {
        Self::new()
    }
}

impl Grain {
    /// Create a new, inactive grain.
    pub const fn new() -> Self {
        Self {
            position: 0.0,
            increment: 1.0,
            countdown: 0,
            duration: 0.0,
            amplitude: 0.0,
            pan: 0.5,
            envelope: GrainEnvelope::Sine,
        }
    }

    /// Create a new grain which lives for `duration` samples.
    pub fn spawn(
        position: f64,
        increment: f64,
        duration: f64,
        amplitude: f64,
        pan: f64,
        envelope: GrainEnvelope,
    ) -> Self {
        debug_assert!(!envelope.is_random(), "Envelope should be resolved");
        Self {
            position,
            increment,
            countdown: duration as u32,
            duration,
            amplitude,
            pan,
            envelope,
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.countdown > 0
    }

    #[cfg(test)]
    pub fn position(&self) -> f64 {
        self.position
    }

    #[cfg(test)]
    pub fn countdown(&self) -> u32 {
        self.countdown
    }

    #[cfg(test)]
    pub fn duration(&self) -> f64 {
        self.duration
    }

    #[inline]
    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    #[inline]
    pub fn pan(&self) -> f64 {
        self.pan
    }

    #[cfg(test)]
    pub fn envelope(&self) -> GrainEnvelope {
        self.envelope
    }

    /// Move the grain's read position by one sample, wrapped into the given loop region.
    #[inline]
    pub fn advance(&mut self, loop_range: &LoopRange) -> f64 {
        self.position = loop_range.wrap(self.position + self.increment, self.increment);
        self.position
    }

    /// Envelope gain at the grain's current countdown.
    #[inline]
    pub fn envelope_gain(&self) -> f64 {
        grain_envelope(self.countdown as f64, self.duration, self.envelope)
    }

    /// Consume one sample of the grain's lifetime. Returns true when the grain died.
    #[inline]
    fn tick(&mut self) -> bool {
        self.countdown = self.countdown.saturating_sub(1);
        self.countdown == 0
    }
}

// -------------------------------------------------------------------------------------------------

/// Fixed capacity pool of grain slots.
///
/// Slots are never allocated or freed: spawning a grain reinitializes the first inactive slot,
/// a grain dies when its countdown reaches 0 and then stays in place until a new spawn reuses
/// its slot. When no slot is free, new grains are dropped.
///
/// The pool's population (number of active grains) is tracked incrementally: spawning
/// increments it, processing the last sample of a grain decrements it.
pub(crate) struct GrainPool<const POOL_SIZE: usize> {
    grains: [Grain; POOL_SIZE],
    population: usize,
}

impl<const POOL_SIZE: usize> Default for GrainPool<POOL_SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const POOL_SIZE: usize> GrainPool<POOL_SIZE> {
    /// Create a new pool with inactive grains only.
    pub fn new() -> Self {
        Self {
            grains: [Grain::new(); POOL_SIZE],
            population: 0,
        }
    }

    /// Deactivate all grains.
    pub fn reset(&mut self) {
        self.grains = [Grain::new(); POOL_SIZE];
        self.population = 0;
    }

    /// Number of currently active grains.
    pub fn population(&self) -> usize {
        self.population
    }

    /// Access to all grain slots.
    #[cfg(test)]
    pub fn grains(&self) -> &[Grain] {
        &self.grains
    }

    /// Spawn a new grain into the first inactive slot.
    ///
    /// `new_grain` is only invoked when a free slot exists. Returns the slot index of the new
    /// grain, or None when the pool is saturated or the new grain has a zero length lifetime.
    pub fn spawn<F: FnOnce() -> Grain>(&mut self, new_grain: F) -> Option<usize> {
        let index = self.grains.iter().position(|grain| !grain.is_active())?;
        let grain = new_grain();
        if !grain.is_active() {
            return None;
        }
        self.grains[index] = grain;
        self.population += 1;
        Some(index)
    }

    /// Process one sample of all active grains.
    ///
    /// Scans the slots from the start and invokes `process` for each active grain, until
    /// `population` active grains got visited or the end of the pool is reached. After
    /// processing, each grain's countdown is decremented; grains which reach 0 leave the
    /// population.
    #[inline]
    pub fn process_active<F: FnMut(&mut Grain)>(&mut self, mut process: F) {
        let mut index = 0;
        for _ in 0..self.population {
            // look for the next active grain
            while index < POOL_SIZE && !self.grains[index].is_active() {
                index += 1;
            }
            if index >= POOL_SIZE {
                break;
            }
            let grain = &mut self.grains[index];
            process(grain);
            if grain.tick() {
                self.population -= 1;
            }
            index += 1;
        }
    }
}

// -------------------------------------------------------------------------------------------------
