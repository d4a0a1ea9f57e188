//! Per grain parameter randomization.

use rand::{rngs::SmallRng, Rng, SeedableRng};

use crate::{
    envelope::GrainEnvelope,
    parameters::{GrainParameters, GrainRange},
};

// -------------------------------------------------------------------------------------------------

/// Draws concrete grain values from the ranges of [`GrainParameters`].
///
/// Each value is drawn from its own uniform random value in range `[0, 1]`. Zero-width ranges
/// return their constant value without consuming a random value.
///
/// Uses an explicitly seedable small, fast PRNG, so grain streams are reproducible in tests,
/// while being seeded from the OS in production.
pub(crate) struct GrainRandomizer {
    rng: SmallRng,
}

impl GrainRandomizer {
    /// Create a new randomizer with the given seed, or a randomly seeded one.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        Self { rng }
    }

    #[inline]
    fn random_value(&mut self) -> f64 {
        self.rng.random_range(0.0..=1.0)
    }

    /// Draw a value from the given range.
    #[inline]
    pub fn draw(&mut self, range: &GrainRange) -> f64 {
        if range.is_constant() {
            range.lower()
        } else {
            let random = self.random_value();
            range.map_random_value(random)
        }
    }

    /// Grain position increment per sample.
    pub fn increment(&mut self, parameters: &GrainParameters) -> f64 {
        self.draw(&parameters.freq_range())
    }

    /// Grain duration, converted from milliseconds to samples.
    pub fn duration_samples(&mut self, parameters: &GrainParameters, sample_rate: u32) -> f64 {
        let milliseconds = self.draw(&parameters.dur_range());
        (sample_rate as f64 / 1000.0) * milliseconds
    }

    /// Time until the next grain spawn, converted from milliseconds to samples.
    pub fn dispersion_samples(&mut self, parameters: &GrainParameters, sample_rate: u32) -> f64 {
        let milliseconds = self.draw(&parameters.disp_range());
        (sample_rate as f64 / 1000.0) * milliseconds
    }

    /// Linear grain amplitude.
    pub fn amplitude(&mut self, parameters: &GrainParameters) -> f64 {
        self.draw(&parameters.amp_range())
    }

    /// Grain pan position.
    pub fn pan(&mut self, parameters: &GrainParameters) -> f64 {
        self.draw(&parameters.pan_range())
    }

    /// Grain start position in frames.
    ///
    /// Blends between the main playhead's `current_position` and the whole loop region, using
    /// the buffer randomness amount as blend factor.
    pub fn start_position(
        &mut self,
        parameters: &GrainParameters,
        frame_count: usize,
        current_position: f64,
    ) -> f64 {
        let amount = parameters.buffer_randomness();
        let frames = frame_count as f64;
        let min = amount * parameters.loop_start() * frames + (1.0 - amount) * current_position;
        let max = amount * parameters.loop_end() * frames + (1.0 - amount) * current_position;
        self.draw(&GrainRange::new(min, max))
    }

    /// Concrete envelope shape: resolves the random envelope selector.
    pub fn envelope(&mut self, parameters: &GrainParameters) -> GrainEnvelope {
        let envelope = parameters.envelope();
        if envelope.is_random() {
            let random = self.random_value();
            GrainEnvelope::from_random_value(random)
        } else {
            envelope
        }
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draws_stay_in_range() {
        let mut randomizer = GrainRandomizer::new(Some(0x5EED));
        let range = GrainRange::new(2.0, 5.0);
        let reversed = GrainRange::new(5.0, 2.0);
        for _ in 0..10_000 {
            let value = randomizer.draw(&range);
            assert!((2.0..=5.0).contains(&value), "{value} is out of range");
            let value = randomizer.draw(&reversed);
            assert!((2.0..=5.0).contains(&value), "{value} is out of range");
        }
    }

    #[test]
    fn constant_ranges() {
        let mut randomizer = GrainRandomizer::new(Some(1));
        let mut reference = GrainRandomizer::new(Some(1));
        let constant = GrainRange::constant(3.0);
        for _ in 0..10_000 {
            assert_eq!(randomizer.draw(&constant), 3.0);
        }
        // no random values were consumed
        let range = GrainRange::new(0.0, 1.0);
        assert_eq!(randomizer.draw(&range), reference.draw(&range));
    }

    #[test]
    fn seeded_streams_are_reproducible() {
        let mut a = GrainRandomizer::new(Some(42));
        let mut b = GrainRandomizer::new(Some(42));
        let range = GrainRange::new(-1.0, 1.0);
        for _ in 0..100 {
            assert_eq!(a.draw(&range), b.draw(&range));
        }
    }

    #[test]
    fn time_conversions() {
        let mut randomizer = GrainRandomizer::new(Some(7));
        let mut parameters = GrainParameters::new();
        parameters.set_dur_range(10.0, 10.0);
        parameters.set_disp_range(5.0, 5.0);
        assert_eq!(randomizer.duration_samples(&parameters, 48000), 480.0);
        assert_eq!(randomizer.dispersion_samples(&parameters, 48000), 240.0);

        parameters.set_dur_range(20.0, 10.0);
        for _ in 0..1000 {
            let samples = randomizer.duration_samples(&parameters, 44100);
            assert!((441.0..=882.0).contains(&samples));
        }
    }

    #[test]
    fn start_positions() {
        let mut randomizer = GrainRandomizer::new(Some(3));
        let mut parameters = GrainParameters::new();
        parameters.set_loop(0.25, 0.5);

        // pinned to the playhead
        parameters.set_buffer_randomness(0.0);
        for _ in 0..100 {
            assert_eq!(randomizer.start_position(&parameters, 1000, 123.0), 123.0);
        }

        // anywhere in the loop
        parameters.set_buffer_randomness(1.0);
        for _ in 0..1000 {
            let position = randomizer.start_position(&parameters, 1000, 900.0);
            assert!((250.0..=500.0).contains(&position), "{position}");
        }

        // half way
        parameters.set_buffer_randomness(0.5);
        for _ in 0..1000 {
            let position = randomizer.start_position(&parameters, 1000, 100.0);
            assert!((175.0..=300.0).contains(&position), "{position}");
        }
    }

    #[test]
    fn envelopes() {
        let mut randomizer = GrainRandomizer::new(Some(11));
        let mut parameters = GrainParameters::new();

        parameters.set_envelope(GrainEnvelope::Parabolic);
        assert_eq!(randomizer.envelope(&parameters), GrainEnvelope::Parabolic);

        parameters.set_envelope(GrainEnvelope::Random);
        let mut seen = [false; GrainEnvelope::SHAPE_COUNT];
        for _ in 0..10_000 {
            let envelope = randomizer.envelope(&parameters);
            assert!(!envelope.is_random());
            seen[envelope as usize] = true;
        }
        assert!(seen.iter().all(|s| *s), "not all shapes got picked: {seen:?}");
    }
}
