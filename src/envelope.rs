//! Grain envelope shapes.

use std::f64::consts::{FRAC_PI_2, PI};

// -------------------------------------------------------------------------------------------------

/// Amplitude envelope shape of a grain.
///
/// Names parse from and display as lowercase strings ("sine", "linear", ..., "random"), so
/// control layers can map envelope messages directly via `FromStr`.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    strum::EnumString,
    strum::Display,
    strum::VariantNames,
    strum::EnumCount,
    strum::FromRepr,
)]
#[strum(serialize_all = "lowercase")]
#[repr(u8)]
pub enum GrainEnvelope {
    /// Half sine period over the grain's lifetime.
    #[default]
    Sine = 0,
    /// Symmetric linear rise and fall.
    Linear = 1,
    /// Symmetric rise and fall with 4th power ramps.
    Exponential = 2,
    /// Linear rise over the first quarter, sustain, linear fall over the last quarter.
    Trapezoid = 3,
    /// Like trapezoid, but with quarter sine shaped ramps.
    Parabolic = 4,
    /// Short anti-click attack, followed by a long 7th power decay.
    Percussive = 5,
    /// Reversed percussive: long 7th power rise, short anti-click release.
    Evissucrep = 6,
    /// Pick one of the concrete shapes randomly for each new grain.
    Random = 7,
}

impl GrainEnvelope {
    /// Number of concrete (non random) envelope shapes.
    pub const SHAPE_COUNT: usize = 7;

    /// True for the meta `Random` selector, which must be resolved before it's applied.
    pub fn is_random(&self) -> bool {
        matches!(self, Self::Random)
    }

    /// Map a uniform random value in range `[0, 1]` to one of the concrete shapes.
    pub fn from_random_value(value: f64) -> Self {
        debug_assert!((0.0..=1.0).contains(&value), "Invalid random value: {value}");
        let index = (value * 6.99).floor() as u8;
        Self::from_repr(index.min(Self::SHAPE_COUNT as u8 - 1)).unwrap_or_default()
    }
}

// -------------------------------------------------------------------------------------------------

/// Evaluate a grain's envelope gain.
///
/// `countdown` is the grain's remaining lifetime in samples (`duration` at birth, 1 on its
/// very last sample), `duration` the grain's total lifetime in samples. The ramps are expressed
/// in terms of `countdown - 1`, so most shapes reach exactly 0 on the grain's last sample.
///
/// Values are not renormalized: some shapes are not exactly 0 at birth.
/// An unresolved [`GrainEnvelope::Random`] evaluates as [`GrainEnvelope::Sine`].
#[inline]
pub fn grain_envelope(countdown: f64, duration: f64, shape: GrainEnvelope) -> f64 {
    match shape {
        GrainEnvelope::Random | GrainEnvelope::Sine => ((countdown - 1.0) / duration * PI).sin(),
        GrainEnvelope::Linear => {
            if countdown > duration / 2.0 {
                (duration - countdown) / (duration / 2.0)
            } else {
                (countdown - 1.0) / (duration / 2.0)
            }
        }
        GrainEnvelope::Exponential => {
            if countdown > duration / 2.0 {
                ((duration - countdown) / (duration / 2.0)).powf(4.0)
            } else {
                ((countdown - 1.0) / (duration / 2.0)).powf(4.0)
            }
        }
        GrainEnvelope::Trapezoid => {
            if countdown > (duration / 4.0) * 3.0 {
                (duration - countdown) / (duration / 4.0)
            } else if countdown <= duration / 4.0 {
                (countdown - 1.0) / (duration / 4.0)
            } else {
                1.0
            }
        }
        GrainEnvelope::Parabolic => {
            if countdown > (duration / 4.0) * 3.0 {
                ((duration - (countdown - 1.0)) / (duration / 4.0) * FRAC_PI_2).sin()
            } else if countdown <= duration / 4.0 {
                ((countdown - 1.0) / (duration / 4.0) * FRAC_PI_2).sin()
            } else {
                1.0
            }
        }
        GrainEnvelope::Percussive => {
            if countdown > (duration / 20.0) * 19.0 {
                // anti-click
                (duration - (countdown - 1.0)) / duration
            } else {
                ((countdown - 1.0) / duration).powf(7.0)
            }
        }
        GrainEnvelope::Evissucrep => {
            if countdown > duration / 20.0 {
                ((duration - (countdown - 1.0)) / duration).powf(7.0)
            } else {
                // anti-click
                (countdown - 1.0) / duration
            }
        }
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    use std::str::FromStr;
    use strum::VariantNames;

    const DURATION: f64 = 480.0;

    fn assert_close(value: f64, expected: f64) {
        assert!(
            (value - expected).abs() < 1e-12,
            "expected {expected}, got {value}"
        );
    }

    #[test]
    fn names() {
        assert_eq!(GrainEnvelope::VARIANTS.len(), GrainEnvelope::SHAPE_COUNT + 1);
        assert_eq!(
            GrainEnvelope::from_str("evissucrep").unwrap(),
            GrainEnvelope::Evissucrep
        );
        assert_eq!(
            GrainEnvelope::from_str("random").unwrap(),
            GrainEnvelope::Random
        );
        assert_eq!(GrainEnvelope::Parabolic.to_string(), "parabolic");
        assert!(GrainEnvelope::from_str("hann").is_err());
    }

    #[test]
    fn random_value_mapping() {
        assert_eq!(GrainEnvelope::from_random_value(0.0), GrainEnvelope::Sine);
        assert_eq!(GrainEnvelope::from_random_value(0.5), GrainEnvelope::Trapezoid);
        assert_eq!(
            GrainEnvelope::from_random_value(1.0),
            GrainEnvelope::Evissucrep
        );
        for i in 0..=1000 {
            let shape = GrainEnvelope::from_random_value(i as f64 / 1000.0);
            assert!(!shape.is_random());
        }
    }

    #[test]
    fn sine() {
        assert_close(grain_envelope(1.0, DURATION, GrainEnvelope::Sine), 0.0);
        assert_close(
            grain_envelope(DURATION, DURATION, GrainEnvelope::Sine),
            ((DURATION - 1.0) / DURATION * PI).sin(),
        );
        assert_close(
            grain_envelope(DURATION / 2.0 + 1.0, DURATION, GrainEnvelope::Sine),
            1.0,
        );
        // unresolved random behaves like sine
        for countdown in 1..=DURATION as usize {
            let countdown = countdown as f64;
            assert_eq!(
                grain_envelope(countdown, DURATION, GrainEnvelope::Random),
                grain_envelope(countdown, DURATION, GrainEnvelope::Sine)
            );
        }
    }

    #[test]
    fn linear_and_exponential() {
        assert_close(grain_envelope(DURATION, DURATION, GrainEnvelope::Linear), 0.0);
        assert_close(grain_envelope(1.0, DURATION, GrainEnvelope::Linear), 0.0);
        assert_close(
            grain_envelope(241.0, DURATION, GrainEnvelope::Linear),
            239.0 / 240.0,
        );
        assert_close(
            grain_envelope(240.0, DURATION, GrainEnvelope::Linear),
            239.0 / 240.0,
        );
        assert_close(
            grain_envelope(DURATION, DURATION, GrainEnvelope::Exponential),
            0.0,
        );
        assert_close(grain_envelope(1.0, DURATION, GrainEnvelope::Exponential), 0.0);
        assert_close(
            grain_envelope(360.0, DURATION, GrainEnvelope::Exponential),
            0.5f64.powf(4.0),
        );
    }

    #[test]
    fn trapezoid_and_parabolic() {
        assert_close(grain_envelope(DURATION, DURATION, GrainEnvelope::Trapezoid), 0.0);
        assert_close(grain_envelope(1.0, DURATION, GrainEnvelope::Trapezoid), 0.0);
        assert_close(grain_envelope(300.0, DURATION, GrainEnvelope::Trapezoid), 1.0);
        assert_close(
            grain_envelope(420.0, DURATION, GrainEnvelope::Trapezoid),
            60.0 / 120.0,
        );
        assert_close(
            grain_envelope(DURATION, DURATION, GrainEnvelope::Parabolic),
            (1.0 / 120.0 * FRAC_PI_2).sin(),
        );
        assert_close(grain_envelope(1.0, DURATION, GrainEnvelope::Parabolic), 0.0);
        assert_close(grain_envelope(200.0, DURATION, GrainEnvelope::Parabolic), 1.0);
    }

    #[test]
    fn percussive_and_reversed() {
        // fast attack
        assert_close(
            grain_envelope(DURATION, DURATION, GrainEnvelope::Percussive),
            1.0 / DURATION,
        );
        assert_close(
            grain_envelope(457.0, DURATION, GrainEnvelope::Percussive),
            24.0 / DURATION,
        );
        // long decay
        assert_close(
            grain_envelope(456.0, DURATION, GrainEnvelope::Percussive),
            (455.0 / DURATION).powf(7.0),
        );
        assert_close(grain_envelope(1.0, DURATION, GrainEnvelope::Percussive), 0.0);

        // long rise
        assert_close(
            grain_envelope(DURATION, DURATION, GrainEnvelope::Evissucrep),
            (1.0 / DURATION).powf(7.0),
        );
        assert_close(
            grain_envelope(25.0, DURATION, GrainEnvelope::Evissucrep),
            (456.0 / DURATION).powf(7.0),
        );
        // fast release
        assert_close(
            grain_envelope(24.0, DURATION, GrainEnvelope::Evissucrep),
            23.0 / DURATION,
        );
        assert_close(grain_envelope(1.0, DURATION, GrainEnvelope::Evissucrep), 0.0);
    }

    #[test]
    fn bounded_over_lifetime() {
        for index in 0..GrainEnvelope::SHAPE_COUNT {
            let shape = GrainEnvelope::from_repr(index as u8).unwrap();
            for countdown in 1..=DURATION as usize {
                let gain = grain_envelope(countdown as f64, DURATION, shape);
                assert!(
                    (0.0..=1.0 + 1e-12).contains(&gain),
                    "{shape} out of range at {countdown}: {gain}"
                );
            }
        }
    }
}
