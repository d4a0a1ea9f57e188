//! Multichannel pan law.

use std::f64::consts::{FRAC_PI_2, PI};

// -------------------------------------------------------------------------------------------------

/// Gain of output channel `channel_index` for the given pan position in range `[0, 1]`.
///
/// With a single output channel, the gain always is 1. With N > 1 channels, the pan range is
/// split into N - 1 windows of width `1 / (N - 1)`:
/// - the first channel fades out with a quarter cosine over the first window,
/// - the last channel fades in with a quarter sine over the last window,
/// - every channel in between uses a half sine bump over a window, which is centered
///   around the channel's position, and is silent outside of it.
///
/// So at most two adjacent channels produce a signal for any pan position.
#[inline]
pub fn pan_gain(pan: f64, channel_index: usize, channel_count: usize) -> f64 {
    if channel_count <= 1 {
        return 1.0;
    }
    let window = 1.0 / (channel_count - 1) as f64;
    let scale = (channel_count - 1) as f64;

    if channel_index == 0 {
        let fraction = if pan <= window { pan / window } else { 1.0 };
        (fraction * FRAC_PI_2).cos()
    } else if channel_index == channel_count - 1 {
        let start = 1.0 - window;
        let fraction = if pan >= start {
            (pan - start) * scale
        } else {
            0.0
        };
        (fraction * FRAC_PI_2).sin()
    } else {
        let start = window * (channel_index - 1) as f64 + window / 2.0;
        let end = start + window;
        let fraction = if pan >= start && pan <= end {
            (pan - start) * scale
        } else {
            0.0
        };
        (fraction * PI).sin()
    }
}

// -------------------------------------------------------------------------------------------------
