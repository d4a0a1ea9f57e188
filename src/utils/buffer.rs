// -------------------------------------------------------------------------------------------------

/// Set all samples in the given buffer to 0.
#[inline]
pub fn clear_buffer(buffer: &mut [f32]) {
    buffer.fill(0.0);
}

// -------------------------------------------------------------------------------------------------

/// Copy the given planar buffer into an interleaved one.
/// The planar buffer's layout defines layout of the interleaved buffer (channel and frame count).
pub fn planar_to_interleaved<C: AsRef<[f32]>>(planar: &[C], interleaved: &mut [f32]) {
    let channel_count = planar.len();
    match channel_count {
        0 => (),
        1 => {
            for (i, p) in interleaved.iter_mut().zip(planar[0].as_ref()) {
                *i = *p;
            }
        }
        _ => {
            for (channel_index, channel_values) in planar.iter().enumerate() {
                let frames = interleaved.chunks_exact_mut(channel_count);
                for (frame, value) in frames.zip(channel_values.as_ref()) {
                    frame[channel_index] = *value;
                }
            }
        }
    }
}

// -------------------------------------------------------------------------------------------------
