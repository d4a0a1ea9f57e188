//! Main playhead and loop wrapping.

// -------------------------------------------------------------------------------------------------

/// Loop region in buffer frames.
///
/// The wrap rule is shared by the main playhead and all grains: a forward moving position
/// which reaches the loop end restarts one frame after the loop start, a backward moving
/// position which reaches the loop start restarts at the loop end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct LoopRange {
    start: f64,
    end: f64,
}

impl LoopRange {
    /// Create a loop range from absolute frame positions.
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Create a loop range from relative positions, truncating them to whole frames.
    pub fn from_relative(start: f64, end: f64, frame_count: usize) -> Self {
        let frames = frame_count as f64;
        Self::new((frames * start).trunc(), (frames * end).trunc())
    }

    #[cfg(test)]
    pub fn start(&self) -> f64 {
        self.start
    }

    #[cfg(test)]
    pub fn end(&self) -> f64 {
        self.end
    }

    /// Wrap a position, which just got moved by `increment`, into the loop region.
    #[inline]
    pub fn wrap(&self, position: f64, increment: f64) -> f64 {
        if increment > 0.0 && position >= self.end {
            self.start + 1.0
        } else if increment < 0.0 && position <= self.start {
            self.end
        } else {
            position
        }
    }
}

// -------------------------------------------------------------------------------------------------

/// The main, looping read position in the sample buffer.
///
/// Grains don't follow the playhead: it only provides the reference position for new grains.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Playhead {
    position: f64,
    increment: f64,
}

impl Default for Playhead {
    fn default() -> Self {
        Self::new()
    }
}

impl Playhead {
    pub const fn new() -> Self {
        Self {
            position: 0.0,
            increment: 1.0,
        }
    }

    /// Current position in frames.
    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn set_increment(&mut self, increment: f64) {
        self.increment = increment;
    }

    /// Move to the given frame position.
    pub fn set_position(&mut self, position: f64) {
        self.position = position;
    }

    /// Move the playhead by one sample, wrapping it into the given loop region.
    #[inline]
    pub fn advance(&mut self, loop_range: &LoopRange) -> f64 {
        self.position = loop_range.wrap(self.position + self.increment, self.increment);
        self.position
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_loop_points() {
        let range = LoopRange::from_relative(0.1, 0.2, 1000);
        assert_eq!((range.start(), range.end()), (100.0, 200.0));
        let range = LoopRange::from_relative(0.0, 1.0, 333);
        assert_eq!((range.start(), range.end()), (0.0, 333.0));
        let range = LoopRange::from_relative(0.5, 0.9999, 3);
        assert_eq!((range.start(), range.end()), (1.0, 2.0));
    }

    #[test]
    fn wrapping() {
        let range = LoopRange::new(100.0, 200.0);
        assert_eq!(range.wrap(200.0, 1.0), 101.0);
        assert_eq!(range.wrap(199.5, 1.0), 199.5);
        assert_eq!(range.wrap(100.0, -1.0), 200.0);
        assert_eq!(range.wrap(100.5, -1.0), 100.5);
        // a stopped position never wraps
        assert_eq!(range.wrap(250.0, 0.0), 250.0);
    }

    #[test]
    fn forward_playback() {
        let range = LoopRange::new(100.0, 200.0);
        let mut playhead = Playhead::new();
        playhead.set_position(198.0);
        assert_eq!(playhead.advance(&range), 199.0);
        assert_eq!(playhead.advance(&range), 101.0);
        assert_eq!(playhead.advance(&range), 102.0);
    }

    #[test]
    fn backward_playback() {
        let range = LoopRange::new(100.0, 200.0);
        let mut playhead = Playhead::new();
        playhead.set_increment(-0.5);
        playhead.set_position(101.0);
        assert_eq!(playhead.advance(&range), 100.5);
        assert_eq!(playhead.advance(&range), 200.0);
        assert_eq!(playhead.advance(&range), 199.5);
    }
}
