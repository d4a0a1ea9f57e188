//! Grain spawn timing.

// -------------------------------------------------------------------------------------------------

/// Counts down the samples until the next grain should be spawned.
///
/// The timer is initially due, so the very first tick triggers a spawn. When it triggers, it
/// re-arms itself with a freshly drawn dispersion time, then counts down by one sample per
/// tick until it's due again.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct DispersionTimer {
    samples_until_next: f64,
}

impl Default for DispersionTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl DispersionTimer {
    pub const fn new() -> Self {
        Self {
            samples_until_next: 0.0,
        }
    }

    /// Remaining samples until the timer is due.
    #[cfg(test)]
    pub fn samples_until_next(&self) -> f64 {
        self.samples_until_next
    }

    /// Make the timer due on its next tick.
    pub fn reset(&mut self) {
        self.samples_until_next = 0.0;
    }

    /// Advance the timer by one sample. Returns true when a grain should be spawned.
    ///
    /// `dispersion` is only invoked when the timer is due, to draw the next interval
    /// in samples.
    #[inline]
    pub fn tick<F: FnOnce() -> f64>(&mut self, dispersion: F) -> bool {
        if self.samples_until_next <= 0.0 {
            self.samples_until_next = dispersion();
            true
        } else {
            self.samples_until_next -= 1.0;
            false
        }
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn trigger_times(timer: &mut DispersionTimer, dispersion: f64, ticks: usize) -> Vec<usize> {
        (0..ticks)
            .filter(|_| timer.tick(|| dispersion))
            .collect()
    }

    #[test]
    fn fires_immediately() {
        let mut timer = DispersionTimer::new();
        assert!(timer.tick(|| 10.0));
        assert_eq!(timer.samples_until_next(), 10.0);
        assert!(!timer.tick(|| panic!("must not draw while waiting")));
        assert_eq!(timer.samples_until_next(), 9.0);
    }

    #[test]
    fn periodic_triggers() {
        let mut timer = DispersionTimer::new();
        assert_eq!(trigger_times(&mut timer, 240.0, 500), vec![0, 241, 482]);

        let mut timer = DispersionTimer::new();
        assert_eq!(trigger_times(&mut timer, 0.0, 4), vec![0, 1, 2, 3]);

        // due after ceil(dispersion) + 1 ticks
        let mut timer = DispersionTimer::new();
        assert_eq!(trigger_times(&mut timer, 1.5, 7), vec![0, 3, 6]);
    }

    #[test]
    fn reset() {
        let mut timer = DispersionTimer::new();
        assert!(timer.tick(|| 100.0));
        assert!(!timer.tick(|| 100.0));
        timer.reset();
        assert!(timer.tick(|| 100.0));
    }
}
