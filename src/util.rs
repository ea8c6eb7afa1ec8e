use std::time::{Duration, SystemTime};

/// Cooperative cancellation probe. The search loops poll this at the top
/// of every iteration; an iteration in progress always runs to completion.
pub trait Stopper {
    fn stop(&mut self) -> bool;
    fn init(&mut self);
}

/// Wall-clock cutoff.
pub struct Timer {
    timer: SystemTime,
    duration: Duration,
}

impl Timer {
    pub fn new(duration: Duration) -> Self {
        Self {
            timer: SystemTime::now(),
            duration,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.timer.elapsed().expect("failed to obtain elapsed time")
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed().as_secs_f64()
    }
}

impl Stopper for Timer {
    fn stop(&mut self) -> bool {
        self.elapsed() > self.duration
    }

    fn init(&mut self) {
        self.timer = SystemTime::now();
    }
}

#[cfg(test)]
mod tests {
    use crate::util::{Stopper, Timer};
    use std::time::Duration;

    #[test]
    fn generous_timer_does_not_stop() {
        let mut timer = Timer::new(Duration::from_secs(3600));
        timer.init();
        assert!(!timer.stop());
    }

    #[test]
    fn zero_timer_stops() {
        let mut timer = Timer::new(Duration::from_secs(0));
        timer.init();
        std::thread::sleep(Duration::from_millis(5));
        assert!(timer.stop());
    }
}
