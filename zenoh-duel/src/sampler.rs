//! Decides which periodic state samples are worth sending

use tetris_core::Status;

/// Sampling policy for outbound state updates.
///
/// While running every sample is sent. Otherwise a sample is sent only when
/// the status differs from the one seen at the previous sample, so an idle
/// board is announced once instead of on every timer tick.
#[derive(Debug, Default, Clone)]
pub struct Sampler {
    last_sent_status: Option<Status>,
}

impl Sampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a sample with `status`, returning whether to publish it
    pub fn sample(&mut self, status: Status) -> bool {
        let changed = self.last_sent_status != Some(status);
        self.last_sent_status = Some(status);
        status == Status::Running || changed
    }

    /// Forget history so the next sample is always sent
    pub fn reset(&mut self) {
        self.last_sent_status = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_sample_always_sent() {
        let mut sampler = Sampler::new();
        assert!(sampler.sample(Status::Waiting));
    }

    #[test]
    fn test_idle_statuses_are_edge_triggered() {
        let mut sampler = Sampler::new();
        assert!(sampler.sample(Status::Waiting));
        assert!(!sampler.sample(Status::Waiting));
        assert!(!sampler.sample(Status::Waiting));
        assert!(sampler.sample(Status::Starting));
        assert!(!sampler.sample(Status::Starting));
    }

    #[test]
    fn test_running_is_level_triggered() {
        let mut sampler = Sampler::new();
        for _ in 0..5 {
            assert!(sampler.sample(Status::Running));
        }
        assert!(sampler.sample(Status::Paused));
        assert!(!sampler.sample(Status::Paused));
        assert!(sampler.sample(Status::Running));
        assert!(sampler.sample(Status::Ended));
        assert!(!sampler.sample(Status::Ended));
    }

    #[test]
    fn test_reset() {
        let mut sampler = Sampler::new();
        sampler.sample(Status::Ended);
        sampler.reset();
        assert!(sampler.sample(Status::Ended));
    }
}
