// Time Provider Port (for testability)

use std::time::Instant;

/// Monotonic clock interface (allows mocking in tests)
pub trait TimeProvider: Send + Sync {
    /// Current monotonic instant
    fn now(&self) -> Instant;
}

/// System monotonic clock (production)
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

pub mod mocks {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Clock that only moves when told to
    pub struct ManualTimeProvider {
        origin: Instant,
        offset: Mutex<Duration>,
    }

    impl ManualTimeProvider {
        pub fn new() -> Self {
            Self {
                origin: Instant::now(),
                offset: Mutex::new(Duration::ZERO),
            }
        }

        pub fn advance(&self, by: Duration) {
            *self.offset.lock().unwrap() += by;
        }
    }

    impl Default for ManualTimeProvider {
        fn default() -> Self {
            Self::new()
        }
    }

    impl TimeProvider for ManualTimeProvider {
        fn now(&self) -> Instant {
            self.origin + *self.offset.lock().unwrap()
        }
    }
}
