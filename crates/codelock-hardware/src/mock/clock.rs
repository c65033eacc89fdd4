//! Virtual clock for testing timing-dependent code.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::traits::Delay;

/// Delay implementation that advances virtual time instead of sleeping.
///
/// Clones share the same clock.
///
/// # Examples
///
/// ```
/// use codelock_hardware::mock::MockClock;
/// use codelock_hardware::traits::Delay;
///
/// let mut clock = MockClock::new();
/// clock.delay_ms(100);
/// clock.delay_ms(50);
/// assert_eq!(clock.elapsed_ms(), 150);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockClock {
    elapsed_ms: Arc<AtomicU64>,
    delays: Arc<AtomicU64>,
}

impl MockClock {
    /// Create a clock at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total virtual time waited.
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms.load(Ordering::Relaxed)
    }

    /// Number of delay calls.
    pub fn delay_count(&self) -> u64 {
        self.delays.load(Ordering::Relaxed)
    }
}

impl Delay for MockClock {
    fn delay_ms(&mut self, ms: u32) {
        self.elapsed_ms.fetch_add(u64::from(ms), Ordering::Relaxed);
        self.delays.fetch_add(1, Ordering::Relaxed);
    }
}
