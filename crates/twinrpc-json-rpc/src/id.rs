//! Request id sources for outgoing calls.

use std::sync::atomic::{AtomicI64, Ordering};

/// Smallest id handed out automatically
pub const ID_MIN: i64 = 1;
/// Largest id handed out automatically (32-bit signed max)
pub const ID_MAX: i64 = (1 << 31) - 1;

/// Source of ids for requests sent with [`CallId::Auto`](crate::CallId::Auto).
///
/// Implementations must be safe to call from many tasks at once.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> i64;
}

/// Uniform random ids in `[ID_MIN, ID_MAX]`, drawn from the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn next_id(&self) -> i64 {
        // Masking to 31 bits is uniform over [0, ID_MAX]; zero is redrawn.
        loop {
            let candidate = i64::from(rand::random::<u32>() & 0x7FFF_FFFF);
            if candidate >= ID_MIN {
                return candidate;
            }
        }
    }
}

/// Monotonic ids, for reproducible traffic in tests and tooling.
#[derive(Debug)]
pub struct SequentialIdGenerator {
    next: AtomicI64,
}

impl SequentialIdGenerator {
    pub fn new(start: i64) -> Self {
        Self {
            next: AtomicI64::new(start),
        }
    }
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::new(ID_MIN)
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> i64 {
        self.next.fetch_add(1, Ordering::SeqCst)
    }
}
