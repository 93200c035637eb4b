//! Id generation and clock capabilities.
//!
//! # Responsibility
//! - Keep entity factories and normalizers free of ambient randomness/time.
//! - Provide deterministic implementations for tests.
//!
//! # Invariants
//! - An `IdGenerator` never returns an empty string.
//! - One `NormalizeCtx` carries a single `now` for a whole normalization
//!   pass, so sibling entities get comparable fallback timestamps.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Unix epoch milliseconds.
pub type EpochMs = i64;

/// Source of fresh entity ids.
pub trait IdGenerator {
    /// Returns a new id that was not returned before by this generator.
    fn next_id(&mut self) -> String;
}

/// Random v4 UUID ids. Default for production stores.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&mut self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Deterministic `<prefix>-<n>` ids starting at 1.
#[derive(Debug, Clone)]
pub struct SequentialIdGenerator {
    prefix: String,
    next: u64,
}

impl SequentialIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::new("id")
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&mut self) -> String {
        let id = format!("{}-{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}

/// Source of the current time.
pub trait Clock {
    fn now_ms(&self) -> EpochMs;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> EpochMs {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
            .unwrap_or(0)
    }
}

/// Manually driven clock for tests and replay.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<EpochMs>,
}

impl ManualClock {
    pub fn new(now: EpochMs) -> Self {
        Self {
            now: Cell::new(now),
        }
    }

    pub fn set(&self, now: EpochMs) {
        self.now.set(now);
    }

    pub fn advance(&self, delta_ms: EpochMs) {
        self.now.set(self.now.get() + delta_ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> EpochMs {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for Rc<C> {
    fn now_ms(&self) -> EpochMs {
        (**self).now_ms()
    }
}

/// Capabilities threaded through factories and normalizers.
pub struct NormalizeCtx<'a> {
    ids: &'a mut dyn IdGenerator,
    now: EpochMs,
}

impl<'a> NormalizeCtx<'a> {
    pub fn new(ids: &'a mut dyn IdGenerator, now: EpochMs) -> Self {
        Self { ids, now }
    }

    /// Returns a fresh id from the injected generator.
    pub fn next_id(&mut self) -> String {
        self.ids.next_id()
    }

    /// Timestamp shared by the whole pass.
    pub fn now(&self) -> EpochMs {
        self.now
    }
}
