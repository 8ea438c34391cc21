use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch
pub type CurrentTime = u64;

pub fn now_ms() -> CurrentTime {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as CurrentTime)
        .unwrap_or(0)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stamped<T> {
    pub timestamp: CurrentTime,
    pub value: T,
}

/// Single-slot memo that forgets its value after `ttl` milliseconds.
///
/// There is no key: whoever owns the memo decides what the slot stands for.
/// Time is passed in by the caller.
#[derive(Debug, Clone)]
pub struct TimedMemo<T> {
    ttl: CurrentTime,
    slot: Option<Stamped<T>>,
}

impl<T> TimedMemo<T> {
    pub fn new(ttl: CurrentTime) -> Self {
        Self { ttl, slot: None }
    }

    pub fn ttl(&self) -> CurrentTime {
        self.ttl
    }

    /// The stored value if it is younger than the ttl at `now`
    pub fn get(&self, now: CurrentTime) -> Option<&Stamped<T>> {
        self.slot
            .as_ref()
            .filter(|stamped| now.saturating_sub(stamped.timestamp) < self.ttl)
    }

    pub fn store(&mut self, timestamp: CurrentTime, value: T) -> &Stamped<T> {
        self.slot.insert(Stamped { timestamp, value })
    }

    pub fn invalidate(&mut self) {
        self.slot = None;
    }
}
