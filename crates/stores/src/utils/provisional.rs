//! Placeholder ids for messages the server has not confirmed yet.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use tubechat_models::MessageId;

/// Hands out provisional message ids.
///
/// Ids follow the wall clock in milliseconds and are strictly increasing
/// within one generator. They only label locally displayed messages and are
/// not unique across processes.
#[derive(Debug, Default)]
pub struct ProvisionalIds {
    last: AtomicI64,
}

impl ProvisionalIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> MessageId {
        let now = Utc::now().timestamp_millis();
        let mut current = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(current + 1);
            match self.last.compare_exchange_weak(
                current,
                candidate,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return candidate,
                Err(actual) => current = actual,
            }
        }
    }
}
