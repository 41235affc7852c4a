use crate::error::{ErrorKind, GreeError};
use tracing::{info, warn};

/// Consecutive failed polls tolerated before a device is reported offline
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Turns a stream of operation results into an online/offline flag.
///
/// Retryable failures (transport, decode) only flip the device offline
/// after `max_attempts` in a row. Anything else is a configuration problem
/// and marks it offline at once. Any success resets the count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Availability {
    max_attempts: u32,
    consecutive_failures: u32,
    online: Option<bool>,
    last_error: Option<ErrorKind>,
}

impl Default for Availability {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS)
    }
}

impl Availability {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            consecutive_failures: 0,
            online: None,
            last_error: None,
        }
    }

    /// `None` until the first result has been recorded
    pub fn online(&self) -> Option<bool> {
        self.online
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn last_error(&self) -> Option<ErrorKind> {
        self.last_error
    }

    pub fn record_success(&mut self) {
        if self.online != Some(true) {
            info!("Device is online");
        }
        self.consecutive_failures = 0;
        self.last_error = None;
        self.online = Some(true);
    }

    pub fn record_failure(&mut self, error: &GreeError) {
        let kind = error.kind();
        self.last_error = Some(kind);
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);

        if !kind.is_retryable() || self.consecutive_failures >= self.max_attempts {
            if self.online != Some(false) {
                warn!(
                    "Device marked offline after {} failure(s), last: {}",
                    self.consecutive_failures, error
                );
            }
            self.online = Some(false);
        }
    }

    /// Record the outcome of any operation
    pub fn record<T>(&mut self, result: &Result<T, GreeError>) {
        match result {
            Ok(_) => self.record_success(),
            Err(e) => self.record_failure(e),
        }
    }
}
