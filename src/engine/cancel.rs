#![forbid(unsafe_code)]

//! Cancellation and deadlines for compliance checks

use crate::error::CheckError;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

#[derive(Debug)]
struct TokenState {
    cancelled: AtomicBool,
    deadline: Option<(Instant, Duration)>,
}

/// Shared cancellation flag with an optional deadline
///
/// Rules call [`CancellationToken::check`] before every store read, so a
/// cancelled or expired check stops issuing reads at the next batch boundary.
/// Clones share state. A [`child`](CancellationToken::child) token is cancelled
/// whenever its parent is, but cancelling the child leaves the parent running.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    state: Arc<TokenState>,
    parent: Option<Box<CancellationToken>>,
}

impl CancellationToken {
    /// A token with no deadline
    pub fn new() -> Self {
        Self::from_state(None)
    }

    /// A token that expires `timeout` from now
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::from_state(Some((Instant::now() + timeout, timeout)))
    }

    fn from_state(deadline: Option<(Instant, Duration)>) -> Self {
        Self {
            state: Arc::new(TokenState {
                cancelled: AtomicBool::new(false),
                deadline,
            }),
            parent: None,
        }
    }

    /// A token cancelled along with this one that can also be cancelled on its own
    pub fn child(&self) -> Self {
        Self {
            parent: Some(Box::new(self.clone())),
            ..Self::new()
        }
    }

    pub fn cancel(&self) {
        self.state.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.check().is_err()
    }

    /// Fails with `Timeout` past the deadline or `Cancelled` once cancelled
    ///
    /// Ancestors are consulted first, so a timed-out parent reports `Timeout`
    /// even when the child was also cancelled.
    pub fn check(&self) -> Result<(), CheckError> {
        if let Some(parent) = &self.parent {
            parent.check()?;
        }
        if let Some((deadline, timeout)) = self.state.deadline
            && Instant::now() >= deadline
        {
            return Err(CheckError::Timeout(timeout));
        }
        if self.state.cancelled.load(Ordering::SeqCst) {
            return Err(CheckError::Cancelled);
        }
        Ok(())
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}
