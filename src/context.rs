use crate::error::{StoreError, StoreResult};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Per-call execution limits supplied by the caller of a store operation.
///
/// Carries a [`CancellationToken`] the request layer can trip (for example
/// when the client disconnects) and an optional deadline for the storage call.
#[derive(Debug, Clone, Default)]
pub struct OpContext {
    cancel: CancellationToken,
    timeout: Option<Duration>,
}

impl OpContext {
    /// No deadline, never cancelled unless [`cancel`](Self::cancel) is called.
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_token(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Starts the clock for one store operation.
    ///
    /// All steps run through the returned [`OpGuard`] share a single deadline.
    pub fn start(&self) -> OpGuard<'_> {
        OpGuard {
            ctx: self,
            deadline: self.timeout.map(|limit| (Instant::now() + limit, limit)),
        }
    }

    /// Drives `op` to completion unless the token fires or the deadline passes first.
    ///
    /// Shorthand for `self.start().run(op)` when an operation has one step.
    pub async fn run<T, F>(&self, op: F) -> StoreResult<T>
    where
        F: Future<Output = StoreResult<T>>,
    {
        self.start().run(op).await
    }
}

/// The running clock of one operation started with [`OpContext::start`].
///
/// Dropping a storage future does not undo work the driver has already been
/// handed. Writers therefore run their statement through [`run`](Self::run)
/// inside a transaction and call [`check`](Self::check) right before
/// committing, so a call reported as cancelled or timed out is never applied.
#[derive(Debug)]
pub struct OpGuard<'a> {
    ctx: &'a OpContext,
    deadline: Option<(Instant, Duration)>,
}

impl OpGuard<'_> {
    /// Fails if the token has fired or the deadline has passed.
    pub fn check(&self) -> StoreResult<()> {
        if self.ctx.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        match self.deadline {
            Some((at, limit)) if Instant::now() >= at => Err(StoreError::TimedOut(limit)),
            _ => Ok(()),
        }
    }

    /// Races `op` against the token and the remaining time.
    pub async fn run<T, F>(&self, op: F) -> StoreResult<T>
    where
        F: Future<Output = StoreResult<T>>,
    {
        self.check()?;

        let guarded = async {
            tokio::select! {
                biased;
                _ = self.ctx.cancel.cancelled() => Err(StoreError::Cancelled),
                res = op => res,
            }
        };

        match self.deadline {
            Some((at, limit)) => tokio::time::timeout_at(at, guarded)
                .await
                .map_err(|_| StoreError::TimedOut(limit))?,
            None => guarded.await,
        }
    }
}
