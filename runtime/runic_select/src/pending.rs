//! Deferred call commit.
//!
//! `Selector::call` does not invoke anything — it captures the argument list
//! and hands back a `PendingCall` guard. The requested result arity is
//! decided only when results are actually extracted; a guard that goes out
//! of scope unconsumed commits the call with zero requested results, so a
//! call written as a bare statement still runs exactly once.

use smallvec::SmallVec;

use runic_value::{EvalResult, FromValues, Value};

use crate::selector::Selector;

/// A captured call intent, committed on consumption or on scope exit.
///
/// # Scope-exit commit
///
/// Dropping the guard unconsumed replays the selector's plan and invokes
/// the target requesting zero results. A failure on this path has no call
/// site to return to; it is reported through `tracing::error!` — a
/// documented sharp edge. Use [`PendingCall::discard`] to commit eagerly
/// with a caller-visible error path.
pub struct PendingCall {
    selector: Selector,
    args: SmallVec<[Value; 4]>,
    consumed: bool,
}

impl PendingCall {
    pub(crate) fn new(selector: Selector, args: Vec<Value>) -> Self {
        PendingCall {
            selector,
            args: SmallVec::from_vec(args),
            consumed: false,
        }
    }

    fn commit(&self, nres: usize) -> EvalResult<Vec<Value>> {
        self.selector.call_with(&self.args, nres)
    }

    /// Commit the call, requesting exactly the results `R` names, in call
    /// order.
    pub fn returning<R: FromValues>(mut self) -> EvalResult<R> {
        self.consumed = true;
        let results = self.commit(R::ARITY)?;
        R::from_values(results)
    }

    /// Commit the call now, requesting zero results.
    pub fn discard(mut self) -> EvalResult<()> {
        self.consumed = true;
        self.commit(0).map(|_| ())
    }
}

impl Drop for PendingCall {
    fn drop(&mut self) {
        if self.consumed {
            return;
        }
        if let Err(err) = self.commit(0) {
            tracing::error!(
                path = %self.selector.name(),
                error = %err,
                "deferred call failed during scope-exit commit"
            );
        }
    }
}
