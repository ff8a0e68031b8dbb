//! Transaction handle shared by every write path.
//!
//! A write path opens one handle, passes `&mut dyn Transaction` to each
//! repository call, then finishes it with [`finish`]. Both terminal
//! operations consume the handle, so a closed transaction cannot be used
//! again. Dropping an unfinished handle rolls it back, which covers early
//! returns and cancelled request futures.

use std::any::Any;

use async_trait::async_trait;

use crate::error::CoreError;

#[async_trait]
pub trait Transaction: Send {
    async fn commit(self: Box<Self>) -> Result<(), CoreError>;

    async fn rollback(self: Box<Self>) -> Result<(), CoreError>;

    /// Access to the concrete handle, for the store that created it.
    fn as_any_mut(&mut self) -> &mut (dyn Any + Send);
}

/// Opens transactions against the local store.
#[async_trait]
pub trait TransactionManager: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn Transaction>, CoreError>;

    /// Cheap reachability check used by the health endpoint.
    async fn ping(&self) -> Result<(), CoreError>;
}

/// Borrow the concrete transaction type behind a handle.
///
/// A mismatch means a handle from one store was passed to another.
pub fn downcast<T: Any + Send>(tx: &mut dyn Transaction) -> Result<&mut T, CoreError> {
    tx.as_any_mut()
        .downcast_mut::<T>()
        .ok_or_else(|| CoreError::ServerError("transaction handle of unexpected type".into()))
}

/// Commit on success, roll back on failure.
///
/// A failed commit surfaces as [`CoreError::TransactionCommitFailed`]. A
/// failed rollback is logged and the original error is returned.
pub async fn finish<T: Send>(
    tx: Box<dyn Transaction>,
    outcome: Result<T, CoreError>,
) -> Result<T, CoreError> {
    match outcome {
        Ok(value) => match tx.commit().await {
            Ok(()) => Ok(value),
            Err(CoreError::TransactionCommitFailed(msg)) => {
                Err(CoreError::TransactionCommitFailed(msg))
            }
            Err(err) => Err(CoreError::TransactionCommitFailed(err.to_string())),
        },
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::error!(
                    error = %rollback_err,
                    original = %err,
                    "Rollback failed"
                );
            }
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use assert_matches::assert_matches;
    use parking_lot::Mutex;

    use super::*;

    #[derive(Default)]
    struct Journal {
        events: Mutex<Vec<&'static str>>,
    }

    struct RecordingTx {
        journal: Arc<Journal>,
        fail_commit: bool,
        fail_rollback: bool,
    }

    #[async_trait]
    impl Transaction for RecordingTx {
        async fn commit(self: Box<Self>) -> Result<(), CoreError> {
            self.journal.events.lock().push("commit");
            if self.fail_commit {
                return Err(CoreError::DatabaseUnavailable("connection reset".into()));
            }
            Ok(())
        }

        async fn rollback(self: Box<Self>) -> Result<(), CoreError> {
            self.journal.events.lock().push("rollback");
            if self.fail_rollback {
                return Err(CoreError::DatabaseUnavailable("connection reset".into()));
            }
            Ok(())
        }

        fn as_any_mut(&mut self) -> &mut (dyn Any + Send) {
            self
        }
    }

    fn tx(journal: &Arc<Journal>, fail_commit: bool, fail_rollback: bool) -> Box<dyn Transaction> {
        Box::new(RecordingTx {
            journal: Arc::clone(journal),
            fail_commit,
            fail_rollback,
        })
    }

    #[tokio::test]
    async fn success_commits() {
        let journal = Arc::new(Journal::default());
        let value = finish(tx(&journal, false, false), Ok(7)).await.unwrap();
        assert_eq!(value, 7);
        assert_eq!(*journal.events.lock(), vec!["commit"]);
    }

    #[tokio::test]
    async fn failure_rolls_back_and_keeps_the_error() {
        let journal = Arc::new(Journal::default());
        let result: Result<(), _> =
            finish(tx(&journal, false, false), Err(CoreError::InvalidTimeSequence)).await;
        assert_matches!(result, Err(CoreError::InvalidTimeSequence));
        assert_eq!(*journal.events.lock(), vec!["rollback"]);
    }

    #[tokio::test]
    async fn commit_failure_is_a_commit_error() {
        let journal = Arc::new(Journal::default());
        let result = finish(tx(&journal, true, false), Ok(())).await;
        assert_matches!(result, Err(CoreError::TransactionCommitFailed(_)));
    }

    #[tokio::test]
    async fn rollback_failure_does_not_mask_the_original_error() {
        let journal = Arc::new(Journal::default());
        let result: Result<(), _> =
            finish(tx(&journal, false, true), Err(CoreError::Unauthorized)).await;
        assert_matches!(result, Err(CoreError::Unauthorized));
    }

    #[tokio::test]
    async fn downcast_reaches_the_concrete_handle() {
        let journal = Arc::new(Journal::default());
        let mut handle = tx(&journal, false, false);
        let concrete = downcast::<RecordingTx>(handle.as_mut()).unwrap();
        assert!(!concrete.fail_commit);

        #[derive(Debug)]
        struct OtherTx;
        assert_matches!(
            downcast::<OtherTx>(handle.as_mut()),
            Err(CoreError::ServerError(_))
        );
    }
}
