//! Per-request scope: trace id, caller identity, cancellation and the
//! time budgets for outbound calls.
//!
//! The scope is an explicit value passed down the call chain. Every
//! repository or identity-provider call made on behalf of a request goes
//! through [`RequestScope::bounded`], which stops early when the request is
//! cancelled or the call exceeds its budget.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::CoreError;
use crate::types::DbId;

/// Time budgets per class of outbound call.
#[derive(Debug, Clone, Copy)]
pub struct Budgets {
    pub db: Duration,
    pub identity: Duration,
    /// Separate budget for compensating actions. Not tied to the request's
    /// cancellation token.
    pub compensation: Duration,
}

impl Default for Budgets {
    fn default() -> Self {
        Self {
            db: Duration::from_millis(5_000),
            identity: Duration::from_millis(10_000),
            compensation: Duration::from_millis(10_000),
        }
    }
}

/// Who is making the request, as established by the bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    /// Subject of the token: the identity provider's user id.
    pub external_user_id: String,
    pub email: Option<String>,
    pub roles: Vec<String>,
    /// Local employee mirrored for `external_user_id`, when one exists.
    pub employee_id: Option<DbId>,
}

impl Caller {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

#[derive(Debug, Clone)]
pub struct RequestScope {
    pub trace_id: String,
    pub caller: Option<Caller>,
    pub budgets: Budgets,
    cancel: CancellationToken,
}

impl RequestScope {
    pub fn new(trace_id: impl Into<String>, budgets: Budgets) -> Self {
        Self {
            trace_id: trace_id.into(),
            caller: None,
            budgets,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_caller(mut self, caller: Caller) -> Self {
        self.caller = Some(caller);
        self
    }

    /// Token cancelled when the request is abandoned.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// The caller's local employee id, required by owner-scoped resources.
    pub fn employee_id(&self) -> Result<DbId, CoreError> {
        let caller = self
            .caller
            .as_ref()
            .ok_or_else(|| CoreError::Unauthenticated("no caller in scope".into()))?;
        caller
            .employee_id
            .ok_or(CoreError::NotFound(crate::error::Entity::Employee))
    }

    /// Run `fut` under the request's cancellation and a time budget.
    ///
    /// Cancellation yields [`CoreError::RequestCancelled`]; running past the
    /// budget yields `on_timeout`.
    pub async fn bounded<T, F>(
        &self,
        budget: Duration,
        on_timeout: CoreError,
        fut: F,
    ) -> Result<T, CoreError>
    where
        F: Future<Output = Result<T, CoreError>>,
    {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(CoreError::RequestCancelled),
            outcome = tokio::time::timeout(budget, fut) => match outcome {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!(
                        trace_id = %self.trace_id,
                        code = on_timeout.code(),
                        "Call exceeded its budget"
                    );
                    Err(on_timeout)
                }
            },
        }
    }

    /// [`RequestScope::bounded`] with the database budget.
    pub async fn db<T, F>(&self, fut: F) -> Result<T, CoreError>
    where
        F: Future<Output = Result<T, CoreError>>,
    {
        self.bounded(
            self.budgets.db,
            CoreError::DatabaseUnavailable("timed out".into()),
            fut,
        )
        .await
    }

    /// [`RequestScope::bounded`] with the identity-provider budget.
    pub async fn identity<T, F>(&self, fut: F) -> Result<T, CoreError>
    where
        F: Future<Output = Result<T, CoreError>>,
    {
        self.bounded(
            self.budgets.identity,
            CoreError::IdentityProviderUnavailable("timed out".into()),
            fut,
        )
        .await
    }
}

/// Run a compensating action with its own budget, ignoring cancellation.
pub async fn compensate<T, F>(budget: Duration, fut: F) -> Result<T, CoreError>
where
    F: Future<Output = Result<T, CoreError>>,
{
    tokio::time::timeout(budget, fut)
        .await
        .unwrap_or_else(|_| Err(CoreError::OperationFailed("compensation timed out".into())))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn scope() -> RequestScope {
        RequestScope::new("trace-1", Budgets::default())
    }

    #[tokio::test]
    async fn bounded_passes_results_through() {
        let value = scope()
            .db(async { Ok::<_, CoreError>(3) })
            .await
            .unwrap();
        assert_eq!(value, 3);
    }

    #[tokio::test]
    async fn slow_calls_report_their_class_as_unavailable() {
        let scope = RequestScope::new(
            "trace-2",
            Budgets {
                db: Duration::from_millis(50),
                identity: Duration::from_millis(50),
                compensation: Duration::from_millis(50),
            },
        );

        let slow = async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, CoreError>(())
        };
        assert_matches!(scope.db(slow).await, Err(CoreError::DatabaseUnavailable(_)));

        let slow = async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, CoreError>(())
        };
        assert_matches!(
            scope.identity(slow).await,
            Err(CoreError::IdentityProviderUnavailable(_))
        );
    }

    #[tokio::test]
    async fn cancelled_scope_stops_new_calls() {
        let scope = scope();
        scope.cancellation().cancel();
        assert!(scope.is_cancelled());
        assert_matches!(
            scope.db(async { Ok::<_, CoreError>(()) }).await,
            Err(CoreError::RequestCancelled)
        );
    }

    #[tokio::test]
    async fn compensation_ignores_request_cancellation() {
        let scope = scope();
        scope.cancellation().cancel();
        let result = compensate(scope.budgets.compensation, async { Ok::<_, CoreError>(1) }).await;
        assert_eq!(result.unwrap(), 1);
    }

    #[test]
    fn employee_id_requires_a_mirrored_caller() {
        let anonymous = scope();
        assert_matches!(anonymous.employee_id(), Err(CoreError::Unauthenticated(_)));

        let unmirrored = scope().with_caller(Caller {
            external_user_id: "kc-1".into(),
            email: None,
            roles: vec![],
            employee_id: None,
        });
        assert_matches!(
            unmirrored.employee_id(),
            Err(CoreError::NotFound(crate::error::Entity::Employee))
        );

        let id = crate::types::new_id();
        let mirrored = scope().with_caller(Caller {
            external_user_id: "kc-1".into(),
            email: None,
            roles: vec!["pilot".into()],
            employee_id: Some(id),
        });
        assert_eq!(mirrored.employee_id().unwrap(), id);
        assert!(mirrored.caller.as_ref().unwrap().has_role("pilot"));
    }
}
