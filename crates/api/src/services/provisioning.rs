//! Account provisioning across the local employee store and the identity
//! provider.
//!
//! Registration writes the local row inside a transaction, creates the
//! external account, and only commits once the external side is complete.
//! A failure after the external account exists deletes it again
//! (compensation). Leftovers from failed compensations are cleaned up by
//! [`ProvisioningService::reconcile`], which a refused registration also
//! runs on its own. Airline staff rows are local-only and never count as
//! leftovers.

use std::sync::Arc;

use flighthours_core::error::CoreError;
use flighthours_core::logbook::{check_date_range, parse_date};
use flighthours_core::provisioning::{
    AccountState, Reconciliation, RegistrationAttempt, RegistrationStage,
};
use flighthours_core::scope::{compensate, RequestScope};
use flighthours_core::tx::{self, Transaction, TransactionManager};
use flighthours_core::types::new_id;
use flighthours_db::models::employee::{Employee, NewEmployee, RegisterEmployee};
use flighthours_db::repositories::EmployeeRepository;
use flighthours_identity::{ExternalUser, IdentityProvider, NewExternalUser};

use super::airline_employees::optional_date;
use super::normalize_email;

#[derive(Clone)]
pub struct ProvisioningService {
    employees: Arc<dyn EmployeeRepository>,
    identity: Arc<dyn IdentityProvider>,
    tx: Arc<dyn TransactionManager>,
    send_verification_email: bool,
}

impl ProvisioningService {
    pub fn new(
        employees: Arc<dyn EmployeeRepository>,
        identity: Arc<dyn IdentityProvider>,
        tx: Arc<dyn TransactionManager>,
        send_verification_email: bool,
    ) -> Self {
        Self {
            employees,
            identity,
            tx,
            send_verification_email,
        }
    }

    /// Register a new employee in both stores.
    ///
    /// The role is checked before anything is read from either store. A
    /// half-finished earlier registration is cleaned up and reported as
    /// `IncompleteRegistration`, so the next attempt starts clean. The
    /// remaining steps run on their own task, so an abandoned request still
    /// finishes its compensation.
    pub async fn register(
        &self,
        scope: &RequestScope,
        input: RegisterEmployee,
    ) -> Result<Employee, CoreError> {
        let role = input.role.trim().to_string();
        if role.is_empty() {
            return Err(CoreError::RoleRequired);
        }
        let (new, password) = validate(input, role)?;

        let observed = self.observe(scope, &new.email).await?;
        let state = observed.state();
        if let Err(err) = state.admit_registration() {
            tracing::info!(
                trace_id = %scope.trace_id,
                email = %new.email,
                ?state,
                code = err.code(),
                "Registration refused"
            );
            if !state.is_consistent() {
                self.clean_detached(scope, &new.email, observed).await;
            }
            return Err(err);
        }

        let this = self.clone();
        let task_scope = scope.clone();
        tokio::spawn(async move { this.run_registration(&task_scope, new, password).await })
            .await
            .map_err(|err| CoreError::ServerError(format!("registration task failed: {err}")))?
    }

    /// Reconcile a refused account under the compensation budget, detached
    /// from the request's cancellation. Failures are logged only.
    async fn clean_detached(&self, scope: &RequestScope, email: &str, observed: Observed) {
        let this = self.clone();
        let detached = RequestScope::new(scope.trace_id.clone(), scope.budgets);
        let budget = scope.budgets.compensation;
        let task_email = email.to_string();
        let cleaned = tokio::spawn(async move {
            compensate(budget, this.clean(&detached, &task_email, observed)).await
        })
        .await;

        match cleaned {
            Ok(Ok(outcome)) => tracing::info!(
                trace_id = %scope.trace_id,
                email,
                ?outcome,
                "Incomplete registration cleaned up"
            ),
            Ok(Err(err)) => tracing::error!(
                alert = "provisioning_reconcile_failed",
                trace_id = %scope.trace_id,
                email,
                error = %err,
                "Incomplete registration left in place"
            ),
            Err(err) => tracing::error!(
                alert = "provisioning_reconcile_failed",
                trace_id = %scope.trace_id,
                email,
                error = %err,
                "Reconciliation task failed"
            ),
        }
    }

    async fn run_registration(
        &self,
        scope: &RequestScope,
        new: NewEmployee,
        password: String,
    ) -> Result<Employee, CoreError> {
        let mut attempt = RegistrationAttempt::new();
        attempt.advance(RegistrationStage::Checked)?;

        let mut tx = scope
            .db(self.tx.begin())
            .await
            .map_err(|err| self.unwind_early(scope, &mut attempt, &new.email, err))?;

        let mut employee = match scope.db(self.employees.insert(tx.as_mut(), &new)).await {
            Ok(employee) => employee,
            Err(err) => {
                let err = match err {
                    CoreError::DuplicateUser
                    | CoreError::UserCannotSave(_)
                    | CoreError::DatabaseUnavailable(_)
                    | CoreError::RequestCancelled => err,
                    other => CoreError::UserCannotSave(other.to_string()),
                };
                return Err(self.unwind(scope, &mut attempt, Some(tx), &new.email, err).await);
            }
        };
        attempt.advance(RegistrationStage::LocalSaved)?;

        let external = NewExternalUser::from_full_name(&new.email, &new.name, new.id.to_string());
        let created = scope
            .identity(async {
                self.identity
                    .create_user(&external)
                    .await
                    .map_err(|err| err.into_core(CoreError::ExternalUserCreationFailed))
            })
            .await;
        let external_id = match created {
            Ok(id) => id,
            Err(err) => {
                return Err(self.unwind(scope, &mut attempt, Some(tx), &new.email, err).await)
            }
        };
        attempt.external_created(external_id.clone())?;

        let password_set = scope
            .identity(async {
                self.identity
                    .set_password(&external_id, &password, true)
                    .await
                    .map_err(|err| err.into_core(CoreError::OperationFailed))
            })
            .await;
        if let Err(err) = password_set {
            return Err(self.unwind(scope, &mut attempt, Some(tx), &new.email, err).await);
        }
        attempt.advance(RegistrationStage::ExternalPasswordSet)?;

        let role_assigned = scope
            .identity(async {
                self.identity
                    .assign_role(&external_id, &new.role)
                    .await
                    .map_err(|err| err.into_core(CoreError::OperationFailed))
            })
            .await;
        if let Err(err) = role_assigned {
            return Err(self.unwind(scope, &mut attempt, Some(tx), &new.email, err).await);
        }
        attempt.advance(RegistrationStage::ExternalRoleAssigned)?;

        if let Err(err) = scope
            .db(self.employees.link_external(tx.as_mut(), employee.id, &external_id))
            .await
        {
            return Err(self.unwind(scope, &mut attempt, Some(tx), &new.email, err).await);
        }
        attempt.advance(RegistrationStage::LocalLinked)?;

        if let Err(err) = tx.commit().await {
            let err = match err {
                CoreError::TransactionCommitFailed(_) => err,
                other => CoreError::TransactionCommitFailed(other.to_string()),
            };
            return Err(self.unwind(scope, &mut attempt, None, &new.email, err).await);
        }
        attempt.advance(RegistrationStage::Committed)?;
        employee.keycloak_user_id = Some(external_id.clone());

        tracing::info!(
            trace_id = %scope.trace_id,
            employee_id = %employee.id,
            email = %employee.email,
            %external_id,
            "Employee registered"
        );

        if self.send_verification_email {
            let sent = scope
                .identity(async {
                    self.identity
                        .send_verification_email(&employee.email)
                        .await
                        .map_err(|err| err.into_core(CoreError::OperationFailed))
                })
                .await;
            if let Err(err) = sent {
                tracing::warn!(
                    trace_id = %scope.trace_id,
                    email = %employee.email,
                    error = %err,
                    "Verification email not sent"
                );
            }
        }

        Ok(employee)
    }

    /// Failure before anything was written.
    fn unwind_early(
        &self,
        scope: &RequestScope,
        attempt: &mut RegistrationAttempt,
        email: &str,
        err: CoreError,
    ) -> CoreError {
        attempt.begin_compensation();
        attempt.fail();
        tracing::warn!(
            trace_id = %scope.trace_id,
            email,
            code = err.code(),
            error = %err,
            "Registration failed"
        );
        err
    }

    /// Undo what the attempt has done so far and hand back `err`.
    ///
    /// The external account (if one exists) is deleted first, then the
    /// local transaction is rolled back. Both run under the compensation
    /// budget and ignore request cancellation. A failed compensation is
    /// logged as an alert and never replaces `err`.
    async fn unwind(
        &self,
        scope: &RequestScope,
        attempt: &mut RegistrationAttempt,
        tx: Option<Box<dyn Transaction>>,
        email: &str,
        err: CoreError,
    ) -> CoreError {
        let stage = attempt.stage();
        let budget = scope.budgets.compensation;

        if let Some(external_id) = attempt.begin_compensation() {
            let deleted = compensate(budget, async {
                match self.identity.delete_user(&external_id).await {
                    Err(e) if !e.is_not_found() => Err(e.into_core(CoreError::OperationFailed)),
                    _ => Ok(()),
                }
            })
            .await;
            match deleted {
                Ok(()) => tracing::info!(
                    trace_id = %scope.trace_id,
                    email,
                    %external_id,
                    "External account removed after failed registration"
                ),
                Err(compensation_err) => tracing::error!(
                    alert = "provisioning_compensation_failed",
                    trace_id = %scope.trace_id,
                    email,
                    %external_id,
                    ?stage,
                    error = %compensation_err,
                    original = %err,
                    "External account left behind; reconciliation required"
                ),
            }
        }

        if let Some(tx) = tx {
            if let Err(rollback_err) = compensate(budget, tx.rollback()).await {
                tracing::error!(
                    trace_id = %scope.trace_id,
                    email,
                    error = %rollback_err,
                    original = %err,
                    "Rollback after failed registration failed"
                );
            }
        }

        attempt.fail();
        tracing::warn!(
            trace_id = %scope.trace_id,
            email,
            ?stage,
            code = err.code(),
            error = %err,
            "Registration failed"
        );
        err
    }

    /// Both sides of `email`, as they are right now.
    async fn observe(&self, scope: &RequestScope, email: &str) -> Result<Observed, CoreError> {
        let local = scope.db(self.employees.find_by_email(email)).await?;
        let external = self.find_external(scope, email).await?;
        Ok(Observed { local, external })
    }

    async fn find_external(
        &self,
        scope: &RequestScope,
        email: &str,
    ) -> Result<Option<ExternalUser>, CoreError> {
        scope
            .identity(async {
                match self.identity.get_user_by_email(email).await {
                    Ok(user) => Ok(Some(user)),
                    Err(err) if err.is_not_found() => Ok(None),
                    Err(err) => Err(err.into_core(CoreError::OperationFailed)),
                }
            })
            .await
    }

    /// Bring one account back to a consistent state.
    ///
    /// When exactly one side of a registered account exists it is deleted,
    /// so a later registration starts clean. Airline staff rows have no
    /// external side and are left alone. Running it again (or concurrently)
    /// finds nothing to do.
    pub async fn reconcile(
        &self,
        scope: &RequestScope,
        email: &str,
    ) -> Result<Reconciliation, CoreError> {
        let email = normalize_email(email)?;
        let observed = self.observe(scope, &email).await?;
        let outcome = self.clean(scope, &email, observed).await?;
        tracing::info!(trace_id = %scope.trace_id, %email, ?outcome, "Account reconciled");
        Ok(outcome)
    }

    async fn clean(
        &self,
        scope: &RequestScope,
        email: &str,
        observed: Observed,
    ) -> Result<Reconciliation, CoreError> {
        match observed.state() {
            AccountState::LocalOnly => {
                let Some(employee) = observed.local else {
                    return Ok(Reconciliation::AlreadyConsistent);
                };
                let mut tx = scope.db(self.tx.begin()).await?;
                let deleted = scope.db(self.employees.delete(tx.as_mut(), employee.id)).await;
                tx::finish(tx, deleted).await?;
                tracing::warn!(
                    trace_id = %scope.trace_id,
                    email,
                    employee_id = %employee.id,
                    "Removed local employee without an external account"
                );
                Ok(Reconciliation::RemovedLocal)
            }
            AccountState::ExternalOnly => {
                let Some(user) = observed.external else {
                    return Ok(Reconciliation::AlreadyConsistent);
                };
                scope
                    .identity(async {
                        match self.identity.delete_user(&user.id).await {
                            Err(e) if !e.is_not_found() => {
                                Err(e.into_core(CoreError::OperationFailed))
                            }
                            _ => Ok(()),
                        }
                    })
                    .await?;
                tracing::warn!(
                    trace_id = %scope.trace_id,
                    email,
                    external_id = %user.id,
                    "Removed external account without a local employee"
                );
                Ok(Reconciliation::RemovedExternal)
            }
            AccountState::Absent | AccountState::Linked | AccountState::Staff => {
                Ok(Reconciliation::AlreadyConsistent)
            }
        }
    }
}

/// One account as read from both stores.
struct Observed {
    local: Option<Employee>,
    external: Option<ExternalUser>,
}

impl Observed {
    fn state(&self) -> AccountState {
        AccountState::classify(
            self.local.as_ref().map(Employee::origin),
            self.external.is_some(),
        )
    }
}

fn validate(input: RegisterEmployee, role: String) -> Result<(NewEmployee, String), CoreError> {
    let name = input.name.trim().to_string();
    if name.is_empty() {
        return Err(CoreError::InvalidRequest("name is required".into()));
    }
    let email = normalize_email(&input.email)?;
    if input.password.is_empty() {
        return Err(CoreError::InvalidRequest("password is required".into()));
    }
    let identification_number = input.identification_number.trim().to_string();
    if identification_number.is_empty() {
        return Err(CoreError::InvalidRequest("identification_number is required".into()));
    }

    let start_date = optional_date(input.start_date.as_deref())?;
    let end_date = optional_date(input.end_date.as_deref())?;
    if let Some(start) = start_date {
        check_date_range(start, end_date)?;
    }

    let new = NewEmployee {
        id: new_id(),
        name,
        airline_id: None,
        email,
        identification_number,
        bp: input.bp.map(|bp| bp.trim().to_string()).filter(|bp| !bp.is_empty()),
        start_date,
        end_date,
        active: true,
        role,
    };
    Ok((new, input.password))
}
