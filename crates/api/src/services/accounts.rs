//! Pass-throughs to the identity provider for an existing account, and
//! the caller's own employee record.

use std::sync::Arc;

use flighthours_core::error::{CoreError, Entity};
use flighthours_core::roles::ROLE_ADMIN;
use flighthours_core::scope::RequestScope;
use flighthours_core::tx::{self, TransactionManager};
use flighthours_core::types::DbId;
use flighthours_db::models::employee::Employee;
use flighthours_db::repositories::EmployeeRepository;
use flighthours_identity::{ActionTokenVerifier, ExternalUser, IdentityProvider, TokenSet};

use super::normalize_email;

pub struct AccountService {
    employees: Arc<dyn EmployeeRepository>,
    identity: Arc<dyn IdentityProvider>,
    tx: Arc<dyn TransactionManager>,
    action_tokens: ActionTokenVerifier,
}

impl AccountService {
    pub fn new(
        employees: Arc<dyn EmployeeRepository>,
        identity: Arc<dyn IdentityProvider>,
        tx: Arc<dyn TransactionManager>,
        action_tokens: ActionTokenVerifier,
    ) -> Self {
        Self {
            employees,
            identity,
            tx,
            action_tokens,
        }
    }

    /// Password grant. A rejected password is `BadCredentials`; an
    /// unreachable provider is `IdentityProviderUnavailable`.
    pub async fn login(
        &self,
        scope: &RequestScope,
        email: &str,
        password: &str,
    ) -> Result<TokenSet, CoreError> {
        let email = normalize_email(email)?;
        let tokens = scope
            .identity(async {
                self.identity
                    .login(&email, password)
                    .await
                    .map_err(|err| err.into_core(CoreError::OperationFailed))
            })
            .await?;
        tracing::info!(trace_id = %scope.trace_id, %email, "Login succeeded");
        Ok(tokens)
    }

    /// Mark the account named by an email-verification action token as
    /// verified, on both sides. The token must be signed by the realm.
    pub async fn verify_email(&self, scope: &RequestScope, token: &str) -> Result<(), CoreError> {
        let email = self.action_tokens.email(token)?;
        let user = self.external_user(scope, &email).await?;
        if user.email_verified {
            return Err(CoreError::EmailAlreadyVerified);
        }

        scope
            .identity(async {
                self.identity
                    .mark_email_verified(&user.id)
                    .await
                    .map_err(|err| err.into_core(CoreError::OperationFailed))
            })
            .await?;

        let mut tx = scope.db(self.tx.begin()).await?;
        let outcome = scope.db(self.employees.mark_email_verified(tx.as_mut(), &email)).await;
        if !tx::finish(tx, outcome).await? {
            tracing::warn!(
                trace_id = %scope.trace_id,
                %email,
                "Verified account has no local employee"
            );
        }

        tracing::info!(trace_id = %scope.trace_id, %email, "Email verified");
        Ok(())
    }

    /// Set a new permanent password for the account named by a realm-signed
    /// action token. Nothing is sent to the provider for a rejected token.
    pub async fn update_password(
        &self,
        scope: &RequestScope,
        token: &str,
        new_password: &str,
    ) -> Result<(), CoreError> {
        if new_password.is_empty() {
            return Err(CoreError::InvalidRequest("new_password is required".into()));
        }
        let email = self.action_tokens.email(token)?;
        let user = self.external_user(scope, &email).await?;

        scope
            .identity(async {
                self.identity
                    .set_password(&user.id, new_password, false)
                    .await
                    .map_err(|err| err.into_core(CoreError::OperationFailed))
            })
            .await?;
        tracing::info!(trace_id = %scope.trace_id, %email, "Password updated");
        Ok(())
    }

    pub async fn resend_verification(
        &self,
        scope: &RequestScope,
        email: &str,
    ) -> Result<(), CoreError> {
        let email = normalize_email(email)?;
        let user = self.external_user(scope, &email).await?;
        if user.email_verified {
            return Err(CoreError::EmailAlreadyVerified);
        }

        scope
            .identity(async {
                self.identity
                    .send_verification_email(&email)
                    .await
                    .map_err(|err| err.into_core(CoreError::OperationFailed))
            })
            .await
    }

    /// The caller's own employee record.
    pub async fn me(&self, scope: &RequestScope) -> Result<Employee, CoreError> {
        let id = scope.employee_id()?;
        scope
            .db(self.employees.find_by_id(id))
            .await?
            .ok_or(CoreError::NotFound(Entity::Employee))
    }

    /// Any employee, for administrators or the employee themself.
    pub async fn employee(&self, scope: &RequestScope, id: DbId) -> Result<Employee, CoreError> {
        let caller = scope
            .caller
            .as_ref()
            .ok_or_else(|| CoreError::Unauthenticated("no caller in scope".into()))?;
        if caller.employee_id != Some(id) && !caller.has_role(ROLE_ADMIN) {
            return Err(CoreError::Forbidden("employee records are private".into()));
        }
        scope
            .db(self.employees.find_by_id(id))
            .await?
            .ok_or(CoreError::NotFound(Entity::Employee))
    }

    /// Local employee mirrored for an identity-provider subject.
    pub async fn employee_for_subject(
        &self,
        scope: &RequestScope,
        external_id: &str,
    ) -> Result<Option<DbId>, CoreError> {
        Ok(scope
            .db(self.employees.find_by_external_id(external_id))
            .await?
            .map(|employee| employee.id))
    }

    async fn external_user(
        &self,
        scope: &RequestScope,
        email: &str,
    ) -> Result<ExternalUser, CoreError> {
        scope
            .identity(async {
                self.identity
                    .get_user_by_email(email)
                    .await
                    .map_err(|err| err.into_core(CoreError::OperationFailed))
            })
            .await
    }
}
