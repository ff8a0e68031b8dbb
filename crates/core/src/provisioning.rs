//! Account provisioning rules shared by the registration orchestrator and
//! the reconciliation procedure.
//!
//! An account lives in two places: the local employee store and the
//! external identity provider. It is consistent when it is present in both
//! or in neither.

use crate::error::CoreError;

/// Where a local employee row came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalRecord {
    /// Written by a registration and expected to have an external account.
    Registered,
    /// Airline staff managed by administrators; never has an external account.
    Staff,
}

/// Observed presence of one account on both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountState {
    Absent,
    Linked,
    LocalOnly,
    ExternalOnly,
    /// A staff record without an external account. Not an orphan.
    Staff,
}

impl AccountState {
    pub fn classify(local: Option<LocalRecord>, external: bool) -> Self {
        match (local, external) {
            (None, false) => AccountState::Absent,
            (Some(_), true) => AccountState::Linked,
            (Some(LocalRecord::Registered), false) => AccountState::LocalOnly,
            (Some(LocalRecord::Staff), false) => AccountState::Staff,
            (None, true) => AccountState::ExternalOnly,
        }
    }

    pub fn is_consistent(self) -> bool {
        matches!(
            self,
            AccountState::Absent | AccountState::Linked | AccountState::Staff
        )
    }

    /// Whether a new registration may proceed for this account.
    pub fn admit_registration(self) -> Result<(), CoreError> {
        match self {
            AccountState::Absent => Ok(()),
            AccountState::Linked | AccountState::Staff => Err(CoreError::DuplicateUser),
            AccountState::LocalOnly | AccountState::ExternalOnly => {
                Err(CoreError::IncompleteRegistration)
            }
        }
    }
}

/// What a reconciliation run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Reconciliation {
    /// Both sides agreed; nothing was touched.
    AlreadyConsistent,
    RemovedLocal,
    RemovedExternal,
}

// ---------------------------------------------------------------------------
// Registration state machine
// ---------------------------------------------------------------------------

/// Progress of one registration attempt.
///
/// ```text
/// Init -> Checked -> LocalSaved -> ExternalCreated -> ExternalPasswordSet
///      -> ExternalRoleAssigned -> LocalLinked -> Committed
/// any non-terminal stage -> Compensating -> Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationStage {
    Init,
    Checked,
    LocalSaved,
    ExternalCreated,
    ExternalPasswordSet,
    ExternalRoleAssigned,
    LocalLinked,
    Committed,
    Compensating,
    Failed,
}

impl RegistrationStage {
    fn next(self) -> Option<Self> {
        use RegistrationStage::*;
        match self {
            Init => Some(Checked),
            Checked => Some(LocalSaved),
            LocalSaved => Some(ExternalCreated),
            ExternalCreated => Some(ExternalPasswordSet),
            ExternalPasswordSet => Some(ExternalRoleAssigned),
            ExternalRoleAssigned => Some(LocalLinked),
            LocalLinked => Some(Committed),
            Committed | Compensating | Failed => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RegistrationStage::Committed | RegistrationStage::Failed)
    }

    /// True once an external account exists and would need deleting.
    pub fn holds_external_account(self) -> bool {
        use RegistrationStage::*;
        matches!(
            self,
            ExternalCreated | ExternalPasswordSet | ExternalRoleAssigned | LocalLinked
        )
    }
}

/// Tracks one attempt and refuses out-of-order transitions.
#[derive(Debug)]
pub struct RegistrationAttempt {
    stage: RegistrationStage,
    external_id: Option<String>,
}

impl Default for RegistrationAttempt {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistrationAttempt {
    pub fn new() -> Self {
        Self {
            stage: RegistrationStage::Init,
            external_id: None,
        }
    }

    pub fn stage(&self) -> RegistrationStage {
        self.stage
    }

    pub fn external_id(&self) -> Option<&str> {
        self.external_id.as_deref()
    }

    /// Step forward to `to`, which must be the next stage in sequence.
    pub fn advance(&mut self, to: RegistrationStage) -> Result<(), CoreError> {
        if self.stage.next() != Some(to) {
            return Err(CoreError::ServerError(format!(
                "registration cannot move from {:?} to {to:?}",
                self.stage
            )));
        }
        self.stage = to;
        Ok(())
    }

    /// Record the external account and move to `ExternalCreated`.
    pub fn external_created(&mut self, external_id: String) -> Result<(), CoreError> {
        self.advance(RegistrationStage::ExternalCreated)?;
        self.external_id = Some(external_id);
        Ok(())
    }

    /// Enter compensation. Returns the external id to delete, if any.
    pub fn begin_compensation(&mut self) -> Option<String> {
        let external = if self.stage.holds_external_account() {
            self.external_id.clone()
        } else {
            None
        };
        if !self.stage.is_terminal() {
            self.stage = RegistrationStage::Compensating;
        }
        external
    }

    pub fn fail(&mut self) {
        self.stage = RegistrationStage::Failed;
    }
}
