//! Read access to reference data, plus the activation flag on the entities
//! that carry one.

use std::sync::Arc;

use flighthours_core::error::{CoreError, Entity};
use flighthours_core::scope::RequestScope;
use flighthours_core::tx::{self, TransactionManager};
use flighthours_core::types::DbId;
use flighthours_db::repositories::{ReferenceRepository, StatusRepository};

pub struct ReferenceService<T, F>
where
    T: Send + 'static,
    F: Sync + 'static,
{
    entity: Entity,
    reads: Arc<dyn ReferenceRepository<T, F>>,
    status: Option<Arc<dyn StatusRepository>>,
    tx: Arc<dyn TransactionManager>,
}

impl<T, F> ReferenceService<T, F>
where
    T: Send + 'static,
    F: Sync + 'static,
{
    pub fn read_only(
        entity: Entity,
        reads: Arc<dyn ReferenceRepository<T, F>>,
        tx: Arc<dyn TransactionManager>,
    ) -> Self {
        Self {
            entity,
            reads,
            status: None,
            tx,
        }
    }

    pub fn with_status(
        entity: Entity,
        reads: Arc<dyn ReferenceRepository<T, F>>,
        status: Arc<dyn StatusRepository>,
        tx: Arc<dyn TransactionManager>,
    ) -> Self {
        Self {
            entity,
            reads,
            status: Some(status),
            tx,
        }
    }

    pub async fn get(&self, scope: &RequestScope, id: DbId) -> Result<T, CoreError> {
        scope
            .db(self.reads.find_by_id(id))
            .await?
            .ok_or(CoreError::NotFound(self.entity))
    }

    pub async fn list(&self, scope: &RequestScope, filter: &F) -> Result<Vec<T>, CoreError> {
        scope.db(self.reads.list(filter)).await
    }

    /// Read of a virtual entity (a city, a country, an aircraft family):
    /// the rows grouped under one attribute value. No rows means the value
    /// itself is unknown, reported as `missing`.
    pub async fn list_grouped(
        &self,
        scope: &RequestScope,
        filter: &F,
        missing: Entity,
    ) -> Result<Vec<T>, CoreError> {
        let rows = self.list(scope, filter).await?;
        if rows.is_empty() {
            return Err(CoreError::NotFound(missing));
        }
        Ok(rows)
    }

    /// Set the activation flag. Setting the current value again succeeds.
    pub async fn set_status(
        &self,
        scope: &RequestScope,
        id: DbId,
        active: bool,
    ) -> Result<(), CoreError> {
        let status = self.status.as_ref().ok_or_else(|| {
            CoreError::ServerError(format!("{} has no activation flag", self.entity))
        })?;

        let mut tx = scope.db(self.tx.begin()).await?;
        let outcome = async {
            if !scope.db(status.lock(tx.as_mut(), id)).await? {
                return Err(CoreError::NotFound(self.entity));
            }
            scope.db(status.set_status(tx.as_mut(), id, active)).await
        }
        .await;
        tx::finish(tx, outcome).await?;

        tracing::info!(
            trace_id = %scope.trace_id,
            entity = %self.entity,
            %id,
            active,
            "Activation flag set"
        );
        Ok(())
    }
}
