//! Aircraft registrations: reference reads plus administrator writes.

use std::sync::Arc;

use flighthours_core::error::{CoreError, Entity};
use flighthours_core::scope::RequestScope;
use flighthours_core::tx::{self, TransactionManager};
use flighthours_core::types::{new_id, DbId};
use flighthours_db::models::aircraft_registration::{
    AircraftRegistration, AircraftRegistrationFilter, SaveAircraftRegistration,
};
use flighthours_db::repositories::{AircraftRegistrationWriter, ReferenceRepository};

use super::reference::ReferenceService;

/// Aircraft registrations: reference reads plus admin create/update.
pub struct AircraftRegistrationService {
    reads: ReferenceService<AircraftRegistration, AircraftRegistrationFilter>,
    writer: Arc<dyn AircraftRegistrationWriter>,
    tx: Arc<dyn TransactionManager>,
}

impl AircraftRegistrationService {
    pub fn new(
        reads: Arc<dyn ReferenceRepository<AircraftRegistration, AircraftRegistrationFilter>>,
        writer: Arc<dyn AircraftRegistrationWriter>,
        tx: Arc<dyn TransactionManager>,
    ) -> Self {
        Self {
            reads: ReferenceService::read_only(
                Entity::AircraftRegistration,
                reads,
                Arc::clone(&tx),
            ),
            writer,
            tx,
        }
    }

    pub async fn get(
        &self,
        scope: &RequestScope,
        id: DbId,
    ) -> Result<AircraftRegistration, CoreError> {
        self.reads.get(scope, id).await
    }

    pub async fn list(
        &self,
        scope: &RequestScope,
        filter: &AircraftRegistrationFilter,
    ) -> Result<Vec<AircraftRegistration>, CoreError> {
        self.reads.list(scope, filter).await
    }

    pub async fn create(
        &self,
        scope: &RequestScope,
        input: SaveAircraftRegistration,
    ) -> Result<AircraftRegistration, CoreError> {
        let input = normalize(input)?;
        let id = new_id();

        let mut tx = scope.db(self.tx.begin()).await?;
        let outcome = scope.db(self.writer.insert(tx.as_mut(), id, &input)).await;
        tx::finish(tx, outcome).await?;

        tracing::info!(
            trace_id = %scope.trace_id,
            %id,
            plate = %input.license_plate,
            "Aircraft registered"
        );
        self.get(scope, id).await
    }

    pub async fn update(
        &self,
        scope: &RequestScope,
        id: DbId,
        input: SaveAircraftRegistration,
    ) -> Result<AircraftRegistration, CoreError> {
        let input = normalize(input)?;

        let mut tx = scope.db(self.tx.begin()).await?;
        let outcome = match scope.db(self.writer.update(tx.as_mut(), id, &input)).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(CoreError::NotFound(Entity::AircraftRegistration)),
            Err(err) => Err(err),
        };
        tx::finish(tx, outcome).await?;

        self.get(scope, id).await
    }
}

/// Plates are stored trimmed and uppercased.
fn normalize(mut input: SaveAircraftRegistration) -> Result<SaveAircraftRegistration, CoreError> {
    input.license_plate = input.license_plate.trim().to_uppercase();
    if input.license_plate.is_empty() {
        return Err(CoreError::InvalidRequest("license_plate is required".into()));
    }
    Ok(input)
}
