//! Flight segments (logbook details).
//!
//! Every write validates the segment before a transaction is opened, so a
//! rejected segment never reaches the store, then locks the parent logbook
//! and checks the caller owns it.

use std::sync::Arc;

use chrono::NaiveTime;
use flighthours_core::error::{CoreError, Entity, Reference};
use flighthours_core::flight_time::{format_clock, parse_clock, SegmentTimes};
use flighthours_core::logbook::{
    ensure_owner, parse_date, parse_optional, ApproachType, FlightType, PilotRole,
};
use flighthours_core::scope::RequestScope;
use flighthours_core::tx::{self, TransactionManager};
use flighthours_core::types::{new_id, DbId};
use flighthours_db::models::flight::{Flight, FlightView, SaveFlight};
use flighthours_db::repositories::{FlightRepository, LogbookRepository};

use super::logbooks::lock_owned;

pub struct FlightService {
    logbooks: Arc<dyn LogbookRepository>,
    flights: Arc<dyn FlightRepository>,
    tx: Arc<dyn TransactionManager>,
}

impl FlightService {
    pub fn new(
        logbooks: Arc<dyn LogbookRepository>,
        flights: Arc<dyn FlightRepository>,
        tx: Arc<dyn TransactionManager>,
    ) -> Self {
        Self { logbooks, flights, tx }
    }

    /// Segments of one logbook, earliest `out_time` first.
    pub async fn list_by_logbook(
        &self,
        scope: &RequestScope,
        logbook_id: DbId,
    ) -> Result<Vec<FlightView>, CoreError> {
        let employee_id = scope.employee_id()?;
        let logbook = scope
            .db(self.logbooks.find_by_id(logbook_id))
            .await?
            .ok_or(CoreError::NotFound(Entity::DailyLogbook))?;
        ensure_owner(logbook.employee_id, employee_id)?;
        scope.db(self.flights.list_by_logbook(logbook_id)).await
    }

    pub async fn get(&self, scope: &RequestScope, id: DbId) -> Result<FlightView, CoreError> {
        let employee_id = scope.employee_id()?;
        let view = scope
            .db(self.flights.find_view(id))
            .await?
            .ok_or(CoreError::NotFound(Entity::Flight))?;
        ensure_owner(view.owner_id, employee_id)?;
        Ok(view)
    }

    pub async fn create(
        &self,
        scope: &RequestScope,
        logbook_id: DbId,
        input: &SaveFlight,
    ) -> Result<FlightView, CoreError> {
        let employee_id = scope.employee_id()?;
        let flight = build_flight(new_id(), logbook_id, input)?;

        let mut tx = scope.db(self.tx.begin()).await?;
        let outcome = async {
            // A missing parent is a bad reference in the body, not a missing resource.
            lock_owned(&*self.logbooks, scope, tx.as_mut(), logbook_id, employee_id)
                .await
                .map_err(|err| match err {
                    CoreError::NotFound(Entity::DailyLogbook) => {
                        CoreError::InvalidReference(Reference::Logbook)
                    }
                    other => other,
                })?;
            scope.db(self.flights.insert(tx.as_mut(), &flight)).await
        }
        .await;
        tx::finish(tx, outcome).await?;

        tracing::info!(
            trace_id = %scope.trace_id,
            flight_id = %flight.id,
            %logbook_id,
            air_time = %format_clock(flight.air_time),
            block_time = %format_clock(flight.block_time),
            "Segment recorded"
        );
        self.get(scope, flight.id).await
    }

    pub async fn update(
        &self,
        scope: &RequestScope,
        id: DbId,
        input: &SaveFlight,
    ) -> Result<FlightView, CoreError> {
        let employee_id = scope.employee_id()?;
        // The parent logbook is only known once the row is locked.
        let mut flight = build_flight(id, DbId::nil(), input)?;

        let mut tx = scope.db(self.tx.begin()).await?;
        let outcome = async {
            let existing = scope
                .db(self.flights.lock(tx.as_mut(), id))
                .await?
                .ok_or(CoreError::NotFound(Entity::Flight))?;
            let logbook_id = existing.daily_logbook_id;
            lock_owned(&*self.logbooks, scope, tx.as_mut(), logbook_id, employee_id).await?;
            flight.daily_logbook_id = existing.daily_logbook_id;
            scope.db(self.flights.update(tx.as_mut(), &flight)).await
        }
        .await;
        tx::finish(tx, outcome).await?;

        self.get(scope, id).await
    }

    pub async fn delete(&self, scope: &RequestScope, id: DbId) -> Result<(), CoreError> {
        let employee_id = scope.employee_id()?;

        let mut tx = scope.db(self.tx.begin()).await?;
        let outcome = async {
            let existing = scope
                .db(self.flights.lock(tx.as_mut(), id))
                .await?
                .ok_or(CoreError::NotFound(Entity::Flight))?;
            let logbook_id = existing.daily_logbook_id;
            lock_owned(&*self.logbooks, scope, tx.as_mut(), logbook_id, employee_id).await?;
            match scope.db(self.flights.delete(tx.as_mut(), id)).await? {
                true => Ok(()),
                false => Err(CoreError::NotFound(Entity::Flight)),
            }
        }
        .await;
        tx::finish(tx, outcome).await
    }
}

/// Validate a segment body into the stored row.
///
/// Air time and block time are always derived from the four clocks; values
/// sent by the client are ignored.
pub fn build_flight(id: DbId, logbook_id: DbId, input: &SaveFlight) -> Result<Flight, CoreError> {
    let times = SegmentTimes::parse(
        &input.out_time,
        &input.takeoff_time,
        &input.landing_time,
        &input.in_time,
    )?;

    let flight_number = input.flight_number.trim();
    if flight_number.is_empty() {
        return Err(CoreError::InvalidRequest("flight_number is required".into()));
    }
    if matches!(input.passengers, Some(n) if n < 0) {
        return Err(CoreError::InvalidRequest("passengers must not be negative".into()));
    }

    let pilot_role: PilotRole = input.pilot_role.trim().parse()?;
    let approach_type = parse_optional::<ApproachType>(input.approach_type.as_deref())?;
    let flight_type = parse_optional::<FlightType>(input.flight_type.as_deref())?;
    let duty_time = optional_clock(input.duty_time.as_deref())?;

    let (air_time, block_time) = (times.air_time(), times.block_time());
    if let Some(sent) = input.air_time.as_deref().filter(|s| !s.trim().is_empty()) {
        if parse_clock(sent).ok() != Some(air_time) {
            tracing::debug!(sent, derived = %format_clock(air_time), "Ignoring client air time");
        }
    }
    if let Some(sent) = input.block_time.as_deref().filter(|s| !s.trim().is_empty()) {
        if parse_clock(sent).ok() != Some(block_time) {
            tracing::debug!(
                sent,
                derived = %format_clock(block_time),
                "Ignoring client block time"
            );
        }
    }

    Ok(Flight {
        id,
        daily_logbook_id: logbook_id,
        flight_real_date: parse_date(&input.flight_real_date)?,
        flight_number: flight_number.to_string(),
        airline_route_id: input.airline_route_id,
        actual_aircraft_registration_id: input.actual_aircraft_registration_id,
        passengers: input.passengers,
        out_time: times.out,
        takeoff_time: times.takeoff,
        landing_time: times.landing,
        in_time: times.arrival,
        pilot_role: pilot_role.to_string(),
        companion_name: input
            .companion_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        air_time,
        block_time,
        duty_time,
        approach_type: approach_type.map(|a| a.to_string()),
        flight_type: flight_type.map(|f| f.to_string()),
    })
}

fn optional_clock(raw: Option<&str>) -> Result<Option<NaiveTime>, CoreError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_clock(value)
            .map(Some)
            .map_err(|_| CoreError::InvalidTimeSequence),
    }
}
