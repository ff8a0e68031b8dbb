//! Administrator-managed airline employees.
//!
//! These are local records only; no identity-provider account is created.

use std::sync::Arc;

use chrono::NaiveDate;
use flighthours_core::error::{CoreError, Entity};
use flighthours_core::logbook::{check_date_range, parse_date};
use flighthours_core::roles::ROLE_PILOT;
use flighthours_core::scope::RequestScope;
use flighthours_core::tx::{self, TransactionManager};
use flighthours_core::types::{new_id, DbId};
use flighthours_db::models::employee::{
    AirlineEmployeeChanges, AirlineEmployeeFilter, Employee, NewEmployee, SaveAirlineEmployee,
};
use flighthours_db::repositories::EmployeeRepository;

use super::normalize_email;

pub struct AirlineEmployeeService {
    employees: Arc<dyn EmployeeRepository>,
    tx: Arc<dyn TransactionManager>,
}

impl AirlineEmployeeService {
    pub fn new(employees: Arc<dyn EmployeeRepository>, tx: Arc<dyn TransactionManager>) -> Self {
        Self { employees, tx }
    }

    pub async fn list(
        &self,
        scope: &RequestScope,
        filter: &AirlineEmployeeFilter,
    ) -> Result<Vec<Employee>, CoreError> {
        scope.db(self.employees.list_airline_employees(filter)).await
    }

    pub async fn get(&self, scope: &RequestScope, id: DbId) -> Result<Employee, CoreError> {
        scope
            .db(self.employees.find_by_id(id))
            .await?
            .filter(|employee| employee.airline_id.is_some())
            .ok_or(CoreError::NotFound(Entity::Employee))
    }

    pub async fn create(
        &self,
        scope: &RequestScope,
        input: SaveAirlineEmployee,
    ) -> Result<Employee, CoreError> {
        let changes = validate(input.clone())?;
        let new = NewEmployee {
            id: new_id(),
            name: changes.name,
            airline_id: Some(changes.airline_id),
            email: changes.email,
            identification_number: changes.identification_number,
            bp: changes.bp,
            start_date: Some(changes.start_date),
            end_date: changes.end_date,
            active: input.active.unwrap_or(true),
            role: ROLE_PILOT.to_string(),
        };

        let mut tx = scope.db(self.tx.begin()).await?;
        let outcome = scope.db(self.employees.insert(tx.as_mut(), &new)).await;
        let employee = tx::finish(tx, outcome).await?;

        tracing::info!(
            trace_id = %scope.trace_id,
            employee_id = %employee.id,
            airline_id = %changes.airline_id,
            "Airline employee created"
        );
        Ok(employee)
    }

    pub async fn update(
        &self,
        scope: &RequestScope,
        id: DbId,
        input: SaveAirlineEmployee,
    ) -> Result<Employee, CoreError> {
        let active = input.active;
        let changes = validate(input)?;

        let mut tx = scope.db(self.tx.begin()).await?;
        let outcome = async {
            self.lock_airline_employee(scope, tx.as_mut(), id).await?;
            let mut employee = scope
                .db(self.employees.update_airline_employee(tx.as_mut(), id, &changes))
                .await?;
            if let Some(active) = active.filter(|active| *active != employee.active) {
                scope.db(self.employees.set_active(tx.as_mut(), id, active)).await?;
                employee.active = active;
            }
            Ok(employee)
        }
        .await;
        tx::finish(tx, outcome).await
    }

    pub async fn set_active(
        &self,
        scope: &RequestScope,
        id: DbId,
        active: bool,
    ) -> Result<(), CoreError> {
        let mut tx = scope.db(self.tx.begin()).await?;
        let outcome = async {
            self.lock_airline_employee(scope, tx.as_mut(), id).await?;
            scope.db(self.employees.set_active(tx.as_mut(), id, active)).await
        }
        .await;
        tx::finish(tx, outcome).await
    }

    async fn lock_airline_employee(
        &self,
        scope: &RequestScope,
        tx: &mut dyn tx::Transaction,
        id: DbId,
    ) -> Result<Employee, CoreError> {
        scope
            .db(self.employees.lock(tx, id))
            .await?
            .filter(|employee| employee.airline_id.is_some())
            .ok_or(CoreError::NotFound(Entity::Employee))
    }
}

fn validate(input: SaveAirlineEmployee) -> Result<AirlineEmployeeChanges, CoreError> {
    let name = input.name.trim().to_string();
    if name.is_empty() {
        return Err(CoreError::InvalidRequest("name is required".into()));
    }
    let email = normalize_email(&input.email)?;
    let identification_number = input.identification_number.trim().to_string();
    if identification_number.is_empty() {
        return Err(CoreError::InvalidRequest("identification_number is required".into()));
    }

    let start_date = parse_date(&input.start_date)?;
    let end_date = optional_date(input.end_date.as_deref())?;
    check_date_range(start_date, end_date)?;

    Ok(AirlineEmployeeChanges {
        name,
        airline_id: input.airline_id,
        email,
        identification_number,
        bp: input.bp.map(|bp| bp.trim().to_string()).filter(|bp| !bp.is_empty()),
        start_date,
        end_date,
    })
}

/// Absent and `""` both mean an open end.
pub(crate) fn optional_date(raw: Option<&str>) -> Result<Option<NaiveDate>, CoreError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_date(value).map(Some),
    }
}
