//! Daily logbooks, always scoped to the calling employee.

use std::sync::Arc;

use flighthours_core::error::{CoreError, Entity};
use flighthours_core::logbook::{ensure_owner, parse_date};
use flighthours_core::scope::RequestScope;
use flighthours_core::tx::{self, Transaction, TransactionManager};
use flighthours_core::types::{new_id, DbId};
use flighthours_db::models::daily_logbook::{
    DailyLogbook, LogbookFields, LogbookFilter, SaveDailyLogbook,
};
use flighthours_db::repositories::LogbookRepository;

pub struct LogbookService {
    logbooks: Arc<dyn LogbookRepository>,
    tx: Arc<dyn TransactionManager>,
}

impl LogbookService {
    pub fn new(logbooks: Arc<dyn LogbookRepository>, tx: Arc<dyn TransactionManager>) -> Self {
        Self { logbooks, tx }
    }

    pub async fn list(
        &self,
        scope: &RequestScope,
        filter: &LogbookFilter,
    ) -> Result<Vec<DailyLogbook>, CoreError> {
        let employee_id = scope.employee_id()?;
        scope.db(self.logbooks.list_by_employee(employee_id, filter)).await
    }

    pub async fn get(&self, scope: &RequestScope, id: DbId) -> Result<DailyLogbook, CoreError> {
        let employee_id = scope.employee_id()?;
        let logbook = scope
            .db(self.logbooks.find_by_id(id))
            .await?
            .ok_or(CoreError::NotFound(Entity::DailyLogbook))?;
        ensure_owner(logbook.employee_id, employee_id)?;
        Ok(logbook)
    }

    pub async fn create(
        &self,
        scope: &RequestScope,
        input: SaveDailyLogbook,
    ) -> Result<DailyLogbook, CoreError> {
        let employee_id = scope.employee_id()?;
        let fields = validate(&input)?;

        let mut tx = scope.db(self.tx.begin()).await?;
        let outcome = scope
            .db(self.logbooks.insert(tx.as_mut(), new_id(), employee_id, &fields))
            .await;
        let logbook = tx::finish(tx, outcome).await?;

        tracing::info!(
            trace_id = %scope.trace_id,
            logbook_id = %logbook.id,
            %employee_id,
            "Logbook created"
        );
        Ok(logbook)
    }

    pub async fn update(
        &self,
        scope: &RequestScope,
        id: DbId,
        input: SaveDailyLogbook,
    ) -> Result<DailyLogbook, CoreError> {
        let employee_id = scope.employee_id()?;
        let fields = validate(&input)?;

        let mut tx = scope.db(self.tx.begin()).await?;
        let outcome = async {
            lock_owned(&*self.logbooks, scope, tx.as_mut(), id, employee_id).await?;
            scope.db(self.logbooks.update(tx.as_mut(), id, &fields)).await
        }
        .await;
        tx::finish(tx, outcome).await
    }

    pub async fn delete(&self, scope: &RequestScope, id: DbId) -> Result<(), CoreError> {
        let employee_id = scope.employee_id()?;

        let mut tx = scope.db(self.tx.begin()).await?;
        let outcome = async {
            lock_owned(&*self.logbooks, scope, tx.as_mut(), id, employee_id).await?;
            match scope.db(self.logbooks.delete(tx.as_mut(), id)).await? {
                true => Ok(()),
                false => Err(CoreError::NotFound(Entity::DailyLogbook)),
            }
        }
        .await;
        tx::finish(tx, outcome).await?;

        tracing::info!(trace_id = %scope.trace_id, logbook_id = %id, "Logbook deleted");
        Ok(())
    }

    pub async fn set_status(
        &self,
        scope: &RequestScope,
        id: DbId,
        active: bool,
    ) -> Result<(), CoreError> {
        let employee_id = scope.employee_id()?;

        let mut tx = scope.db(self.tx.begin()).await?;
        let outcome = async {
            lock_owned(&*self.logbooks, scope, tx.as_mut(), id, employee_id).await?;
            scope.db(self.logbooks.set_status(tx.as_mut(), id, active)).await
        }
        .await;
        tx::finish(tx, outcome).await
    }
}

/// Lock a logbook and check it belongs to `employee_id`.
///
/// Shared with the segment service: every segment write goes through the
/// parent logbook's lock.
pub(crate) async fn lock_owned(
    logbooks: &dyn LogbookRepository,
    scope: &RequestScope,
    tx: &mut dyn Transaction,
    id: DbId,
    employee_id: DbId,
) -> Result<DailyLogbook, CoreError> {
    let logbook = scope
        .db(logbooks.lock(tx, id))
        .await?
        .ok_or(CoreError::NotFound(Entity::DailyLogbook))?;
    if let Err(err) = ensure_owner(logbook.employee_id, employee_id) {
        tracing::warn!(
            trace_id = %scope.trace_id,
            logbook_id = %id,
            %employee_id,
            "Write to a logbook owned by another employee"
        );
        return Err(err);
    }
    Ok(logbook)
}

fn validate(input: &SaveDailyLogbook) -> Result<LogbookFields, CoreError> {
    if matches!(input.book_page, Some(page) if page < 0) {
        return Err(CoreError::InvalidRequest("book_page must not be negative".into()));
    }
    Ok(LogbookFields {
        log_date: parse_date(&input.log_date)?,
        book_page: input.book_page,
        status: input.status.unwrap_or(true),
    })
}
