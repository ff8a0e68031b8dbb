//! Repository for the `employees` table.

use async_trait::async_trait;
use flighthours_core::error::CoreError;
use flighthours_core::tx::Transaction;
use flighthours_core::types::DbId;

use crate::error::{classify, read_error};
use crate::models::employee::{AirlineEmployeeChanges, AirlineEmployeeFilter, Employee, NewEmployee};
use crate::tx::conn;
use crate::DbPool;

const COLUMNS: &str = "\
    id, name, airline_id, email, identification_number, bp, \
    start_date, end_date, active, role, keycloak_user_id, email_verified, \
    created_at, updated_at";

#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    async fn find_by_id(&self, id: DbId) -> Result<Option<Employee>, CoreError>;

    /// Emails are stored lowercased; callers pass the normalized form.
    async fn find_by_email(&self, email: &str) -> Result<Option<Employee>, CoreError>;

    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<Employee>, CoreError>;

    /// Employees attached to an airline.
    async fn list_airline_employees(
        &self,
        filter: &AirlineEmployeeFilter,
    ) -> Result<Vec<Employee>, CoreError>;

    /// Duplicate email surfaces as `DuplicateUser`, other failures as
    /// `UserCannotSave`.
    async fn insert(
        &self,
        tx: &mut dyn Transaction,
        employee: &NewEmployee,
    ) -> Result<Employee, CoreError>;

    /// Record the identity-provider id on an inserted row.
    async fn link_external(
        &self,
        tx: &mut dyn Transaction,
        id: DbId,
        external_id: &str,
    ) -> Result<(), CoreError>;

    /// Lock a row for update. `None` when absent.
    async fn lock(&self, tx: &mut dyn Transaction, id: DbId) -> Result<Option<Employee>, CoreError>;

    async fn update_airline_employee(
        &self,
        tx: &mut dyn Transaction,
        id: DbId,
        changes: &AirlineEmployeeChanges,
    ) -> Result<Employee, CoreError>;

    async fn set_active(
        &self,
        tx: &mut dyn Transaction,
        id: DbId,
        active: bool,
    ) -> Result<(), CoreError>;

    /// Returns `false` when there was nothing to delete.
    async fn delete(&self, tx: &mut dyn Transaction, id: DbId) -> Result<bool, CoreError>;

    /// Mirror the identity provider's verified flag.
    async fn mark_email_verified(
        &self,
        tx: &mut dyn Transaction,
        email: &str,
    ) -> Result<bool, CoreError>;
}

pub struct PgEmployeeRepo {
    pool: DbPool,
}

impl PgEmployeeRepo {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, column: &str, value: &str) -> Result<Option<Employee>, CoreError> {
        let query = format!("SELECT {COLUMNS} FROM employees WHERE {column} = $1");
        sqlx::query_as::<_, Employee>(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(read_error)
    }
}

#[async_trait]
impl EmployeeRepository for PgEmployeeRepo {
    async fn find_by_id(&self, id: DbId) -> Result<Option<Employee>, CoreError> {
        let query = format!("SELECT {COLUMNS} FROM employees WHERE id = $1");
        sqlx::query_as::<_, Employee>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(read_error)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Employee>, CoreError> {
        self.find_one("email", email).await
    }

    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<Employee>, CoreError> {
        self.find_one("keycloak_user_id", external_id).await
    }

    async fn list_airline_employees(
        &self,
        filter: &AirlineEmployeeFilter,
    ) -> Result<Vec<Employee>, CoreError> {
        let query = format!(
            "SELECT {COLUMNS} FROM employees \
             WHERE airline_id IS NOT NULL \
               AND ($1::uuid IS NULL OR airline_id = $1) \
               AND ($2::bool IS NULL OR active = $2) \
             ORDER BY name"
        );
        sqlx::query_as::<_, Employee>(&query)
            .bind(filter.airline_id)
            .bind(filter.active)
            .fetch_all(&self.pool)
            .await
            .map_err(read_error)
    }

    async fn insert(
        &self,
        tx: &mut dyn Transaction,
        employee: &NewEmployee,
    ) -> Result<Employee, CoreError> {
        let query = format!(
            "INSERT INTO employees \
                (id, name, airline_id, email, identification_number, bp, \
                 start_date, end_date, active, role) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Employee>(&query)
            .bind(employee.id)
            .bind(&employee.name)
            .bind(employee.airline_id)
            .bind(&employee.email)
            .bind(&employee.identification_number)
            .bind(employee.bp.as_deref())
            .bind(employee.start_date)
            .bind(employee.end_date)
            .bind(employee.active)
            .bind(&employee.role)
            .fetch_one(conn(tx)?)
            .await
            .map_err(|e| classify(e, CoreError::UserCannotSave))
    }

    async fn link_external(
        &self,
        tx: &mut dyn Transaction,
        id: DbId,
        external_id: &str,
    ) -> Result<(), CoreError> {
        sqlx::query("UPDATE employees SET keycloak_user_id = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(external_id)
            .execute(conn(tx)?)
            .await
            .map_err(|e| classify(e, CoreError::UserCannotSave))?;
        Ok(())
    }

    async fn lock(
        &self,
        tx: &mut dyn Transaction,
        id: DbId,
    ) -> Result<Option<Employee>, CoreError> {
        let query = format!("SELECT {COLUMNS} FROM employees WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Employee>(&query)
            .bind(id)
            .fetch_optional(conn(tx)?)
            .await
            .map_err(|e| classify(e, CoreError::OperationFailed))
    }

    async fn update_airline_employee(
        &self,
        tx: &mut dyn Transaction,
        id: DbId,
        changes: &AirlineEmployeeChanges,
    ) -> Result<Employee, CoreError> {
        let query = format!(
            "UPDATE employees SET \
                name = $2, airline_id = $3, email = $4, identification_number = $5, \
                bp = $6, start_date = $7, end_date = $8, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Employee>(&query)
            .bind(id)
            .bind(&changes.name)
            .bind(changes.airline_id)
            .bind(&changes.email)
            .bind(&changes.identification_number)
            .bind(changes.bp.as_deref())
            .bind(changes.start_date)
            .bind(changes.end_date)
            .fetch_one(conn(tx)?)
            .await
            .map_err(|e| classify(e, CoreError::UserCannotSave))
    }

    async fn set_active(
        &self,
        tx: &mut dyn Transaction,
        id: DbId,
        active: bool,
    ) -> Result<(), CoreError> {
        sqlx::query("UPDATE employees SET active = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(active)
            .execute(conn(tx)?)
            .await
            .map_err(|e| classify(e, CoreError::OperationFailed))?;
        Ok(())
    }

    async fn delete(&self, tx: &mut dyn Transaction, id: DbId) -> Result<bool, CoreError> {
        let result = sqlx::query("DELETE FROM employees WHERE id = $1")
            .bind(id)
            .execute(conn(tx)?)
            .await
            .map_err(|e| classify(e, CoreError::OperationFailed))?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_email_verified(
        &self,
        tx: &mut dyn Transaction,
        email: &str,
    ) -> Result<bool, CoreError> {
        let result = sqlx::query(
            "UPDATE employees SET email_verified = TRUE, updated_at = NOW() WHERE email = $1",
        )
        .bind(email)
        .execute(conn(tx)?)
        .await
        .map_err(|e| classify(e, CoreError::OperationFailed))?;
        Ok(result.rows_affected() > 0)
    }
}
