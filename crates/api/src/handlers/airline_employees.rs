use axum::extract::State;
use flighthours_core::codes;
use flighthours_db::models::employee::{AirlineEmployeeFilter, Employee, SaveAirlineEmployee};

use crate::error::AppResult;
use crate::extract::{IdPath, ValidJson, ValidQuery};
use crate::middleware::rbac::RequireAdmin;
use crate::response::{ApiResponse, Linked};
use crate::state::AppState;

/// GET /api/v1/airline-employees
pub async fn list_airline_employees(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ValidQuery(filter): ValidQuery<AirlineEmployeeFilter>,
) -> AppResult<ApiResponse<Vec<Employee>>> {
    let employees = state.services.airline_employees.list(&admin.scope, &filter).await?;
    Ok(ApiResponse::listed(employees))
}

/// GET /api/v1/airline-employees/{id}
pub async fn get_airline_employee(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    IdPath(id): IdPath,
) -> AppResult<ApiResponse<Employee>> {
    let employee = state.services.airline_employees.get(&admin.scope, id).await?;
    Ok(ApiResponse::found(employee))
}

/// POST /api/v1/airline-employees
pub async fn create_airline_employee(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ValidJson(input): ValidJson<SaveAirlineEmployee>,
) -> AppResult<ApiResponse<Linked<Employee>>> {
    let employee = state.services.airline_employees.create(&admin.scope, input).await?;
    let url = state.resource_url("airline-employees", employee.id);
    Ok(ApiResponse::created(
        codes::RESOURCE_CREATED,
        Linked::new(employee, url.clone()),
        url,
    ))
}

/// PUT /api/v1/airline-employees/{id}
pub async fn update_airline_employee(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    IdPath(id): IdPath,
    ValidJson(input): ValidJson<SaveAirlineEmployee>,
) -> AppResult<ApiResponse<Employee>> {
    let employee = state.services.airline_employees.update(&admin.scope, id, input).await?;
    Ok(ApiResponse::updated(employee))
}

/// PATCH /api/v1/airline-employees/{id}/activate
pub async fn activate_airline_employee(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    IdPath(id): IdPath,
) -> AppResult<ApiResponse> {
    state.services.airline_employees.set_active(&admin.scope, id, true).await?;
    Ok(ApiResponse::ack(codes::RESOURCE_ACTIVATED))
}

/// PATCH /api/v1/airline-employees/{id}/deactivate
pub async fn deactivate_airline_employee(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    IdPath(id): IdPath,
) -> AppResult<ApiResponse> {
    state.services.airline_employees.set_active(&admin.scope, id, false).await?;
    Ok(ApiResponse::ack(codes::RESOURCE_DEACTIVATED))
}
