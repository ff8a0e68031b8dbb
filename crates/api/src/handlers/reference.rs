//! Reference data: airlines, airports, routes, airline routes, aircraft
//! models, engines, manufacturers, and the virtual lookups grouped by an
//! attribute (city, country, airport type, aircraft family).

use axum::extract::{Path, State};
use flighthours_core::codes;
use flighthours_core::error::Entity;
use flighthours_db::models::aircraft_model::{AircraftModel, AircraftModelFilter};
use flighthours_db::models::airline::{Airline, AirlineFilter};
use flighthours_db::models::airline_route::{AirlineRoute, AirlineRouteFilter};
use flighthours_db::models::airport::{Airport, AirportFilter};
use flighthours_db::models::engine::Engine;
use flighthours_db::models::manufacturer::Manufacturer;
use flighthours_db::models::route::{Route, RouteFilter};
use flighthours_db::models::NoFilter;

use crate::error::AppResult;
use crate::extract::{IdPath, ValidQuery};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::ApiResponse;
use crate::state::AppState;

fn status_ack(active: bool) -> ApiResponse {
    ApiResponse::ack(if active {
        codes::RESOURCE_ACTIVATED
    } else {
        codes::RESOURCE_DEACTIVATED
    })
}

// ---------------------------------------------------------------------------
// Airlines
// ---------------------------------------------------------------------------

/// GET /api/v1/airlines
pub async fn list_airlines(
    State(state): State<AppState>,
    user: AuthUser,
    ValidQuery(filter): ValidQuery<AirlineFilter>,
) -> AppResult<ApiResponse<Vec<Airline>>> {
    let airlines = state.services.airlines.list(&user.scope, &filter).await?;
    Ok(ApiResponse::listed(airlines))
}

/// GET /api/v1/airlines/{id}
pub async fn get_airline(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(id): IdPath,
) -> AppResult<ApiResponse<Airline>> {
    let airline = state.services.airlines.get(&user.scope, id).await?;
    Ok(ApiResponse::found(airline))
}

/// PATCH /api/v1/airlines/{id}/activate
pub async fn activate_airline(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    IdPath(id): IdPath,
) -> AppResult<ApiResponse> {
    state.services.airlines.set_status(&admin.scope, id, true).await?;
    Ok(status_ack(true))
}

/// PATCH /api/v1/airlines/{id}/deactivate
pub async fn deactivate_airline(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    IdPath(id): IdPath,
) -> AppResult<ApiResponse> {
    state.services.airlines.set_status(&admin.scope, id, false).await?;
    Ok(status_ack(false))
}

// ---------------------------------------------------------------------------
// Airports
// ---------------------------------------------------------------------------

/// GET /api/v1/airports
pub async fn list_airports(
    State(state): State<AppState>,
    user: AuthUser,
    ValidQuery(filter): ValidQuery<AirportFilter>,
) -> AppResult<ApiResponse<Vec<Airport>>> {
    let airports = state.services.airports.list(&user.scope, &filter).await?;
    Ok(ApiResponse::listed(airports))
}

/// GET /api/v1/airports/{id}
pub async fn get_airport(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(id): IdPath,
) -> AppResult<ApiResponse<Airport>> {
    let airport = state.services.airports.get(&user.scope, id).await?;
    Ok(ApiResponse::found(airport))
}

/// PATCH /api/v1/airports/{id}/activate
pub async fn activate_airport(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    IdPath(id): IdPath,
) -> AppResult<ApiResponse> {
    state.services.airports.set_status(&admin.scope, id, true).await?;
    Ok(status_ack(true))
}

/// PATCH /api/v1/airports/{id}/deactivate
pub async fn deactivate_airport(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    IdPath(id): IdPath,
) -> AppResult<ApiResponse> {
    state.services.airports.set_status(&admin.scope, id, false).await?;
    Ok(status_ack(false))
}

/// GET /api/v1/cities/{city}
pub async fn airports_by_city(
    State(state): State<AppState>,
    user: AuthUser,
    Path(city): Path<String>,
) -> AppResult<ApiResponse<Vec<Airport>>> {
    let filter = AirportFilter {
        city: Some(city),
        ..Default::default()
    };
    let airports = state
        .services
        .airports
        .list_grouped(&user.scope, &filter, Entity::City)
        .await?;
    Ok(ApiResponse::listed(airports))
}

/// GET /api/v1/countries/{country}
pub async fn airports_by_country(
    State(state): State<AppState>,
    user: AuthUser,
    Path(country): Path<String>,
) -> AppResult<ApiResponse<Vec<Airport>>> {
    let filter = AirportFilter {
        country: Some(country),
        ..Default::default()
    };
    let airports = state
        .services
        .airports
        .list_grouped(&user.scope, &filter, Entity::Country)
        .await?;
    Ok(ApiResponse::listed(airports))
}

/// GET /api/v1/airport-types/{airport_type}
pub async fn airports_by_type(
    State(state): State<AppState>,
    user: AuthUser,
    Path(airport_type): Path<String>,
) -> AppResult<ApiResponse<Vec<Airport>>> {
    let filter = AirportFilter {
        airport_type: Some(airport_type),
        ..Default::default()
    };
    let airports = state
        .services
        .airports
        .list_grouped(&user.scope, &filter, Entity::AirportType)
        .await?;
    Ok(ApiResponse::listed(airports))
}

// ---------------------------------------------------------------------------
// Routes and airline routes
// ---------------------------------------------------------------------------

/// GET /api/v1/routes
pub async fn list_routes(
    State(state): State<AppState>,
    user: AuthUser,
    ValidQuery(filter): ValidQuery<RouteFilter>,
) -> AppResult<ApiResponse<Vec<Route>>> {
    let routes = state.services.routes.list(&user.scope, &filter).await?;
    Ok(ApiResponse::listed(routes))
}

/// GET /api/v1/routes/{id}
pub async fn get_route(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(id): IdPath,
) -> AppResult<ApiResponse<Route>> {
    let route = state.services.routes.get(&user.scope, id).await?;
    Ok(ApiResponse::found(route))
}

/// GET /api/v1/airline-routes
pub async fn list_airline_routes(
    State(state): State<AppState>,
    user: AuthUser,
    ValidQuery(filter): ValidQuery<AirlineRouteFilter>,
) -> AppResult<ApiResponse<Vec<AirlineRoute>>> {
    let routes = state.services.airline_routes.list(&user.scope, &filter).await?;
    Ok(ApiResponse::listed(routes))
}

/// GET /api/v1/airline-routes/{id}
pub async fn get_airline_route(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(id): IdPath,
) -> AppResult<ApiResponse<AirlineRoute>> {
    let route = state.services.airline_routes.get(&user.scope, id).await?;
    Ok(ApiResponse::found(route))
}

/// PATCH /api/v1/airline-routes/{id}/activate
pub async fn activate_airline_route(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    IdPath(id): IdPath,
) -> AppResult<ApiResponse> {
    state.services.airline_routes.set_status(&admin.scope, id, true).await?;
    Ok(status_ack(true))
}

/// PATCH /api/v1/airline-routes/{id}/deactivate
pub async fn deactivate_airline_route(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    IdPath(id): IdPath,
) -> AppResult<ApiResponse> {
    state.services.airline_routes.set_status(&admin.scope, id, false).await?;
    Ok(status_ack(false))
}

// ---------------------------------------------------------------------------
// Aircraft models, engines, manufacturers
// ---------------------------------------------------------------------------

/// GET /api/v1/aircraft-models
pub async fn list_aircraft_models(
    State(state): State<AppState>,
    user: AuthUser,
    ValidQuery(filter): ValidQuery<AircraftModelFilter>,
) -> AppResult<ApiResponse<Vec<AircraftModel>>> {
    let models = state.services.aircraft_models.list(&user.scope, &filter).await?;
    Ok(ApiResponse::listed(models))
}

/// GET /api/v1/aircraft-models/{id}
pub async fn get_aircraft_model(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(id): IdPath,
) -> AppResult<ApiResponse<AircraftModel>> {
    let model = state.services.aircraft_models.get(&user.scope, id).await?;
    Ok(ApiResponse::found(model))
}

/// PATCH /api/v1/aircraft-models/{id}/activate
pub async fn activate_aircraft_model(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    IdPath(id): IdPath,
) -> AppResult<ApiResponse> {
    state.services.aircraft_models.set_status(&admin.scope, id, true).await?;
    Ok(status_ack(true))
}

/// PATCH /api/v1/aircraft-models/{id}/deactivate
pub async fn deactivate_aircraft_model(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    IdPath(id): IdPath,
) -> AppResult<ApiResponse> {
    state.services.aircraft_models.set_status(&admin.scope, id, false).await?;
    Ok(status_ack(false))
}

/// GET /api/v1/aircraft-families/{family}
pub async fn models_by_family(
    State(state): State<AppState>,
    user: AuthUser,
    Path(family): Path<String>,
) -> AppResult<ApiResponse<Vec<AircraftModel>>> {
    let filter = AircraftModelFilter {
        family: Some(family),
        ..Default::default()
    };
    let models = state
        .services
        .aircraft_models
        .list_grouped(&user.scope, &filter, Entity::AircraftFamily)
        .await?;
    Ok(ApiResponse::listed(models))
}

/// GET /api/v1/engines
pub async fn list_engines(
    State(state): State<AppState>,
    user: AuthUser,
    ValidQuery(filter): ValidQuery<NoFilter>,
) -> AppResult<ApiResponse<Vec<Engine>>> {
    let engines = state.services.engines.list(&user.scope, &filter).await?;
    Ok(ApiResponse::listed(engines))
}

/// GET /api/v1/engines/{id}
pub async fn get_engine(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(id): IdPath,
) -> AppResult<ApiResponse<Engine>> {
    let engine = state.services.engines.get(&user.scope, id).await?;
    Ok(ApiResponse::found(engine))
}

/// GET /api/v1/manufacturers
pub async fn list_manufacturers(
    State(state): State<AppState>,
    user: AuthUser,
    ValidQuery(filter): ValidQuery<NoFilter>,
) -> AppResult<ApiResponse<Vec<Manufacturer>>> {
    let manufacturers = state.services.manufacturers.list(&user.scope, &filter).await?;
    Ok(ApiResponse::listed(manufacturers))
}

/// GET /api/v1/manufacturers/{id}
pub async fn get_manufacturer(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(id): IdPath,
) -> AppResult<ApiResponse<Manufacturer>> {
    let manufacturer = state.services.manufacturers.get(&user.scope, id).await?;
    Ok(ApiResponse::found(manufacturer))
}
