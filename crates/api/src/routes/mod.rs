pub mod accounts;
pub mod aircraft_registrations;
pub mod airline_employees;
pub mod flights;
pub mod health;
pub mod logbooks;
pub mod messages;
pub mod reference;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /register                                        register (public)
/// /login                                           login (public)
/// /verify-email                                    verify email (public)
/// /update-password                                 set password from action token (public)
/// /resend-verification                             resend verification email (public)
/// /reconcile                                       repair half-registered account (admin)
/// /me                                              caller's employee record
/// /employees/{id}                                  employee (self or admin)
///
/// /airlines                                        list
/// /airlines/{id}                                   get
/// /airlines/{id}/activate|deactivate               status (admin)
/// /airports                                        list
/// /airports/{id}                                   get
/// /airports/{id}/activate|deactivate               status (admin)
/// /cities/{city}                                   airports in a city
/// /countries/{country}                             airports in a country
/// /airport-types/{airport_type}                    airports of a type
/// /routes, /routes/{id}                            list, get
/// /airline-routes, /airline-routes/{id}            list, get
/// /airline-routes/{id}/activate|deactivate         status (admin)
/// /aircraft-models, /aircraft-models/{id}          list, get
/// /aircraft-models/{id}/activate|deactivate        status (admin)
/// /aircraft-families/{family}                      models of a family
/// /engines, /engines/{id}                          list, get
/// /manufacturers, /manufacturers/{id}              list, get
///
/// /aircraft-registrations                          list, create (create: admin)
/// /aircraft-registrations/{id}                     get, update (update: admin)
///
/// /airline-employees                               list, create (admin)
/// /airline-employees/{id}                          get, update (admin)
/// /airline-employees/{id}/activate|deactivate      status (admin)
///
/// /daily-logbooks                                  list, create (owner)
/// /daily-logbooks/{id}                             get, update, delete (owner)
/// /daily-logbooks/{id}/activate|deactivate         status (owner)
/// /daily-logbooks/{id}/details                     list, create flights (owner)
/// /daily-logbook-details/{id}                      get, update, delete flight (owner)
///
/// /messages                                        list, create (admin)
/// /messages/{id}                                   get, update, delete (admin)
/// /messages/reload                                 reload the catalog cache (admin)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Registration, login and account actions.
        .merge(accounts::router())
        // Read-mostly reference data and the virtual groupings over it.
        .merge(reference::router())
        .nest("/aircraft-registrations", aircraft_registrations::router())
        .nest("/airline-employees", airline_employees::router())
        // Owner-scoped logbooks and their flights.
        .nest("/daily-logbooks", logbooks::router())
        .nest("/daily-logbook-details", flights::router())
        // Message catalog administration.
        .nest("/messages", messages::router())
}
