//! Every route the gateway forwards to the upstream API

use clinic_core::{CreateUserRequest, RegisterRequest, Resource, Validator, validate_as};

use super::proxy::{BodyMode, ProxyRoute};

const REGISTER: Validator = validate_as::<RegisterRequest>;
const CREATE_USER: Validator = validate_as::<CreateUserRequest>;

/// All forwarded routes, relative to `/api`
pub fn routes() -> Vec<ProxyRoute> {
    let mut routes = vec![ProxyRoute::post("/auth/register").public().validated(REGISTER)];

    for resource in Resource::ALL {
        routes.extend(collection(resource));
    }

    routes.extend([
        // users
        ProxyRoute::patch("/users/{id}/change-password"),
        ProxyRoute::post("/users/bulk-deactivate"),
        // Older dashboards call the misspelled path; the upstream only knows the correct one.
        ProxyRoute::post("/users/bulk-desactivate").upstream("/users/bulk-deactivate"),
        // doctors
        ProxyRoute::get("/doctors/stats"),
        // floors
        ProxyRoute::get("/floors/stats"),
        ProxyRoute::get("/floors/{id}/sections"),
        // offices
        ProxyRoute::get("/offices/by-floor/{floorId}"),
        ProxyRoute::get("/offices/stats"),
        // doctor schedules
        ProxyRoute::get("/doctor-schedules/by-doctor/{doctorId}"),
        ProxyRoute::get("/doctor-schedules/availability"),
        // patients
        ProxyRoute::get("/patients/search/ci/{ci}"),
        ProxyRoute::get("/patients/stats"),
        // medical history
        ProxyRoute::get("/medical-history/by-patient/{patientId}"),
        ProxyRoute::get("/medical-history/specialties"),
        ProxyRoute::get("/medical-history/stats"),
        // assistant
        ProxyRoute::post("/chatbot/chat"),
    ]);

    routes
}

/// List/create on the collection, read/update/delete on `{id}`, and
/// activation where the upstream supports it.
fn collection(resource: Resource) -> Vec<ProxyRoute> {
    let base = resource.path();
    let item = format!("{base}/{{id}}");

    let mut create = ProxyRoute::post(base);
    if resource == Resource::Users {
        create = create.validated(CREATE_USER);
    }

    let mut routes = vec![
        ProxyRoute::get(base),
        create,
        ProxyRoute::get(item.as_str()),
        ProxyRoute::patch(item.as_str()),
        ProxyRoute::delete(item.as_str()),
    ];

    if resource.supports_activation() {
        routes.push(ProxyRoute::post(format!("{item}/activate")).body(BodyMode::OptionalJson));
    }

    routes
}
