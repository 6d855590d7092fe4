use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;
use std::collections::HashMap;

use crate::routes::AppState;

#[derive(Serialize)]
struct HealthStatus {
    status: String,
    services: HashMap<String, ServiceStatus>,
    environment: String,
    version: String,
}

#[derive(Serialize, Clone)]
struct ServiceStatus {
    status: String,
    details: Option<String>,
}

/*
    /health
*/
pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let providers = &state.providers;
    let mut health = HealthStatus {
        status: "ok".to_string(),
        services: HashMap::new(),
        environment: state.environment.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    health
        .services
        .insert("forecast".to_string(), provider_status(providers.forecasts.name()));
    health
        .services
        .insert("routing".to_string(), provider_status(providers.travel_times.name()));
    health
        .services
        .insert("generation".to_string(), provider_status(providers.narrator.name()));

    HttpResponse::Ok().json(health)
}

// Collaborators are only reached per request; report which variant is wired.
fn provider_status(name: &str) -> ServiceStatus {
    let details = if name.starts_with("mock") {
        format!("{} (offline stand-in)", name)
    } else {
        format!("{} configured", name)
    };
    ServiceStatus {
        status: "ok".to_string(),
        details: Some(details),
    }
}
