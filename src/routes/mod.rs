pub mod health;
pub mod itinerary;

use actix_web::{web, HttpResponse, Responder};
use serde_json::json;

use crate::services::annotation_service::AnnotationService;
use crate::services::itinerary_optimization_service::ItineraryOptimizer;
use crate::services::route_optimization_service::OptimizationConfig;
use crate::services::Providers;

/// Shared per-process state handed to every handler through `web::Data`.
pub struct AppState {
    pub optimizer: ItineraryOptimizer,
    pub annotator: AnnotationService,
    pub providers: Providers,
    pub environment: String,
}

impl AppState {
    pub fn new(providers: Providers, config: OptimizationConfig, environment: impl Into<String>) -> Self {
        Self {
            optimizer: ItineraryOptimizer::new(
                providers.forecasts.clone(),
                providers.narrator.clone(),
                providers.travel_times.clone(),
                config,
            ),
            annotator: AnnotationService::new(providers.forecasts.clone()),
            providers,
            environment: environment.into(),
        }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/api/itineraries")
                .route("/optimize", web::post().to(itinerary::optimize))
                .route("/annotate", web::post().to(itinerary::annotate)),
        );
}

async fn index() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "message": "Trip Optimizer API is running",
        "endpoints": [
            "GET /health",
            "POST /api/itineraries/optimize",
            "POST /api/itineraries/annotate"
        ]
    }))
}
