use actix_web::{web, HttpResponse, Responder};
use log::{error, info};

use crate::models::optimize::{AnnotateRequest, ApiResponse, OptimizeRequest};
use crate::routes::AppState;

/*
    /api/itineraries/optimize
*/
pub async fn optimize(
    state: web::Data<AppState>,
    body: web::Json<OptimizeRequest>,
) -> impl Responder {
    let request = body.into_inner();
    info!(
        "Optimize request for {} from day {} ({} days)",
        request.city,
        request.start_day,
        request.itinerary.day_count()
    );

    match state
        .optimizer
        .optimize(
            request.itinerary,
            &request.trip_request,
            request.start_day,
            &request.city,
        )
        .await
    {
        Ok(result) => HttpResponse::Ok().json(ApiResponse::new("Optimized itinerary", result)),
        Err(err) => {
            error!("Failed to optimize itinerary: {}", err);
            HttpResponse::InternalServerError().json(ApiResponse::new(
                "Failed to optimize itinerary",
                err.into_original(),
            ))
        }
    }
}

/*
    /api/itineraries/annotate
*/
pub async fn annotate(
    state: web::Data<AppState>,
    body: web::Json<AnnotateRequest>,
) -> impl Responder {
    let annotated = state.annotator.annotate_request(body.into_inner()).await;

    HttpResponse::Ok().json(ApiResponse::new("Annotated itinerary", annotated))
}
