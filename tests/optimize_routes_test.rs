mod common;

use std::sync::Arc;

use actix_web::{http::StatusCode, test};
use serde_json::json;

use common::{create_app, test_app_state, CannedNarrative, StubForecast, TableTravelTimes};
use trip_optimizer_api::services::Providers;

fn stub_providers(conditions: &[&'static str]) -> Providers {
    Providers {
        forecasts: Arc::new(StubForecast::with_conditions(conditions)),
        travel_times: Arc::new(TableTravelTimes::new(&[
            ("A", "B", 10),
            ("A", "C", 30),
            ("B", "C", 5),
        ])),
        narrator: Arc::new(CannedNarrative::failing("offline")),
    }
}

fn optimize_body(start_day: i64) -> serde_json::Value {
    json!({
        "itinerary_json": {
            "itinerary": [
                {"day": 1, "morning": "Fort", "afternoon": "Palace", "evening": "Bazaar", "estimated_cost": 1000},
                {"day": 2, "morning": "A", "afternoon": "C", "evening": "B", "estimated_cost": 1500}
            ],
            "total_estimated_cost": 42
        },
        "parsed_input": {
            "location": "Jaipur",
            "duration_days": 2,
            "budget": 10000,
            "themes": ["heritage"]
        },
        "start_day": start_day,
        "city": "Jaipur"
    })
}

#[actix_rt::test]
async fn test_root_endpoint() {
    let app = test::init_service(create_app(test_app_state(Providers::mock()))).await;

    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Trip Optimizer API is running");
}

#[actix_rt::test]
async fn test_health_reports_provider_variants() {
    let app = test::init_service(create_app(test_app_state(Providers::mock()))).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["environment"], "test");
    assert_eq!(body["services"]["forecast"]["status"], "ok");
    assert!(body["services"]["routing"]["details"]
        .as_str()
        .unwrap()
        .starts_with("mock-distance"));
}

#[actix_rt::test]
async fn test_optimize_returns_itinerary_and_reasons() {
    let app = test::init_service(create_app(test_app_state(stub_providers(&["Sunny"])))).await;

    let req = test::TestRequest::post()
        .uri("/api/itineraries/optimize")
        .set_json(&optimize_body(2))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Optimized itinerary");

    let itinerary = &body["response"]["itinerary"];
    assert_eq!(itinerary["total_estimated_cost"], 2500.0);
    assert_eq!(itinerary["itinerary"][0]["morning"], "Fort");
    assert_eq!(itinerary["itinerary"][1]["afternoon"], "B");
    assert_eq!(
        body["response"]["reasons"]["2"][0],
        "Adjusted sequence to reduce travel time between activities."
    );
}

#[actix_rt::test]
async fn test_optimize_malformed_itinerary_returns_original() {
    let app = test::init_service(create_app(test_app_state(stub_providers(&["Sunny"])))).await;

    let mut body = optimize_body(1);
    body["itinerary_json"]["itinerary"][1]["day"] = json!(5);

    let req = test::TestRequest::post()
        .uri("/api/itineraries/optimize")
        .set_json(&body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Failed to optimize itinerary");
    assert_eq!(body["response"]["itinerary"][1]["day"], 5);
    assert_eq!(body["response"]["total_estimated_cost"], 42.0);
}

#[actix_rt::test]
async fn test_optimize_negative_start_day_returns_input() {
    let app = test::init_service(create_app(test_app_state(stub_providers(&["Sunny"])))).await;

    let req = test::TestRequest::post()
        .uri("/api/itineraries/optimize")
        .set_json(&optimize_body(-3))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["response"]["itinerary"]["itinerary"][1]["afternoon"], "C");
    assert_eq!(body["response"]["reasons"], json!({}));
}

#[actix_rt::test]
async fn test_optimize_rejects_invalid_body() {
    let app = test::init_service(create_app(test_app_state(Providers::mock()))).await;

    let req = test::TestRequest::post()
        .uri("/api/itineraries/optimize")
        .set_json(&json!({"city": "Jaipur"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_annotate_applies_advisories_and_hints() {
    let app = test::init_service(create_app(test_app_state(stub_providers(&[
        "Heavy rain",
        "Sunny",
    ]))))
    .await;

    let req = test::TestRequest::post()
        .uri("/api/itineraries/annotate")
        .set_json(&json!({
            "itinerary": {
                "itinerary": [
                    {"day": 1, "morning": "City Tour", "afternoon": "", "evening": "", "estimated_cost": 100},
                    {"day": 2, "morning": "Amber Fort", "afternoon": "Lake", "evening": "", "estimated_cost": 200}
                ],
                "total_estimated_cost": 300
            },
            "city": "Jaipur",
            "place_reviews": {"Amber Fort": ["Best in the morning", "morning crowds are thin"]}
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Annotated itinerary");
    let days = &body["response"]["itinerary"]["itinerary"];
    assert_eq!(
        days[0]["morning"],
        "City Tour (Consider indoor alternative due to rain)"
    );
    assert_eq!(days[0]["afternoon"], "");
    assert_eq!(
        days[1]["morning"],
        "Amber Fort (Best time: morning) (Great time for outdoor activities)"
    );
    assert_eq!(body["response"]["itinerary"]["total_estimated_cost"], 300.0);
    assert_eq!(body["response"]["local_tips"], json!([]));
}

#[actix_rt::test]
async fn test_annotate_mines_review_comments() {
    let app = test::init_service(create_app(test_app_state(stub_providers(&["Partly cloudy"])))).await;

    let req = test::TestRequest::post()
        .uri("/api/itineraries/annotate")
        .set_json(&json!({
            "itinerary": {
                "itinerary": [
                    {"day": 1, "morning": "Amber Fort", "afternoon": "Hawa Mahal", "evening": "", "estimated_cost": 100}
                ],
                "total_estimated_cost": 100
            },
            "city": "Jaipur",
            "review_comments": [
                "Amber Fort is best in the morning. Morning queues are short",
                {"text": "Try the lassi near Hawa Mahal"}
            ],
            "places": ["Amber Fort"]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    let day = &body["response"]["itinerary"]["itinerary"][0];
    assert_eq!(day["morning"], "Amber Fort (Best time: morning)");
    assert_eq!(day["afternoon"], "Hawa Mahal");
    assert_eq!(
        body["response"]["local_tips"],
        json!(["Try the lassi near Hawa Mahal"])
    );
}
