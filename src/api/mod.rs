//! HTTP interface: health check, prediction and metrics routes

pub mod error;
pub mod handlers;

use crate::metrics::ServingMetrics;
use crate::pipeline::ScoringPipeline;
use crate::prediction_log::PredictionLogger;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ScoringPipeline>,
    pub logger: PredictionLogger,
    pub metrics: Arc<ServingMetrics>,
}

impl AppState {
    pub fn new(pipeline: ScoringPipeline, logger: PredictionLogger) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            logger,
            metrics: Arc::new(ServingMetrics::new()),
        }
    }
}

/// Build the router with all routes
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/predict", post(handlers::predict))
        .route("/metrics", get(handlers::metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prediction_log::MemorySink;
    use crate::testing::fixed_pipeline;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn test_app(probability: f64) -> (Router, Arc<MemorySink>, AppState) {
        let sink = Arc::new(MemorySink::new());
        let state = AppState::new(
            fixed_pipeline(probability),
            PredictionLogger::new(sink.clone()),
        );
        (router(state.clone()), sink, state)
    }

    fn example_body() -> Value {
        json!({
            "loan_amnt": 10000,
            "funded_amnt": 10000,
            "term": "36 months",
            "int_rate": 12.5,
            "emp_length": "5 years",
            "home_ownership": "RENT",
            "annual_inc": 55000,
            "verification_status": "Verified",
            "purpose": "debt_consolidation",
            "dti": 18.2,
            "delinq_2yrs": 0
        })
    }

    fn post_predict(body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/predict")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let (app, _, _) = test_app(0.1);
        let resp = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn predict_example_scenario() {
        let (app, sink, _) = test_app(0.42);
        let resp = app
            .oneshot(post_predict(example_body().to_string()))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["default_probability"], 0.42);
        assert_eq!(json["prediction"], 0);
        assert_eq!(json["confidence_label"], "Moderate Risk");
        assert_eq!(json["model_version"], "1.0.0");

        let lines = sink.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("Prediction: 0 | Probability: 0.42 |"));
    }

    #[tokio::test]
    async fn predict_rounds_probability() {
        let (app, _, _) = test_app(0.87654);
        let resp = app
            .oneshot(post_predict(example_body().to_string()))
            .await
            .unwrap();

        let json = body_json(resp).await;
        assert_eq!(json["default_probability"], 0.88);
        assert_eq!(json["prediction"], 1);
        assert_eq!(json["confidence_label"], "Very High Risk");
    }

    #[tokio::test]
    async fn predict_missing_field_is_422() {
        let (app, sink, state) = test_app(0.42);
        let mut body = example_body();
        body.as_object_mut().unwrap().remove("purpose");

        let resp = app.oneshot(post_predict(body.to_string())).await.unwrap();

        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = body_json(resp).await;
        assert!(json["error"].as_str().unwrap().contains("purpose"));
        assert!(sink.lines().is_empty());
        assert_eq!(state.metrics.snapshot().validation_rejections, 1);
    }

    #[tokio::test]
    async fn predict_wrong_type_is_422() {
        let (app, _, _) = test_app(0.42);
        let mut body = example_body();
        body["dti"] = json!("high");

        let resp = app.oneshot(post_predict(body.to_string())).await.unwrap();

        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = body_json(resp).await;
        assert!(json["error"].as_str().unwrap().contains("dti"));
    }

    #[tokio::test]
    async fn predict_accepts_whole_number_float_count() {
        let (app, _, _) = test_app(0.42);
        let mut body = example_body();
        body["delinq_2yrs"] = json!(0.0);

        let resp = app.oneshot(post_predict(body.to_string())).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["confidence_label"], "Moderate Risk");
    }

    #[tokio::test]
    async fn predict_fractional_count_is_422() {
        let (app, _, _) = test_app(0.42);
        let mut body = example_body();
        body["delinq_2yrs"] = json!(1.5);

        let resp = app.oneshot(post_predict(body.to_string())).await.unwrap();

        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = body_json(resp).await;
        assert!(json["error"].as_str().unwrap().contains("delinq_2yrs"));
    }

    #[tokio::test]
    async fn predict_malformed_json_is_client_error() {
        let (app, _, _) = test_app(0.42);
        let resp = app
            .oneshot(post_predict("{not json".to_string()))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn metrics_reflect_predictions() {
        let (app, _, _) = test_app(0.65);
        let resp = app
            .clone()
            .oneshot(post_predict(example_body().to_string()))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = app
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let json = body_json(resp).await;
        assert_eq!(json["predictions_served"], 1);
        assert_eq!(json["by_label"]["High Risk"], 1);
    }
}
