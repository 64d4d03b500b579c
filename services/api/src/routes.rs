use crate::infra::{deserialize_optional_timestamp, AppState};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use veille::workflows::opportunities::{BatchContext, OpportunityBatch};

/// Generator output to score. `payload` (decoded JSON) wins over `raw` (text).
///
/// Scoring always uses the policy the service was started with.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ScoreRequest {
    #[serde(default)]
    pub(crate) payload: Option<Value>,
    #[serde(default)]
    pub(crate) raw: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    pub(crate) processed_at: Option<DateTime<Utc>>,
}

pub(crate) fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/opportunities/score", post(score_endpoint))
        .layer(Extension(state))
}

pub(crate) async fn healthcheck() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn score_endpoint(
    Extension(state): Extension<AppState>,
    Json(request): Json<ScoreRequest>,
) -> Json<OpportunityBatch> {
    let ScoreRequest {
        payload,
        raw,
        processed_at,
    } = request;

    let engine = state.engine.as_ref();
    let ctx = BatchContext::new(processed_at.unwrap_or_else(Utc::now));
    let batch = match (payload, raw) {
        (Some(payload), _) => engine.process_value(&payload, &ctx),
        (None, Some(raw)) => engine.process_str(&raw, &ctx),
        (None, None) => engine.process(&[], &ctx),
    };

    Json(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use tower::ServiceExt;
    use veille::workflows::opportunities::OpportunityEngine;

    fn state(ready: bool) -> AppState {
        AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
            engine: Arc::new(OpportunityEngine::default()),
        }
    }

    fn processed_at() -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339("2025-09-24T10:00:00Z")
            .ok()
            .map(|instant| instant.with_timezone(&Utc))
    }

    #[tokio::test]
    async fn score_endpoint_ranks_payload_candidates() {
        let request = ScoreRequest {
            payload: Some(json!({
                "opportunities": [
                    { "title": "Plain", "sector": "Retail" },
                    {
                        "title": "Blue ocean",
                        "sector": "Energy",
                        "competitionLevel": 20,
                        "financialPotential": 95
                    }
                ]
            })),
            processed_at: processed_at(),
            ..ScoreRequest::default()
        };

        let Json(batch) = score_endpoint(Extension(state(true)), Json(request)).await;

        assert_eq!(batch.opportunities.len(), 2);
        assert_eq!(batch.opportunities[0].title, "Blue ocean");
        assert!(batch.opportunities[0].is_uncontested_market);
        assert_eq!(batch.metrics.uncontested_market_count, 1);
        assert_eq!(batch.metrics.top_sectors, vec!["Energy", "Retail"]);
        assert_eq!(
            batch.opportunities[1].detection_date.to_string(),
            "2025-09-24"
        );
    }

    #[tokio::test]
    async fn score_endpoint_accepts_raw_generator_text() {
        let request = ScoreRequest {
            raw: Some("```json\n[{\"titre\": \"Texte brut\"}]\n```".to_string()),
            processed_at: processed_at(),
            ..ScoreRequest::default()
        };

        let Json(batch) = score_endpoint(Extension(state(true)), Json(request)).await;

        assert_eq!(batch.opportunities.len(), 1);
        assert_eq!(batch.opportunities[0].title, "Texte brut");
    }

    #[tokio::test]
    async fn request_cannot_override_scoring_weights() {
        let body = json!({
            "payload": [{
                "relevance": 10,
                "novelty": 100,
                "difficulty": 100,
                "financialPotential": 100,
                "competitionLevel": 100
            }],
            "policy": {
                "weights": {
                    "relevance": 1.0,
                    "novelty": 0.0,
                    "difficulty": 0.0,
                    "financialPotential": 0.0,
                    "competitionLevel": 0.0
                }
            }
        });

        let response = router(state(true))
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/opportunities/score")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .expect("request builds"),
            )
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body read");
        let json: Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(json["opportunities"][0]["scores"]["composite"], 73);
    }

    #[tokio::test]
    async fn empty_request_yields_empty_batch() {
        let response = router(state(true))
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/opportunities/score")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{}"))
                    .expect("request builds"),
            )
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body read");
        let json: Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(
            json,
            json!({
                "opportunities": [],
                "metrics": {
                    "uncontestedMarketCount": 0,
                    "averageCompositeScore": 0,
                    "topSectors": []
                }
            })
        );
    }

    #[tokio::test]
    async fn readiness_reflects_flag() {
        let response = router(state(false))
            .oneshot(
                Request::builder()
                    .uri("/ready")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = router(state(true))
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);
    }
}
