use crate::infra::{
    deserialize_date, AppState, CalendarLedger, EntityDirectory, FeedLog, NotificationLedger,
};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use chrono::NaiveDate;
use compliance_ai::workflows::compliance::domain::{BusinessEntity, EntityId, EntityType};
use compliance_ai::workflows::compliance::store::StoreError;
use compliance_ai::workflows::compliance::{compliance_router, EngineState};
use serde::Deserialize;
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub(crate) type Engine = EngineState<EntityDirectory, CalendarLedger, NotificationLedger, FeedLog>;

static ENTITY_SEQUENCE: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Deserialize)]
pub(crate) struct RegisterEntityRequest {
    #[serde(default)]
    pub(crate) id: Option<String>,
    pub(crate) legal_name: String,
    pub(crate) entity_type: EntityType,
    pub(crate) state: String,
    #[serde(deserialize_with = "deserialize_date")]
    pub(crate) formation_date: NaiveDate,
    #[serde(default)]
    pub(crate) contact_email: Option<String>,
    #[serde(default)]
    pub(crate) contact_phone: Option<String>,
}

pub(crate) fn with_compliance_routes(
    engine: Engine,
    directory: Arc<EntityDirectory>,
) -> axum::Router {
    compliance_router(engine)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .merge(
            axum::Router::new()
                .route(
                    "/api/v1/compliance/entities",
                    axum::routing::post(register_entity_endpoint),
                )
                .with_state(directory),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
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

pub(crate) async fn register_entity_endpoint(
    State(directory): State<Arc<EntityDirectory>>,
    Json(payload): Json<RegisterEntityRequest>,
) -> Response {
    let id = payload.id.unwrap_or_else(|| {
        let id = ENTITY_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        format!("biz-{id:06}")
    });

    let entity = BusinessEntity {
        id: EntityId(id),
        legal_name: payload.legal_name,
        entity_type: payload.entity_type,
        state: payload.state,
        formation_date: payload.formation_date,
        contact_email: payload.contact_email,
        contact_phone: payload.contact_phone,
    };

    match directory.register(entity) {
        Ok(entity) => (StatusCode::CREATED, Json(json!({ "entity": entity }))).into_response(),
        Err(StoreError::Conflict) => (
            StatusCode::CONFLICT,
            Json(json!({ "error": "entity already registered" })),
        )
            .into_response(),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": err.to_string() })),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(id: Option<&str>) -> RegisterEntityRequest {
        RegisterEntityRequest {
            id: id.map(|value| value.to_string()),
            legal_name: "Test Filing Co LLC".to_string(),
            entity_type: EntityType::Llc,
            state: "CA".to_string(),
            formation_date: NaiveDate::from_ymd_opt(2024, 1, 10).expect("valid date"),
            contact_email: Some("owner@testfiling.example".to_string()),
            contact_phone: None,
        }
    }

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let Json(body) = healthcheck().await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn register_entity_creates_once_then_conflicts() {
        let directory = Arc::new(EntityDirectory::default());

        let created = register_entity_endpoint(
            State(directory.clone()),
            Json(request(Some("biz-route-test"))),
        )
        .await;
        assert_eq!(created.status(), StatusCode::CREATED);

        let duplicate = register_entity_endpoint(
            State(directory.clone()),
            Json(request(Some("biz-route-test"))),
        )
        .await;
        assert_eq!(duplicate.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn register_entity_assigns_sequential_ids_when_absent() {
        let directory = Arc::new(EntityDirectory::default());

        let first = register_entity_endpoint(State(directory.clone()), Json(request(None))).await;
        assert_eq!(first.status(), StatusCode::CREATED);

        let body = axum::body::to_bytes(first.into_body(), 64 * 1024)
            .await
            .expect("read body");
        let value: serde_json::Value = serde_json::from_slice(&body).expect("json payload");
        let assigned = value["entity"]["id"].as_str().expect("assigned id");
        assert!(assigned.starts_with("biz-"), "unexpected id {assigned}");
    }
}
