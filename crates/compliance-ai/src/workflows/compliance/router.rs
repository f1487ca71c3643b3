use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde_json::json;

use super::clock::Clock;
use super::dispatch::{DispatchError, NotificationDispatcher};
use super::domain::{EntityId, EntryId};
use super::scheduler::{ComplianceScheduler, ScheduleError};
use super::store::{CalendarStore, DashboardFeed, EntityStore, NotificationStore, StoreError};

/// Shared handler state: scheduler, dispatcher, and the clock that pins
/// "today" for every request.
pub struct EngineState<E, C, N, F> {
    pub scheduler: Arc<ComplianceScheduler<E, C, N>>,
    pub dispatcher: Arc<NotificationDispatcher<E, C, N, F>>,
    pub clock: Arc<dyn Clock>,
}

impl<E, C, N, F> Clone for EngineState<E, C, N, F> {
    fn clone(&self) -> Self {
        Self {
            scheduler: Arc::clone(&self.scheduler),
            dispatcher: Arc::clone(&self.dispatcher),
            clock: Arc::clone(&self.clock),
        }
    }
}

pub fn compliance_router<E, C, N, F>(state: EngineState<E, C, N, F>) -> Router
where
    E: EntityStore + 'static,
    C: CalendarStore + 'static,
    N: NotificationStore + 'static,
    F: DashboardFeed + 'static,
{
    Router::new()
        .route(
            "/api/v1/compliance/entities/:entity_id/calendar",
            get(calendar_handler::<E, C, N, F>),
        )
        .route(
            "/api/v1/compliance/entities/:entity_id/calendar/materialize",
            post(materialize_handler::<E, C, N, F>),
        )
        .route(
            "/api/v1/compliance/entities/:entity_id/report",
            get(report_handler::<E, C, N, F>),
        )
        .route(
            "/api/v1/compliance/entries/:entry_id/complete",
            post(complete_handler::<E, C, N, F>),
        )
        .route(
            "/api/v1/compliance/entries/:entry_id/cancel",
            post(cancel_handler::<E, C, N, F>),
        )
        .route(
            "/api/v1/compliance/entries/:entry_id/reminders",
            get(reminders_handler::<E, C, N, F>),
        )
        .route(
            "/api/v1/compliance/dispatch",
            post(dispatch_handler::<E, C, N, F>),
        )
        .with_state(state)
}

pub(crate) async fn materialize_handler<E, C, N, F>(
    State(state): State<EngineState<E, C, N, F>>,
    Path(entity_id): Path<String>,
) -> Response
where
    E: EntityStore + 'static,
    C: CalendarStore + 'static,
    N: NotificationStore + 'static,
    F: DashboardFeed + 'static,
{
    let entity_id = EntityId(entity_id);
    let today = state.clock.today();
    match state.scheduler.materialize(&entity_id, today) {
        Ok(created) => (
            StatusCode::CREATED,
            axum::Json(json!({
                "entity_id": entity_id.0,
                "created": created,
            })),
        )
            .into_response(),
        Err(error) => schedule_error_response(error),
    }
}

pub(crate) async fn calendar_handler<E, C, N, F>(
    State(state): State<EngineState<E, C, N, F>>,
    Path(entity_id): Path<String>,
) -> Response
where
    E: EntityStore + 'static,
    C: CalendarStore + 'static,
    N: NotificationStore + 'static,
    F: DashboardFeed + 'static,
{
    let entity_id = EntityId(entity_id);
    match state.scheduler.calendar_for(&entity_id) {
        Ok(entries) => (
            StatusCode::OK,
            axum::Json(json!({
                "entity_id": entity_id.0,
                "entries": entries,
            })),
        )
            .into_response(),
        Err(error) => schedule_error_response(error),
    }
}

pub(crate) async fn report_handler<E, C, N, F>(
    State(state): State<EngineState<E, C, N, F>>,
    Path(entity_id): Path<String>,
) -> Response
where
    E: EntityStore + 'static,
    C: CalendarStore + 'static,
    N: NotificationStore + 'static,
    F: DashboardFeed + 'static,
{
    let entity_id = EntityId(entity_id);
    let today = state.clock.today();
    match state.scheduler.report(&entity_id, today) {
        Ok(report) => {
            let summary = report.summary();
            let insights = summary.insights(
                &report.entity,
                today,
                &state.scheduler.policy().regulatory,
            );
            (
                StatusCode::OK,
                axum::Json(json!({
                    "summary": summary,
                    "insights": insights,
                })),
            )
                .into_response()
        }
        Err(error) => schedule_error_response(error),
    }
}

pub(crate) async fn complete_handler<E, C, N, F>(
    State(state): State<EngineState<E, C, N, F>>,
    Path(entry_id): Path<String>,
) -> Response
where
    E: EntityStore + 'static,
    C: CalendarStore + 'static,
    N: NotificationStore + 'static,
    F: DashboardFeed + 'static,
{
    let entry_id = EntryId(entry_id);
    let today = state.clock.today();
    match state.scheduler.complete(&entry_id, today) {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(error) => schedule_error_response(error),
    }
}

pub(crate) async fn cancel_handler<E, C, N, F>(
    State(state): State<EngineState<E, C, N, F>>,
    Path(entry_id): Path<String>,
) -> Response
where
    E: EntityStore + 'static,
    C: CalendarStore + 'static,
    N: NotificationStore + 'static,
    F: DashboardFeed + 'static,
{
    let entry_id = EntryId(entry_id);
    match state.scheduler.cancel(&entry_id) {
        Ok(entry) => (StatusCode::OK, axum::Json(entry)).into_response(),
        Err(error) => schedule_error_response(error),
    }
}

pub(crate) async fn reminders_handler<E, C, N, F>(
    State(state): State<EngineState<E, C, N, F>>,
    Path(entry_id): Path<String>,
) -> Response
where
    E: EntityStore + 'static,
    C: CalendarStore + 'static,
    N: NotificationStore + 'static,
    F: DashboardFeed + 'static,
{
    let entry_id = EntryId(entry_id);
    match state.scheduler.reminders_for(&entry_id) {
        Ok(notifications) => (
            StatusCode::OK,
            axum::Json(json!({
                "entry_id": entry_id.0,
                "notifications": notifications,
            })),
        )
            .into_response(),
        Err(error) => schedule_error_response(error),
    }
}

pub(crate) async fn dispatch_handler<E, C, N, F>(
    State(state): State<EngineState<E, C, N, F>>,
) -> Response
where
    E: EntityStore + 'static,
    C: CalendarStore + 'static,
    N: NotificationStore + 'static,
    F: DashboardFeed + 'static,
{
    let now = state.clock.today();
    let dispatcher = Arc::clone(&state.dispatcher);

    // Channel clients may block on their own runtime, so the sweep runs on
    // the blocking pool.
    let outcome = tokio::task::spawn_blocking(move || dispatcher.dispatch_due(now)).await;
    match outcome {
        Ok(Ok(report)) => (StatusCode::OK, axum::Json(report)).into_response(),
        Ok(Err(error)) => dispatch_error_response(error),
        Err(error) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            axum::Json(json!({ "error": error.to_string() })),
        )
            .into_response(),
    }
}

fn schedule_error_response(error: ScheduleError) -> Response {
    match error {
        ScheduleError::Store(StoreError::NotFound) => (
            StatusCode::NOT_FOUND,
            axum::Json(json!({ "error": "record not found" })),
        )
            .into_response(),
        ScheduleError::Store(StoreError::Conflict) => (
            StatusCode::CONFLICT,
            axum::Json(json!({ "error": "record already exists" })),
        )
            .into_response(),
        ScheduleError::Store(StoreError::Unavailable(reason)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            axum::Json(json!({ "error": reason })),
        )
            .into_response(),
        ScheduleError::State(error) => (
            StatusCode::CONFLICT,
            axum::Json(json!({ "error": error.to_string() })),
        )
            .into_response(),
    }
}

fn dispatch_error_response(error: DispatchError) -> Response {
    match error {
        DispatchError::Store(StoreError::Unavailable(reason)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            axum::Json(json!({ "error": reason })),
        )
            .into_response(),
        other => (
            StatusCode::INTERNAL_SERVER_ERROR,
            axum::Json(json!({ "error": other.to_string() })),
        )
            .into_response(),
    }
}
