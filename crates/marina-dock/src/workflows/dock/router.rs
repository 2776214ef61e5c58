use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::bumping::Selection;
use super::domain::{
    ApplicationId, ApplicationPatch, ApplicationStatus, ApplicationSubmission, NewSeason,
    SeasonId, SeasonPatch, SeasonStatus,
};
use super::repository::{DockStore, RepositoryError};
use super::service::{DockPlanningService, DockServiceError};

/// Router exposing season, intake, planning and bumping party endpoints.
pub fn dock_router<S>(service: Arc<DockPlanningService<S>>) -> Router
where
    S: DockStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/seasons",
            post(create_season_handler::<S>).get(list_seasons_handler::<S>),
        )
        .route(
            "/api/v1/seasons/:season_id",
            get(season_handler::<S>).patch(update_season_handler::<S>),
        )
        .route(
            "/api/v1/seasons/:season_id/status",
            patch(season_status_handler::<S>),
        )
        .route(
            "/api/v1/seasons/:season_id/applications",
            post(submit_handler::<S>).get(list_applications_handler::<S>),
        )
        .route(
            "/api/v1/seasons/:season_id/applications/stats",
            get(stats_handler::<S>),
        )
        .route(
            "/api/v1/applications/:application_id",
            patch(amend_handler::<S>),
        )
        .route(
            "/api/v1/applications/:application_id/status",
            patch(application_status_handler::<S>),
        )
        .route(
            "/api/v1/seasons/:season_id/plan",
            post(compute_plan_handler::<S>).get(plan_handler::<S>),
        )
        .route(
            "/api/v1/seasons/:season_id/plan/slots",
            get(slots_handler::<S>),
        )
        .route(
            "/api/v1/seasons/:season_id/bumping",
            post(start_bumping_handler::<S>).get(bumping_handler::<S>),
        )
        .route(
            "/api/v1/seasons/:season_id/bumping/selections",
            post(selection_handler::<S>),
        )
        .route("/api/v1/current-season", get(current_season_handler::<S>))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct SeasonStatusUpdate {
    pub(crate) status: SeasonStatus,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApplicationStatusUpdate {
    pub(crate) status: ApplicationStatus,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CurrentSeasonQuery {
    #[serde(default)]
    pub(crate) date: Option<NaiveDate>,
}

type Service<S> = State<Arc<DockPlanningService<S>>>;

pub(crate) async fn create_season_handler<S>(
    State(service): Service<S>,
    Json(request): Json<NewSeason>,
) -> Response
where
    S: DockStore + 'static,
{
    respond(StatusCode::CREATED, service.create_season(request))
}

pub(crate) async fn list_seasons_handler<S>(State(service): Service<S>) -> Response
where
    S: DockStore + 'static,
{
    respond(StatusCode::OK, service.seasons())
}

pub(crate) async fn update_season_handler<S>(
    State(service): Service<S>,
    Path(season_id): Path<String>,
    Json(patch): Json<SeasonPatch>,
) -> Response
where
    S: DockStore + 'static,
{
    respond(
        StatusCode::OK,
        service.update_season(&SeasonId(season_id), patch),
    )
}

pub(crate) async fn season_handler<S>(
    State(service): Service<S>,
    Path(season_id): Path<String>,
) -> Response
where
    S: DockStore + 'static,
{
    respond(StatusCode::OK, service.season(&SeasonId(season_id)))
}

pub(crate) async fn season_status_handler<S>(
    State(service): Service<S>,
    Path(season_id): Path<String>,
    Json(update): Json<SeasonStatusUpdate>,
) -> Response
where
    S: DockStore + 'static,
{
    respond(
        StatusCode::OK,
        service.set_season_status(&SeasonId(season_id), update.status),
    )
}

pub(crate) async fn submit_handler<S>(
    State(service): Service<S>,
    Path(season_id): Path<String>,
    Json(submission): Json<ApplicationSubmission>,
) -> Response
where
    S: DockStore + 'static,
{
    respond(
        StatusCode::CREATED,
        service.submit_application(&SeasonId(season_id), submission),
    )
}

pub(crate) async fn list_applications_handler<S>(
    State(service): Service<S>,
    Path(season_id): Path<String>,
) -> Response
where
    S: DockStore + 'static,
{
    respond(StatusCode::OK, service.applications(&SeasonId(season_id)))
}

pub(crate) async fn stats_handler<S>(
    State(service): Service<S>,
    Path(season_id): Path<String>,
) -> Response
where
    S: DockStore + 'static,
{
    respond(StatusCode::OK, service.stats(&SeasonId(season_id)))
}

pub(crate) async fn amend_handler<S>(
    State(service): Service<S>,
    Path(application_id): Path<String>,
    Json(patch): Json<ApplicationPatch>,
) -> Response
where
    S: DockStore + 'static,
{
    respond(
        StatusCode::OK,
        service.amend_application(&ApplicationId(application_id), patch),
    )
}

pub(crate) async fn application_status_handler<S>(
    State(service): Service<S>,
    Path(application_id): Path<String>,
    Json(update): Json<ApplicationStatusUpdate>,
) -> Response
where
    S: DockStore + 'static,
{
    respond(
        StatusCode::OK,
        service.set_status(&ApplicationId(application_id), update.status),
    )
}

pub(crate) async fn compute_plan_handler<S>(
    State(service): Service<S>,
    Path(season_id): Path<String>,
) -> Response
where
    S: DockStore + 'static,
{
    // The exact search can run for seconds.
    let season_id = SeasonId(season_id);
    match tokio::task::spawn_blocking(move || service.plan_season(&season_id)).await {
        Ok(result) => respond(StatusCode::OK, result),
        Err(err) => {
            error!(error = %err, "plan search task failed");
            let payload = json!({
                "error": "plan search did not finish",
            });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn plan_handler<S>(
    State(service): Service<S>,
    Path(season_id): Path<String>,
) -> Response
where
    S: DockStore + 'static,
{
    respond(StatusCode::OK, service.plan(&SeasonId(season_id)))
}

pub(crate) async fn slots_handler<S>(
    State(service): Service<S>,
    Path(season_id): Path<String>,
) -> Response
where
    S: DockStore + 'static,
{
    respond(StatusCode::OK, service.slot_map(&SeasonId(season_id)))
}

pub(crate) async fn start_bumping_handler<S>(
    State(service): Service<S>,
    Path(season_id): Path<String>,
) -> Response
where
    S: DockStore + 'static,
{
    respond(StatusCode::CREATED, service.start_bumping(&SeasonId(season_id)))
}

pub(crate) async fn bumping_handler<S>(
    State(service): Service<S>,
    Path(season_id): Path<String>,
) -> Response
where
    S: DockStore + 'static,
{
    respond(
        StatusCode::OK,
        service.bumping_overview(&SeasonId(season_id)),
    )
}

pub(crate) async fn selection_handler<S>(
    State(service): Service<S>,
    Path(season_id): Path<String>,
    Json(selection): Json<Selection>,
) -> Response
where
    S: DockStore + 'static,
{
    respond(
        StatusCode::OK,
        service.confirm_selection(&SeasonId(season_id), selection),
    )
}

pub(crate) async fn current_season_handler<S>(
    State(service): Service<S>,
    Query(query): Query<CurrentSeasonQuery>,
) -> Response
where
    S: DockStore + 'static,
{
    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());
    respond(StatusCode::OK, service.current_season(date))
}

fn respond<T>(status: StatusCode, result: Result<T, DockServiceError>) -> Response
where
    T: serde::Serialize,
{
    match result {
        Ok(body) => (status, Json(body)).into_response(),
        Err(error) => error.into_response(),
    }
}

impl IntoResponse for DockServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            DockServiceError::NotFound { .. }
            | DockServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
            DockServiceError::InvalidState(_)
            | DockServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
            DockServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            DockServiceError::Repository(RepositoryError::Unavailable(_)) => {
                error!(error = %self, "dock repository unavailable");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let payload = json!({
            "error": self.to_string(),
        });
        (status, Json(payload)).into_response()
    }
}
