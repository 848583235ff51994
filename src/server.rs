use axum::{Json, Router, http::StatusCode, routing::post};
use log::info;
use serde::Deserialize;
use std::net::SocketAddr;

use crate::data::{Allocation, Assignment, Classroom, Student};
use crate::plan::{SeatingPlan, Snapshot, plan};
use crate::report::{PrintLayout, layout_for_print};
use crate::solver::{self, AllocatorOptions, InvalidRoomPolicy};
use crate::strategy::Strategy;
use crate::validate::{ValidationReport, validate};

type ApiResult<T> = Result<Json<T>, (StatusCode, String)>;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocateRequest {
    pub classrooms: Vec<Classroom>,
    pub students: Vec<Student>,
    #[serde(default)]
    pub strategy: Strategy,
    #[serde(default)]
    pub invalid_room_policy: InvalidRoomPolicy,
}

impl AllocateRequest {
    fn options(&self) -> AllocatorOptions {
        AllocatorOptions::default()
            .with_strategy(self.strategy)
            .with_invalid_room_policy(self.invalid_room_policy)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateRequest {
    pub allocation: Allocation,
    pub students: Vec<Student>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutRequest {
    pub classroom: Classroom,
    pub assignments: Vec<Assignment>,
}

async fn allocate_handler(Json(request): Json<AllocateRequest>) -> ApiResult<Allocation> {
    match solver::allocate_with(&request.classrooms, &request.students, &request.options()) {
        Ok(allocation) => Ok(Json(allocation)),
        Err(e) => Err((StatusCode::BAD_REQUEST, e.to_string())),
    }
}

async fn validate_handler(Json(request): Json<ValidateRequest>) -> Json<ValidationReport> {
    Json(validate(&request.allocation, &request.students))
}

async fn layout_handler(Json(request): Json<LayoutRequest>) -> ApiResult<PrintLayout> {
    match layout_for_print(&request.classroom, &request.assignments) {
        Ok(layout) => Ok(Json(layout)),
        Err(e) => Err((StatusCode::BAD_REQUEST, e.to_string())),
    }
}

async fn plan_handler(Json(request): Json<AllocateRequest>) -> ApiResult<SeatingPlan> {
    let options = request.options();
    let snapshot = Snapshot {
        classrooms: request.classrooms,
        students: request.students,
    };
    match plan(&snapshot, &options) {
        Ok(plan) => Ok(Json(plan)),
        Err(e) => Err((StatusCode::BAD_REQUEST, e.to_string())),
    }
}

pub fn router() -> Router {
    Router::new()
        .route("/v1/seating/allocate", post(allocate_handler))
        .route("/v1/seating/validate", post(validate_handler))
        .route("/v1/seating/layout", post(layout_handler))
        .route("/v1/seating/plan", post(plan_handler))
}

pub async fn run_server(bind: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;

    info!("Server running at http://{}", listener.local_addr()?);

    axum::serve(listener, router()).await
}
