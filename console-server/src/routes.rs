use axum::{extract::State, http::StatusCode, routing::get, routing::post, Json, Router};
use console_core::incidents::Incident;
use console_core::intake::{ClassificationRequest, DraftFields, IntakeController, IntakePhase};
use console_core::roles::{default_view, reachable_views, resolve_view, Operator, Role, View};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct AppState {
    pub intake: Arc<Mutex<IntakeController>>,
    pub classify_tx: std::sync::mpsc::Sender<ClassificationRequest>,
    pub store_tx: std::sync::mpsc::Sender<Incident>,
}

pub fn console_router(state: AppState) -> Router {
    Router::new()
        .route("/navigate", post(handle_navigate))
        .route("/intake", get(handle_intake_snapshot))
        .route("/intake/narrative", post(handle_narrative))
        .route("/intake/fields", post(handle_fields))
        .route("/intake/classify", post(handle_classify))
        .route("/intake/submit", post(handle_submit))
        .with_state(state)
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NavigationDto {
    pub view: String,
    pub default: String,
    pub reachable: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IntakeSnapshotDto {
    pub phase: IntakePhase,
    pub narrative_length: usize,
    pub can_classify: bool,
    pub can_submit: bool,
    pub can_confirm: bool,
    pub classification: Option<serde_json::Value>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SubmitRequest {
    pub operator: Operator,
    #[serde(default)]
    pub confirm: bool,
}

/// Navigation resolution for a session role. An unknown or unreachable
/// view identifier resolves to the role's default view; this is a
/// redirect, never an error response.
pub fn resolve_navigation(role: Role, requested: Option<&str>) -> NavigationDto {
    let resolved = match requested.and_then(View::from_identifier) {
        Some(view) => resolve_view(role, view),
        None => default_view(role),
    };

    NavigationDto {
        view: resolved.identifier().to_string(),
        default: default_view(role).identifier().to_string(),
        reachable: reachable_views(role)
            .iter()
            .map(|view| view.identifier().to_string())
            .collect(),
    }
}

pub fn snapshot(intake: &IntakeController) -> IntakeSnapshotDto {
    IntakeSnapshotDto {
        phase: intake.phase(),
        narrative_length: intake.narrative().chars().count(),
        can_classify: intake.can_classify(),
        can_submit: intake.can_submit(),
        can_confirm: intake.can_confirm(),
        classification: intake
            .classification()
            .and_then(|c| serde_json::to_value(c).ok()),
    }
}

async fn handle_navigate(
    Json(payload): Json<serde_json::Value>,
) -> Result<Json<NavigationDto>, StatusCode> {
    let Some(role) = payload
        .get("role")
        .and_then(|v| serde_json::from_value::<Role>(v.clone()).ok())
    else {
        return Err(StatusCode::BAD_REQUEST);
    };
    let requested = payload.get("view").and_then(serde_json::Value::as_str);
    Ok(Json(resolve_navigation(role, requested)))
}

async fn handle_intake_snapshot(
    State(state): State<AppState>,
) -> Result<Json<IntakeSnapshotDto>, StatusCode> {
    let intake = state
        .intake
        .lock()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(snapshot(&intake)))
}

async fn handle_narrative(
    State(state): State<AppState>,
    Json(payload): Json<serde_json::Value>,
) -> StatusCode {
    let Some(text) = payload.get("text").and_then(serde_json::Value::as_str) else {
        return StatusCode::BAD_REQUEST;
    };
    let Ok(mut intake) = state.intake.lock() else {
        return StatusCode::INTERNAL_SERVER_ERROR;
    };
    intake.set_narrative(text);
    StatusCode::OK
}

async fn handle_fields(
    State(state): State<AppState>,
    Json(fields): Json<DraftFields>,
) -> StatusCode {
    let Ok(mut intake) = state.intake.lock() else {
        return StatusCode::INTERNAL_SERVER_ERROR;
    };
    intake.set_fields(fields);
    StatusCode::OK
}

async fn handle_classify(State(state): State<AppState>) -> StatusCode {
    let request = {
        let Ok(mut intake) = state.intake.lock() else {
            return StatusCode::INTERNAL_SERVER_ERROR;
        };
        intake.begin_classification()
    };

    // Suppressed trigger (gate closed or a request already in flight).
    let Some(request) = request else {
        return StatusCode::CONFLICT;
    };

    match state.classify_tx.send(request) {
        Ok(_) => StatusCode::ACCEPTED,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

async fn handle_submit(
    State(state): State<AppState>,
    Json(payload): Json<SubmitRequest>,
) -> Result<Json<Incident>, StatusCode> {
    let incident = {
        let Ok(mut intake) = state.intake.lock() else {
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        };
        if payload.confirm {
            intake.confirm_dispatch(&payload.operator)
        } else {
            intake.submit_manual(&payload.operator)
        }
    };

    let Some(incident) = incident else {
        return Err(StatusCode::CONFLICT);
    };

    // Fire-and-forget to the store collaborator; durability is its problem.
    let _ = state.store_tx.send(incident.clone());
    spawn_acknowledgment_timer(state.intake.clone());

    Ok(Json(incident))
}

/// The submit trigger stays disabled for the whole window: the controller
/// reports `can_submit == false` until `acknowledge` fires here.
fn spawn_acknowledgment_timer(intake: Arc<Mutex<IntakeController>>) {
    std::thread::spawn(move || {
        std::thread::sleep(console_core::intake::ACK_WINDOW);
        if let Ok(mut intake) = intake.lock() {
            intake.acknowledge();
        }
    });
}
