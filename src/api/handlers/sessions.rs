// src/api/handlers/sessions.rs
use actix_web::{HttpResponse, Result, web};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::api::AppState;
use crate::models::{PitchStats, SessionRecord, VisionScores};
use crate::{comparison, database, feedback};

#[derive(Deserialize)]
pub struct EvaluateSessionRequest {
    pub user_id: i64,
    pub transcript: String,
    #[serde(default)]
    pub pitch: PitchStats,
    #[serde(default)]
    pub vision: VisionScores,
    /// Reference script to compare the delivery against, if one was prepared.
    pub script_id: Option<i64>,
    pub video_url: Option<String>,
}

#[derive(Deserialize)]
pub struct HistoryQuery {
    pub user_id: i64,
}

#[derive(Serialize)]
pub struct HistoryResponse {
    pub results: Vec<SessionRecord>,
}

pub async fn evaluate_session(
    state: web::Data<AppState>,
    req: web::Json<EvaluateSessionRequest>,
) -> Result<HttpResponse> {
    let req = req.into_inner();

    let reference = match req.script_id {
        Some(script_id) => {
            match database::get_script(&state.db_pool, script_id, Some(req.user_id)).await {
                Ok(Some(script)) => Some(script),
                Ok(None) => {
                    return Ok(
                        HttpResponse::NotFound().json(json!({"error": "Script not found"}))
                    );
                }
                Err(e) => {
                    log::error!("Failed to load script {}: {}", script_id, e);
                    return Ok(HttpResponse::InternalServerError()
                        .json(json!({"error": "failed to load script"})));
                }
            }
        }
        None => None,
    };

    // Both analyses resolve to structured objects even on LLM failure, so the
    // join never fails the request
    let (feedback, comparison) = match &reference {
        Some(script) => {
            let (feedback, comparison) = futures::future::join(
                feedback::evaluate_content(&state.gateway, &req.transcript, &req.pitch, &req.vision),
                comparison::compare_script(&state.gateway, &script.content, &req.transcript),
            )
            .await;
            (feedback, Some(comparison))
        }
        None => (
            feedback::evaluate_content(&state.gateway, &req.transcript, &req.pitch, &req.vision)
                .await,
            None,
        ),
    };

    let speech_score = content_score_mean(&feedback);
    let overall_score =
        (req.vision.eye + req.vision.posture + req.vision.gesture + speech_score) / 4.0;

    let session = SessionRecord {
        id: Uuid::new_v4().to_string(),
        user_id: req.user_id,
        gesture_score: req.vision.gesture,
        posture_score: req.vision.posture,
        eye_score: req.vision.eye,
        speech_score,
        overall_score,
        transcript: Some(req.transcript),
        reference_script_id: reference.as_ref().map(|s| s.id),
        analysis: Some(json!({
            "feedback": feedback,
            "comparison": comparison,
        })),
        video_url: req.video_url,
        created_at: chrono::Utc::now().to_rfc3339(),
    };

    if let Err(e) = database::save_session(&state.db_pool, &session).await {
        log::error!("Failed to save session {}: {}", session.id, e);
        return Ok(
            HttpResponse::InternalServerError().json(json!({"error": "failed to save session"}))
        );
    }

    Ok(HttpResponse::Ok().json(json!({
        "session_id": session.id,
        "scores": {
            "gesture": session.gesture_score,
            "posture": session.posture_score,
            "eye": session.eye_score,
            "speech": session.speech_score,
            "overall": session.overall_score,
        },
        "feedback": feedback,
        "comparison": comparison,
    })))
}

pub async fn get_history(
    state: web::Data<AppState>,
    query: web::Query<HistoryQuery>,
) -> Result<HttpResponse> {
    match database::get_sessions(&state.db_pool, query.user_id).await {
        Ok(results) => Ok(HttpResponse::Ok().json(HistoryResponse { results })),
        Err(e) => {
            log::error!("Failed to fetch session history: {}", e);
            Ok(HttpResponse::InternalServerError()
                .json(json!({"error": "Failed to load history from database."})))
        }
    }
}

/// Mean of the three content scores; analysis fallbacks count as zero.
fn content_score_mean(feedback: &Value) -> f64 {
    let keys = ["clarity_score", "engagement_score", "structure_score"];
    let sum: f64 = keys
        .iter()
        .map(|k| feedback.get(k).and_then(Value::as_f64).unwrap_or(0.0))
        .sum();
    sum / keys.len() as f64
}
