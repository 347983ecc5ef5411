// src/api/handlers/scripts.rs
use actix_web::{HttpResponse, Result, web};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::api::AppState;
use crate::database::{self, NewScript};
use crate::models::ScriptSource;
use crate::scripting;

#[derive(Deserialize)]
pub struct UploadScriptRequest {
    pub user_id: i64,
    /// Already-extracted text; file-format parsing happens upstream.
    pub content: String,
    pub title: Option<String>,
}

#[derive(Deserialize)]
pub struct GenerateScriptRequest {
    pub user_id: i64,
    #[serde(alias = "prompt")]
    pub topic: String,
}

#[derive(Deserialize)]
pub struct SaveScriptRequest {
    pub user_id: i64,
    pub content: String,
    pub title: Option<String>,
}

#[derive(Deserialize)]
pub struct EditScriptRequest {
    pub script_id: i64,
    pub user_id: Option<i64>,
    pub instruction: String,
}

#[derive(Deserialize)]
pub struct FinalizeScriptRequest {
    pub script_id: i64,
    pub user_id: Option<i64>,
}

#[derive(Serialize)]
pub struct ScriptResponse {
    pub script_id: i64,
    pub content: String,
}

pub async fn upload_script(
    state: web::Data<AppState>,
    req: web::Json<UploadScriptRequest>,
) -> Result<HttpResponse> {
    let req = req.into_inner();

    if req.content.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({"error": "content is required"})));
    }

    // Structure the raw text; fall back to storing it unchanged if the model fails
    let structured = match scripting::structure_script(&state.gateway, &req.content).await {
        Ok(text) => text,
        Err(e) => {
            log::warn!("structure_script failed, storing raw text: {}", e);
            req.content.clone()
        }
    };

    let new_script = NewScript {
        user_id: req.user_id,
        content: &structured,
        original_content: Some(&req.content),
        source: ScriptSource::Uploaded,
        title: req.title.as_deref(),
    };

    match database::save_script(&state.db_pool, &new_script).await {
        Ok(script_id) => Ok(HttpResponse::Ok().json(ScriptResponse {
            script_id,
            content: structured,
        })),
        Err(e) => {
            log::error!("Failed to save uploaded script: {}", e);
            Ok(HttpResponse::InternalServerError().json(json!({"error": "failed to save script"})))
        }
    }
}

pub async fn generate(
    state: web::Data<AppState>,
    req: web::Json<GenerateScriptRequest>,
) -> Result<HttpResponse> {
    let req = req.into_inner();

    if req.topic.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({"error": "topic is required"})));
    }

    let script_text = match scripting::generate_script(&state.gateway, &req.topic).await {
        Ok(text) => text,
        Err(e) => {
            log::error!("generate_script failed: {}", e);
            return Ok(HttpResponse::InternalServerError()
                .json(json!({"error": "LLM failed", "details": e.to_string()})));
        }
    };

    let new_script = NewScript {
        user_id: req.user_id,
        content: &script_text,
        original_content: None,
        source: ScriptSource::Generated,
        title: None,
    };

    match database::save_script(&state.db_pool, &new_script).await {
        Ok(script_id) => Ok(HttpResponse::Ok().json(ScriptResponse {
            script_id,
            content: script_text,
        })),
        Err(e) => {
            log::error!("Failed to save generated script: {}", e);
            Ok(HttpResponse::InternalServerError().json(json!({"error": "failed to save script"})))
        }
    }
}

pub async fn save_manual(
    state: web::Data<AppState>,
    req: web::Json<SaveScriptRequest>,
) -> Result<HttpResponse> {
    let req = req.into_inner();

    if req.content.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({"error": "content is required"})));
    }

    let new_script = NewScript {
        user_id: req.user_id,
        content: &req.content,
        original_content: None,
        source: ScriptSource::Manual,
        title: req.title.as_deref(),
    };

    match database::save_script(&state.db_pool, &new_script).await {
        Ok(script_id) => Ok(HttpResponse::Ok().json(ScriptResponse {
            script_id,
            content: req.content,
        })),
        Err(e) => {
            log::error!("Failed to save script: {}", e);
            Ok(HttpResponse::InternalServerError().json(json!({"error": "failed to save script"})))
        }
    }
}

pub async fn edit(
    state: web::Data<AppState>,
    req: web::Json<EditScriptRequest>,
) -> Result<HttpResponse> {
    let req = req.into_inner();

    let script = match database::get_script(&state.db_pool, req.script_id, req.user_id).await {
        Ok(Some(script)) => script,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(json!({"error": "Script not found"})));
        }
        Err(e) => {
            log::error!("Failed to load script {}: {}", req.script_id, e);
            return Ok(
                HttpResponse::InternalServerError().json(json!({"error": "failed to load script"}))
            );
        }
    };

    let updated =
        match scripting::edit_script(&state.gateway, &script.content, &req.instruction).await {
            Ok(text) => text,
            Err(e) => {
                log::error!("edit_script failed: {}", e);
                return Ok(HttpResponse::InternalServerError()
                    .json(json!({"error": "LLM failed", "details": e.to_string()})));
            }
        };

    match database::update_script_content(&state.db_pool, script.id, &updated).await {
        Ok(_) => Ok(HttpResponse::Ok().json(ScriptResponse {
            script_id: script.id,
            content: updated,
        })),
        Err(e) => {
            log::error!("Failed to update script {}: {}", script.id, e);
            Ok(HttpResponse::InternalServerError().json(json!({"error": "failed to save script"})))
        }
    }
}

pub async fn finalize(
    state: web::Data<AppState>,
    req: web::Json<FinalizeScriptRequest>,
) -> Result<HttpResponse> {
    let req = req.into_inner();

    let script = match database::get_script(&state.db_pool, req.script_id, req.user_id).await {
        Ok(Some(script)) => script,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(json!({"error": "Script not found"})));
        }
        Err(e) => {
            log::error!("Failed to load script {}: {}", req.script_id, e);
            return Ok(
                HttpResponse::InternalServerError().json(json!({"error": "failed to load script"}))
            );
        }
    };

    match database::finalize_script(&state.db_pool, script.id).await {
        Ok(_) => Ok(HttpResponse::Ok().json(json!({"status": "finalized"}))),
        Err(e) => {
            log::error!("Failed to finalize script {}: {}", script.id, e);
            Ok(HttpResponse::InternalServerError()
                .json(json!({"error": "failed to finalize script"})))
        }
    }
}
