// src/models.rs
use serde::{Deserialize, Serialize};

/// Pitch statistics extracted from a delivery recording, in Hz.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PitchStats {
    #[serde(default)]
    pub avg: f64,
    #[serde(default)]
    pub min: f64,
    #[serde(default)]
    pub max: f64,
}

/// Vision-derived delivery scores on a 0-100 scale.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct VisionScores {
    #[serde(default)]
    pub eye: f64,
    #[serde(default)]
    pub posture: f64,
    #[serde(default)]
    pub gesture: f64,
}

/// Where a stored script came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptSource {
    Generated,
    Uploaded,
    Manual,
}

impl std::fmt::Display for ScriptSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScriptSource::Generated => write!(f, "generated"),
            ScriptSource::Uploaded => write!(f, "uploaded"),
            ScriptSource::Manual => write!(f, "manual"),
        }
    }
}

/// A persisted presentation script.
#[derive(Debug, Clone, Serialize)]
pub struct ScriptRecord {
    pub id: i64,
    pub user_id: i64,
    pub content: String,
    pub original_content: Option<String>,
    pub source: String,
    pub is_final: bool,
    pub title: Option<String>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

/// A persisted delivery-evaluation session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionRecord {
    pub id: String,
    pub user_id: i64,
    pub gesture_score: f64,
    pub posture_score: f64,
    pub eye_score: f64,
    pub speech_score: f64,
    pub overall_score: f64,
    pub transcript: Option<String>,
    pub reference_script_id: Option<i64>,
    pub analysis: Option<serde_json::Value>,
    pub video_url: Option<String>,
    pub created_at: String,
}
