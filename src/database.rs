// src/database.rs
use std::path::PathBuf;

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool, sqlite::SqlitePoolOptions};

use crate::models::{ScriptRecord, ScriptSource, SessionRecord};

/// A script about to be persisted.
pub struct NewScript<'a> {
    pub user_id: i64,
    pub content: &'a str,
    pub original_content: Option<&'a str>,
    pub source: ScriptSource,
    pub title: Option<&'a str>,
}

/// Connects to the sqlite database named by `database_url` and creates the
/// schema if it does not exist yet.
///
/// In-memory URLs are honored for tests; a single connection keeps them from
/// silently getting a fresh database per pool connection.
pub async fn init_db(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let pool = if database_url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect(database_url)
            .await?
    } else {
        let db_path = parse_db_path(database_url)?;

        // Create the parent directory BEFORE attempting to connect
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(sqlx::Error::Io)?;
            }
        }

        let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
        log::info!("📦 Connecting to: {}", db_url);

        SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&db_url)
            .await?
    };

    create_schema(&pool).await?;

    Ok(pool)
}

fn parse_db_path(database_url: &str) -> Result<PathBuf, sqlx::Error> {
    let path = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))
        .ok_or_else(|| {
            sqlx::Error::Configuration("DATABASE_URL must start with 'sqlite:'".into())
        })?;
    Ok(PathBuf::from(path))
}

async fn create_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS scripts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            content TEXT NOT NULL,
            original_content TEXT,
            source TEXT NOT NULL,
            is_final INTEGER NOT NULL DEFAULT 0,
            title TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            id TEXT PRIMARY KEY,
            user_id INTEGER NOT NULL,
            gesture_score REAL NOT NULL,
            posture_score REAL NOT NULL,
            eye_score REAL NOT NULL,
            speech_score REAL NOT NULL,
            overall_score REAL NOT NULL,
            transcript TEXT,
            reference_script_id INTEGER,
            analysis_json TEXT,
            video_url TEXT,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Inserts a script and returns its row id.
pub async fn save_script(pool: &SqlitePool, script: &NewScript<'_>) -> Result<i64, sqlx::Error> {
    let created_at = chrono::Utc::now().to_rfc3339();

    let result = sqlx::query(
        r#"
        INSERT INTO scripts (user_id, content, original_content, source, is_final, title, created_at)
        VALUES (?, ?, ?, ?, 0, ?, ?)
        "#,
    )
    .bind(script.user_id)
    .bind(script.content)
    .bind(script.original_content)
    .bind(script.source.to_string())
    .bind(script.title)
    .bind(&created_at)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Fetches a script by id, optionally scoped to a user.
pub async fn get_script(
    pool: &SqlitePool,
    id: i64,
    user_id: Option<i64>,
) -> Result<Option<ScriptRecord>, sqlx::Error> {
    const COLUMNS: &str =
        "id, user_id, content, original_content, source, is_final, title, created_at, updated_at";

    let row = match user_id {
        Some(uid) => {
            sqlx::query(&format!(
                "SELECT {COLUMNS} FROM scripts WHERE id = ? AND user_id = ?"
            ))
            .bind(id)
            .bind(uid)
            .fetch_optional(pool)
            .await?
        }
        None => {
            sqlx::query(&format!("SELECT {COLUMNS} FROM scripts WHERE id = ?"))
                .bind(id)
                .fetch_optional(pool)
                .await?
        }
    };

    Ok(row.map(row_to_script))
}

/// Replaces a script's content, stamping `updated_at`.
pub async fn update_script_content(
    pool: &SqlitePool,
    id: i64,
    content: &str,
) -> Result<bool, sqlx::Error> {
    let updated_at = chrono::Utc::now().to_rfc3339();

    let result = sqlx::query("UPDATE scripts SET content = ?, updated_at = ? WHERE id = ?")
        .bind(content)
        .bind(&updated_at)
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Marks a script as final.
pub async fn finalize_script(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let updated_at = chrono::Utc::now().to_rfc3339();

    let result = sqlx::query("UPDATE scripts SET is_final = 1, updated_at = ? WHERE id = ?")
        .bind(&updated_at)
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Inserts an evaluation session.
pub async fn save_session(pool: &SqlitePool, session: &SessionRecord) -> Result<(), sqlx::Error> {
    let analysis_json = session.analysis.as_ref().map(|v| v.to_string());

    sqlx::query(
        r#"
        INSERT INTO sessions (id, user_id, gesture_score, posture_score, eye_score, speech_score,
                              overall_score, transcript, reference_script_id, analysis_json,
                              video_url, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&session.id)
    .bind(session.user_id)
    .bind(session.gesture_score)
    .bind(session.posture_score)
    .bind(session.eye_score)
    .bind(session.speech_score)
    .bind(session.overall_score)
    .bind(&session.transcript)
    .bind(session.reference_script_id)
    .bind(&analysis_json)
    .bind(&session.video_url)
    .bind(&session.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Lists a user's sessions, newest first.
pub async fn get_sessions(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<Vec<SessionRecord>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT id, user_id, gesture_score, posture_score, eye_score, speech_score,
               overall_score, transcript, reference_script_id, analysis_json, video_url, created_at
        FROM sessions
        WHERE user_id = ?
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(row_to_session).collect())
}

fn row_to_script(row: SqliteRow) -> ScriptRecord {
    ScriptRecord {
        id: row.get(0),
        user_id: row.get(1),
        content: row.get(2),
        original_content: row.get(3),
        source: row.get(4),
        is_final: row.get(5),
        title: row.get(6),
        created_at: row.get(7),
        updated_at: row.get(8),
    }
}

fn row_to_session(row: SqliteRow) -> SessionRecord {
    let analysis_json: Option<String> = row.get(9);

    SessionRecord {
        id: row.get(0),
        user_id: row.get(1),
        gesture_score: row.get(2),
        posture_score: row.get(3),
        eye_score: row.get(4),
        speech_score: row.get(5),
        overall_score: row.get(6),
        transcript: row.get(7),
        reference_script_id: row.get(8),
        analysis: analysis_json.and_then(|s| serde_json::from_str(&s).ok()),
        video_url: row.get(10),
        created_at: row.get(11),
    }
}
