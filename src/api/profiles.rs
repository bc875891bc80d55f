use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use super::AppState;
use crate::db::ProfileRecord;
use crate::error::AppError;

pub async fn list_profiles(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let profiles = state.repo.list_profiles().await?;
    Ok(Json(serde_json::json!({ "profiles": profiles })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileBody {
    pub name: String,
    #[serde(default = "default_avatar_color")]
    pub avatar_color: String,
}

fn default_avatar_color() -> String {
    "#64748b".to_string()
}

pub async fn upsert_profile(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(body): Json<ProfileBody>,
) -> Result<Json<ProfileRecord>, AppError> {
    let id = id.trim().to_string();
    if id.is_empty() {
        return Err(AppError::BadRequest("profile id must not be empty".to_string()));
    }
    let name = body.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::BadRequest("profile name must not be empty".to_string()));
    }
    let record = ProfileRecord {
        id,
        name,
        avatar_color: body.avatar_color,
    };
    state.repo.save_profile(&record).await?;
    Ok(Json(record))
}

/// Remove a profile along with its stored portfolio document.
pub async fn delete_profile(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !state.repo.delete_profile(&id).await? {
        return Err(AppError::NotFound(format!("profile {}", id)));
    }
    Ok(Json(serde_json::json!({ "deleted": id })))
}
