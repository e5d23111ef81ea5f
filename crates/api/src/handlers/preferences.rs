//! Handlers for `/users/preferences`.

use axum::extract::State;
use axum::Json;
use gatehouse_core::preferences::{OptionGroup, SettingGroup};
use serde::Serialize;
use serde_json::Value;

use crate::error::AppResult;
use crate::extract::ApiJson;
use crate::middleware::session::RequestIdentity;
use crate::state::AppState;

/// The caller's settings with defaults merged in, plus the schema so a
/// client can render a form.
#[derive(Debug, Serialize)]
pub struct PreferencesResponse {
    pub settings: SettingGroup,
    pub options: OptionGroup,
}

/// GET /users/preferences
pub async fn get_preferences(
    State(state): State<AppState>,
    identity: RequestIdentity,
) -> AppResult<Json<PreferencesResponse>> {
    preferences_of(&state, &identity).await.map(Json)
}

/// POST /users/preferences
///
/// Replaces the stored tree with the submitted one after checking its shape
/// and the declared option types.
pub async fn set_preferences(
    State(state): State<AppState>,
    identity: RequestIdentity,
    ApiJson(body): ApiJson<Value>,
) -> AppResult<Json<PreferencesResponse>> {
    let settings = SettingGroup::from_submitted(&body)?;
    state.preferences.schema().validate(&settings)?;
    state
        .preferences
        .set_preferences(identity.user_id, &settings)
        .await?;
    preferences_of(&state, &identity).await.map(Json)
}

async fn preferences_of(
    state: &AppState,
    identity: &RequestIdentity,
) -> AppResult<PreferencesResponse> {
    let settings = state.preferences.get_preferences(identity.user_id).await?;
    Ok(PreferencesResponse {
        settings,
        options: state.preferences.schema().clone(),
    })
}
