use crate::{
    error::AppResult,
    models::Business,
    session::{require_token, require_user},
    state::AppState,
};

/// Businesses owned by the signed-in user.
pub async fn list_owned_businesses(state: &AppState) -> AppResult<Vec<Business>> {
    require_token(state.session.as_ref()).await?;
    let user = require_user(state.session.as_ref()).await?;

    let businesses = state.api.get_businesses_by_user(user.id).await?;
    tracing::debug!(user_id = %user.id, count = businesses.len(), "owned businesses loaded");
    Ok(businesses)
}
