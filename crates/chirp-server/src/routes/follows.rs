use axum::extract::{Path, State};
use axum::http::StatusCode;

use chirp_core::AccountStore;

use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::state::AppState;

pub async fn follow<A: AccountStore>(
    State(state): State<AppState<A>>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let actor = state.accounts.resolve_actor(&user.account_id).await?;
    state.accounts.follow(&actor, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn unfollow<A: AccountStore>(
    State(state): State<AppState<A>>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let actor = state.accounts.resolve_actor(&user.account_id).await?;
    state.accounts.unfollow(&actor, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
