//! Current-user handler.

use axum::extract::Json;

use crate::error::AppError;
use crate::middleware::Context;
use crate::models::UserResponse;

/// GET /me
pub async fn get_me(Context(ctx): Context) -> Result<Json<UserResponse>, AppError> {
    let user = ctx.current_user()?;
    Ok(Json(user.clone()))
}
