//! Authenticated user endpoint.

use axum::{Extension, Json};
use api_types::user::UserView;
use engine::User;

/// The account the request authenticated as, password stripped.
pub async fn whoami(Extension(user): Extension<User>) -> Json<UserView> {
    Json(UserView {
        id: user.id,
        username: user.username,
        name: user.name,
        role: user.role.as_str().to_string(),
    })
}
