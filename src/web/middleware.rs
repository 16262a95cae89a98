use crate::state::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::info;

/// Guards `/admin`. No session sends the visitor to sign in; a session
/// without the admin role goes back to the storefront.
pub async fn require_admin(State(state): State<AppState>, jar: CookieJar, mut req: Request, next: Next) -> Response {
    let user = match state.sessions.authenticate(&jar, req.headers()) {
        Ok(user) => user,
        Err(e) => {
            info!("🔒 {} {}: {}", req.method(), req.uri().path(), e);
            return Redirect::to(&state.sign_in_url).into_response();
        }
    };
    if !user.is_admin() {
        info!("🚫 User {} is not an admin", user.id);
        return Redirect::to("/").into_response();
    }

    req.extensions_mut().insert(user);
    next.run(req).await
}
