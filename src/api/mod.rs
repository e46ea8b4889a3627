mod auth;
mod cache;
mod email;
mod institutions;
mod notifications;

use axum::{middleware, Router};

use crate::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    // Cache proxying and institution management sit behind the auth gate;
    // login/verify and the notification/email endpoints handle their own
    // caller context.
    let protected = Router::new()
        .nest("/cache", cache::routes())
        .nest("/institutions", institutions::routes())
        .route_layer(middleware::from_fn_with_state(
            state,
            crate::middleware::require_admin,
        ));

    Router::new()
        .nest("/auth", auth::routes())
        .nest("/email", email::routes())
        .nest("/notifications", notifications::routes())
        .merge(protected)
}
