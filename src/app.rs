use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post, put}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/sales", post(handlers::form_create))
        .route("/sales/:id/renew", post(handlers::form_renew))
        .route("/sales/:id/toggle", post(handlers::form_toggle))
        .route("/sales/:id/delete", post(handlers::form_delete))
        .route("/api/stats", get(handlers::get_stats))
        .route("/api/sales", get(handlers::list_sales).post(handlers::create_sale))
        .route("/api/sales/:id", put(handlers::edit_sale).delete(handlers::delete_sale))
        .route("/api/sales/:id/renew", post(handlers::renew_sale))
        .route("/api/sales/:id/toggle-status", post(handlers::toggle_sale))
        .route("/api/sales/:id/notify", get(handlers::notify_sale))
        .with_state(state)
}
