use crate::book::{BookError, SalesBook};
use crate::errors::AppError;
use crate::models::{DashboardStats, NotifyResponse, Sale, SaleInput, SaleRow};
use crate::notify::notification_link;
use crate::state::AppState;
use crate::stats::build_stats_at;
use crate::storage::persist_data;
use crate::ui::render_index;
use axum::{
    extract::{Path, Query, State},
    response::{Html, Redirect},
    Form, Json,
};
use chrono::NaiveDateTime;
use serde::Deserialize;
use tracing::{error, info, warn};

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Html<String>, AppError> {
    let now = state.now();
    let book = state.book.lock().await;
    let stats = build_stats_at(now, book.sales());
    let rows = book.rows(&query.q, now);
    let page = render_index(&query.q, &stats, &rows).map_err(|err| {
        error!("failed to render dashboard: {err}");
        AppError::internal(err)
    })?;
    Ok(Html(page))
}

pub async fn get_stats(State(state): State<AppState>) -> Result<Json<DashboardStats>, AppError> {
    let now = state.now();
    let book = state.book.lock().await;
    Ok(Json(build_stats_at(now, book.sales())))
}

pub async fn list_sales(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<SaleRow>>, AppError> {
    let now = state.now();
    let book = state.book.lock().await;
    Ok(Json(book.rows(&query.q, now)))
}

pub async fn create_sale(
    State(state): State<AppState>,
    Json(input): Json<SaleInput>,
) -> Result<Json<Sale>, AppError> {
    let sale = apply(&state, "create", |book, now| Ok(book.create(input, now).clone())).await?;
    Ok(Json(sale))
}

pub async fn edit_sale(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<SaleInput>,
) -> Result<Json<Sale>, AppError> {
    let sale = apply(&state, "edit", |book, now| book.edit(&id, input, now).cloned()).await?;
    Ok(Json(sale))
}

pub async fn delete_sale(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Sale>, AppError> {
    let sale = apply(&state, "delete", |book, _| book.delete(&id)).await?;
    Ok(Json(sale))
}

pub async fn renew_sale(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Sale>, AppError> {
    let sale = apply(&state, "renew", |book, now| book.renew(&id, now).cloned()).await?;
    Ok(Json(sale))
}

pub async fn toggle_sale(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Sale>, AppError> {
    let sale = apply(&state, "toggle-status", |book, _| book.toggle_status(&id).cloned()).await?;
    Ok(Json(sale))
}

pub async fn notify_sale(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<NotifyResponse>, AppError> {
    let now = state.now();
    let book = state.book.lock().await;
    let sale = book.get(&id).ok_or_else(|| BookError::NotFound(id.clone()))?;
    Ok(Json(NotifyResponse {
        link: notification_link(sale, now),
    }))
}

pub async fn form_create(State(state): State<AppState>, Form(input): Form<SaleInput>) -> Result<Redirect, AppError> {
    let missing = |field: &Option<String>| field.as_deref().is_none_or(|v| v.trim().is_empty());
    if missing(&input.client_name) || missing(&input.username) || missing(&input.contact) {
        return Err(AppError::bad_request("client name, login and WhatsApp are required"));
    }

    apply(&state, "create", |book, now| Ok(book.create(input, now).clone())).await?;
    Ok(Redirect::to("/"))
}

pub async fn form_renew(State(state): State<AppState>, Path(id): Path<String>) -> Result<Redirect, AppError> {
    apply(&state, "renew", |book, now| book.renew(&id, now).cloned()).await?;
    Ok(Redirect::to("/"))
}

pub async fn form_toggle(State(state): State<AppState>, Path(id): Path<String>) -> Result<Redirect, AppError> {
    apply(&state, "toggle-status", |book, _| book.toggle_status(&id).cloned()).await?;
    Ok(Redirect::to("/"))
}

pub async fn form_delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<Redirect, AppError> {
    apply(&state, "delete", |book, _| book.delete(&id)).await?;
    Ok(Redirect::to("/"))
}

/// Runs one mutation on a copy of the collection under the lock. The copy
/// replaces the live collection only once the whole file has been rewritten.
async fn apply<F>(state: &AppState, action: &str, op: F) -> Result<Sale, AppError>
where
    F: FnOnce(&mut SalesBook, NaiveDateTime) -> Result<Sale, BookError>,
{
    let now = state.now();
    let mut book = state.book.lock().await;
    let mut next = book.clone();
    let sale = op(&mut next, now).map_err(|err| {
        warn!("{action} rejected: {err}");
        AppError::from(err)
    })?;

    if let Err(err) = persist_data(&state.data_path, &next).await {
        error!(sale_id = %sale.id, "{action} not saved: {}", err.message);
        return Err(err);
    }
    *book = next;
    info!(sale_id = %sale.id, sales = book.len(), "{action} applied");

    Ok(sale)
}
