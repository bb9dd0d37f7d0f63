use actix_web::{HttpResponse, web};
use futures::StreamExt;

use blogify_core::ports::Table;

use super::sse;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// Relay raw change events for one table.
///
/// GET /api/realtime/{table}
pub async fn stream(state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let table: Table = path.parse()?;
    let subscription = state.feed.subscribe(table).await?;
    tracing::debug!(table = %table, "Realtime client connected");

    Ok(sse::respond(subscription.map(|event| sse::frame("change", &event))))
}
