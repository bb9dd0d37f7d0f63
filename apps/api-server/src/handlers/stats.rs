use actix_web::{HttpResponse, web};
use futures::StreamExt;
use futures::stream;

use blogify_core::ports::Table;
use blogify_core::services::HomeFeed;

use super::{sse, views};
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// Homepage counters. Never fails: a broken count reads as zero.
///
/// GET /api/stats
pub async fn stats(state: web::Data<AppState>) -> HttpResponse {
    let stats = state.catalog().stats().await;
    HttpResponse::Ok().json(views::stats(stats))
}

/// The home feed now and after every change to `blogs` or `profiles`.
///
/// GET /api/stats/stream
pub async fn stream(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let blogs = state.feed.subscribe(Table::Blogs).await?;
    let profiles = state.feed.subscribe(Table::Profiles).await?;

    let catalog = state.catalog();
    let mut home = HomeFeed::new();
    home.reload(&catalog).await;
    let first = sse::frame("home", &views::home(&home));

    let updates = stream::unfold(
        (home, catalog, blogs, profiles),
        |(mut home, catalog, mut blogs, mut profiles)| async move {
            if !home.follow(&catalog, &mut blogs, &mut profiles).await {
                return None;
            }
            let frame = sse::frame("home", &views::home(&home));
            Some((frame, (home, catalog, blogs, profiles)))
        },
    );

    Ok(sse::respond(stream::once(async move { first }).chain(updates)))
}
