//! Public blog routes.

use actix_web::{HttpResponse, web};
use futures::StreamExt;
use futures::stream;
use uuid::Uuid;

use blogify_core::ports::Table;
use blogify_core::services::{BlogListing, LATEST_LIMIT, SortKey};
use blogify_shared::dto::ListingQuery;

use super::{sse, views};
use crate::middleware::error::AppResult;
use crate::state::AppState;

fn apply_view(listing: &mut BlogListing, query: &ListingQuery) -> AppResult<()> {
    // Search and sort first: both reset the page.
    if let Some(term) = &query.search {
        listing.set_search(term.clone());
    }
    if let Some(sort) = &query.sort {
        listing.set_sort(sort.parse::<SortKey>()?);
    }
    listing.set_page(query.page.unwrap_or(1));
    Ok(())
}

/// Curated listing page.
///
/// GET /api/blogs?search=&sort=&page=
pub async fn list(
    state: web::Data<AppState>,
    query: web::Query<ListingQuery>,
) -> AppResult<HttpResponse> {
    let mut listing = BlogListing::new(state.views.page_size);
    listing.reload(&state.catalog()).await?;
    apply_view(&mut listing, &query)?;

    Ok(HttpResponse::Ok().json(views::listing_page(&listing)))
}

/// The listing page, re-sent after every change to `blogs`. Each re-fetch
/// returns to page 1.
///
/// GET /api/blogs/stream?search=&sort=&page=
pub async fn stream(
    state: web::Data<AppState>,
    query: web::Query<ListingQuery>,
) -> AppResult<HttpResponse> {
    let query = query.into_inner();
    let catalog = state.catalog();
    let mut listing = BlogListing::new(state.views.page_size);

    // Subscribe before the first fetch so no change slips between them.
    let subscription = state.feed.subscribe(Table::Blogs).await?;

    // A failed fetch is carried in the page's `error` field.
    let _ = listing.reload(&catalog).await;
    apply_view(&mut listing, &query)?;
    let first = sse::frame("page", &views::listing_page(&listing));

    let updates = stream::unfold(
        (listing, catalog, subscription),
        |(mut listing, catalog, mut subscription)| async move {
            if !listing.follow(&catalog, &mut subscription).await {
                return None;
            }
            let frame = sse::frame("page", &views::listing_page(&listing));
            Some((frame, (listing, catalog, subscription)))
        },
    );

    Ok(sse::respond(stream::once(async move { first }).chain(updates)))
}

/// Home feed: the newest published posts.
///
/// GET /api/blogs/latest
pub async fn latest(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let entries = state.catalog().latest(LATEST_LIMIT).await?;
    Ok(HttpResponse::Ok().json(views::cards(&entries)))
}

/// GET /api/blogs/{id}
pub async fn show(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let entry = state.catalog().published_entry(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(views::detail(&entry)))
}
