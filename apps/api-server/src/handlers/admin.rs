//! Review queue routes. Every handler requires a [`Verifier`].

use actix_web::{HttpResponse, web};
use futures::StreamExt;
use futures::stream;
use uuid::Uuid;

use blogify_core::ports::Table;
use blogify_core::services::{Notice, VerificationQueue};
use blogify_shared::dto::VerifyResponse;

use super::{sse, views};
use crate::middleware::auth::Verifier;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Pending queue and recent history.
///
/// GET /api/admin/verify
pub async fn queue(Verifier(_): Verifier, state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let mut queue = VerificationQueue::new(state.workflow());
    queue.refresh().await;

    if let Some(error) = queue.error() {
        return Err(AppError::BadGateway(error.to_string()));
    }

    Ok(HttpResponse::Ok().json(views::queue(&queue)))
}

/// Mark a pending post verified.
///
/// POST /api/admin/verify/{id}
pub async fn verify(
    Verifier(reviewer): Verifier,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let mut queue = VerificationQueue::new(state.workflow());

    let post = queue.verify(id).await?;

    tracing::info!(post_id = %id, reviewer = %reviewer.email, "Verification recorded");

    Ok(HttpResponse::Ok().json(VerifyResponse {
        notice: views::notice(&Notice::verified()),
        blog_id: post.id,
        verified_at: post.verified_at,
        pending: views::cards(queue.pending()),
    }))
}

/// Queue snapshots: one now and one after every change to `blogs`.
///
/// GET /api/admin/verify/stream
pub async fn stream(
    Verifier(reviewer): Verifier,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    let subscription = state.feed.subscribe(Table::Blogs).await?;
    tracing::debug!(reviewer = %reviewer.user_id, "Review queue stream opened");

    let mut queue = VerificationQueue::new(state.workflow());
    queue.refresh().await;
    let first = sse::frame("queue", &views::queue(&queue));

    let updates = stream::unfold(
        (queue, subscription),
        |(mut queue, mut subscription)| async move {
            if !queue.follow(&mut subscription).await {
                return None;
            }
            let frame = sse::frame("queue", &views::queue(&queue));
            Some((frame, (queue, subscription)))
        },
    );

    Ok(sse::respond(stream::once(async move { first }).chain(updates)))
}
