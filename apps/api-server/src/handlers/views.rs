//! Conversions from domain view state to wire DTOs.

use blogify_core::domain::BlogEntry;
use blogify_core::services::{BlogListing, HomeFeed, Notice, SiteStats, VerificationQueue};
use blogify_shared::dto::{
    BlogCardResponse, BlogDetailResponse, BlogPageResponse, HomeResponse, NoticeResponse,
    ShowingRange, StatsResponse, VerificationQueueResponse,
};

pub fn card(entry: &BlogEntry) -> BlogCardResponse {
    let post = &entry.post;
    BlogCardResponse {
        id: post.id,
        title: post.title.clone(),
        summary: post.summary().to_string(),
        author_id: entry.author.user_id,
        author_name: entry.author_name().to_string(),
        author_username: entry.author.username.clone(),
        read_time_minutes: post.read_time_minutes(),
        verified: post.verified,
        created_at: post.created_at,
        verified_at: post.verified_at,
        background_image_url: post.background_image_url.clone(),
    }
}

pub fn cards(entries: &[BlogEntry]) -> Vec<BlogCardResponse> {
    entries.iter().map(card).collect()
}

pub fn detail(entry: &BlogEntry) -> BlogDetailResponse {
    BlogDetailResponse {
        card: card(entry),
        content: entry.post.content.clone(),
    }
}

pub fn listing_page(listing: &BlogListing) -> BlogPageResponse {
    let page = listing.current_page();
    BlogPageResponse {
        items: cards(&page.items),
        page: page.number,
        page_size: page.page_size,
        total_pages: page.total_pages,
        total_items: page.total_items,
        showing: page.showing().map(|(start, end)| ShowingRange { start, end }),
        search: listing.search().to_string(),
        sort: listing.sort().as_str().to_string(),
        error: listing.error().map(String::from),
    }
}

pub fn queue(queue: &VerificationQueue) -> VerificationQueueResponse {
    VerificationQueueResponse {
        pending: cards(queue.pending()),
        history: cards(queue.history()),
        error: queue.error().map(String::from),
    }
}

pub fn notice(notice: &Notice) -> NoticeResponse {
    NoticeResponse {
        title: notice.title.clone(),
        description: notice.description.clone(),
    }
}

pub fn stats(stats: SiteStats) -> StatsResponse {
    StatsResponse {
        posts: stats.posts,
        users: stats.users,
        verified: stats.verified,
    }
}

pub fn home(home: &HomeFeed) -> HomeResponse {
    HomeResponse {
        latest: cards(home.latest()),
        stats: stats(home.stats()),
        error: home.error().map(String::from),
    }
}
