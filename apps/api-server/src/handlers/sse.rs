//! Server-Sent Events plumbing shared by the streaming routes.

use actix_web::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use actix_web::web::Bytes;
use actix_web::HttpResponse;
use futures::Stream;
use serde::Serialize;

/// Encode one `event:`/`data:` frame.
pub fn frame(event: &str, payload: &impl Serialize) -> Result<Bytes, serde_json::Error> {
    let data = serde_json::to_string(payload)?;
    Ok(Bytes::from(format!("event: {event}\ndata: {data}\n\n")))
}

/// Stream frames to the client. Dropping the body, as actix does when the
/// client disconnects, drops whatever subscription the stream owns.
pub fn respond<S>(frames: S) -> HttpResponse
where
    S: Stream<Item = Result<Bytes, serde_json::Error>> + 'static,
{
    HttpResponse::Ok()
        .insert_header((CONTENT_TYPE, "text/event-stream"))
        .insert_header((CACHE_CONTROL, "no-cache"))
        .streaming(frames)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_layout() {
        let bytes = frame("change", &serde_json::json!({ "table": "blogs" })).unwrap();
        assert_eq!(bytes, Bytes::from("event: change\ndata: {\"table\":\"blogs\"}\n\n"));
    }
}
