//! SSE relay shared by the chat and transform routes.
//!
//! Framing: one `data: {"text": "..."}` event per upstream delta, then the
//! literal `data: [DONE]` sentinel. A failed upstream stream ends the response
//! body with an error, so the client sees the connection abort instead of the
//! sentinel. When the client disconnects, axum drops the body stream, which
//! drops the upstream request with it.

use axum::response::sse::{Event, Sse};
use futures::stream::{self, Stream, StreamExt};
use serde_json::json;
use tracing::error;

use crate::llm_client::{LlmError, TextStream};
use crate::sse::DONE_SENTINEL;

/// Serializes one text delta the way the web client parses it.
pub fn text_frame(text: &str) -> String {
    json!({ "text": text }).to_string()
}

/// Maps upstream deltas to SSE events, appending the sentinel on success and
/// stopping at the first error.
pub fn relay_events(deltas: TextStream) -> impl Stream<Item = Result<Event, LlmError>> {
    deltas
        .map(|delta| delta.map(|text| Event::default().data(text_frame(&text))))
        .chain(stream::once(async { Ok(Event::default().data(DONE_SENTINEL)) }))
        .scan(false, |failed, item| {
            if *failed {
                return futures::future::ready(None);
            }
            if let Err(e) = &item {
                error!("Stream error: {e}");
                *failed = true;
            }
            futures::future::ready(Some(item))
        })
}

pub fn relay(deltas: TextStream) -> Sse<impl Stream<Item = Result<Event, LlmError>>> {
    Sse::new(relay_events(deltas))
}
