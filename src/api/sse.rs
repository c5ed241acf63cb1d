//! Server-Sent Events support

use crate::session::SessionSnapshot;
use crate::view::ViewUpdate;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

/// `init` snapshot first, then every view update
pub fn sse_stream(
    snapshot: SessionSnapshot,
    updates: broadcast::Receiver<ViewUpdate>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let init = futures::stream::once(async move { Ok(init_event(&snapshot)) });

    let broadcasts = BroadcastStream::new(updates).filter_map(|result| match result {
        Ok(update) => Some(Ok(update_event(&update))),
        Err(e) => {
            tracing::debug!(error = %e, "SSE subscriber lagged");
            None
        }
    });

    Sse::new(init.chain(broadcasts)).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

fn init_event(snapshot: &SessionSnapshot) -> Event {
    let data = json!({
        "type": "init",
        "session": serde_json::to_value(snapshot).unwrap_or(Value::Null),
    });
    Event::default().event("init").data(data.to_string())
}

fn update_event(update: &ViewUpdate) -> Event {
    let data = serde_json::to_value(update).unwrap_or(Value::Null);
    Event::default()
        .event(update.event_name())
        .data(data.to_string())
}
