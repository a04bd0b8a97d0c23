//! Live reload: notification channel, WebSocket endpoint and page injection

use axum::{
    body::{to_bytes, Body},
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch};
use tracing::{debug, warn};

/// Path of the WebSocket endpoint pages connect to
pub const SOCKET_PATH: &str = "/__livereload";

/// Path of the client script
pub const CLIENT_PATH: &str = "/__livereload.js";

const CLIENT_JS: &str = include_str!("../assets/livereload.js");

/// Largest HTML page the injector will buffer
const MAX_INJECT_BYTES: usize = 16 * 1024 * 1024;

/// Message pushed to connected pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReloadEvent {
    pub command: String,
    pub path: String,
}

impl ReloadEvent {
    pub fn reload(path: impl Into<String>) -> Self {
        Self {
            command: "reload".to_string(),
            path: path.into(),
        }
    }
}

/// Sending side of the reload channel
#[derive(Debug, Clone)]
pub struct Reloader {
    tx: broadcast::Sender<ReloadEvent>,
}

impl Reloader {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(64);
        Self { tx }
    }

    /// Tell every connected page that `path` changed. Returns how many pages were told.
    pub fn notify(&self, path: impl Into<String>) -> usize {
        let event = ReloadEvent::reload(path);
        debug!("Reload: {}", event.path);
        self.tx.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ReloadEvent> {
        self.tx.subscribe()
    }
}

impl Default for Reloader {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
pub(crate) struct ReloadState {
    pub reloader: Reloader,
    pub shutdown: watch::Receiver<bool>,
}

pub(crate) async fn socket_handler(
    State(state): State<ReloadState>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| reload_session(socket, state))
}

async fn reload_session(mut socket: WebSocket, state: ReloadState) {
    let mut events = state.reloader.subscribe();
    let mut shutdown = state.shutdown;

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    let text = match serde_json::to_string(&event) {
                        Ok(text) => text,
                        Err(e) => {
                            warn!("Failed to encode reload event: {}", e);
                            continue;
                        }
                    };
                    if socket.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!("Live reload client skipped {} events", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
            _ = shutdown.changed() => break,
        }
    }

    let _ = socket.send(Message::Close(None)).await;
}

pub(crate) async fn client_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        CLIENT_JS,
    )
}

/// Add the client script tag to an HTML document
pub fn inject_snippet(html: &str) -> String {
    let tag = format!("<script src=\"{}\"></script>", CLIENT_PATH);
    if html.contains(&tag) {
        return html.to_string();
    }
    match html.rfind("</body>") {
        Some(idx) => {
            let mut out = String::with_capacity(html.len() + tag.len());
            out.push_str(&html[..idx]);
            out.push_str(&tag);
            out.push_str(&html[idx..]);
            out
        }
        None => format!("{}{}", html, tag),
    }
}

/// Response middleware rewriting HTML pages to load the client script
pub(crate) async fn inject_into_html(response: Response) -> Response {
    let is_html = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("text/html"))
        .unwrap_or(false);
    if !is_html || !response.status().is_success() {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, MAX_INJECT_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Could not buffer HTML for live reload: {}", e);
            return Response::from_parts(parts, Body::empty());
        }
    };

    let html = String::from_utf8_lossy(&bytes);
    let injected = inject_snippet(&html);
    parts.headers.remove(header::CONTENT_LENGTH);
    parts.headers.remove(header::ETAG);
    if let Ok(len) = HeaderValue::from_str(&injected.len().to_string()) {
        parts.headers.insert(header::CONTENT_LENGTH, len);
    }
    Response::from_parts(parts, Body::from(injected))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inject_before_body_close() {
        let html = "<html><body><div class=\"reveal\"></div></body></html>";
        assert_eq!(
            inject_snippet(html),
            "<html><body><div class=\"reveal\"></div><script src=\"/__livereload.js\"></script></body></html>"
        );
    }

    #[test]
    fn test_inject_appends_without_body() {
        assert_eq!(
            inject_snippet("<p>fragment</p>"),
            "<p>fragment</p><script src=\"/__livereload.js\"></script>"
        );
    }

    #[test]
    fn test_inject_is_idempotent() {
        let once = inject_snippet("<body></body>");
        assert_eq!(inject_snippet(&once), once);
    }

    #[tokio::test]
    async fn test_notify_reaches_subscribers() {
        let reloader = Reloader::new();
        assert_eq!(reloader.notify("index.html"), 0);

        let mut rx = reloader.subscribe();
        assert_eq!(reloader.notify("css/theme/black.css"), 1);
        assert_eq!(rx.recv().await.unwrap(), ReloadEvent::reload("css/theme/black.css"));
    }
}
