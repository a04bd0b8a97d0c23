//! Local server lifecycle: bind, serve, stop

use std::net::{IpAddr, SocketAddr};
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use axum::{middleware, routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use url::Url;

use crate::error::{ServerError, ServerResult};
use crate::reload::{self, ReloadState, Reloader};

/// How long `stop` waits for open connections to drain
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Configuration for starting the local server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Directory served at `/`
    pub root: PathBuf,

    /// Bind host
    pub host: String,

    /// Bind port (0 picks a free port)
    pub port: u16,

    /// Serve the reload socket and inject its client into HTML pages
    pub live_reload: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            host: "127.0.0.1".to_string(),
            port: 8000,
            live_reload: true,
        }
    }
}

/// Entry point for starting servers
pub struct LocalServer;

impl LocalServer {
    /// Bind and start serving. The returned handle owns the server.
    pub async fn start(config: ServerConfig) -> ServerResult<ServerHandle> {
        if !config.root.is_dir() {
            return Err(ServerError::RootMissing(config.root));
        }

        let ip: IpAddr = match config.host.as_str() {
            "localhost" => IpAddr::from([127, 0, 0, 1]),
            host => host.parse().map_err(|_| ServerError::InvalidAddress {
                host: config.host.clone(),
                port: config.port,
            })?,
        };
        let requested = SocketAddr::new(ip, config.port);
        let listener = TcpListener::bind(requested)
            .await
            .map_err(|source| ServerError::Bind {
                addr: requested,
                source,
            })?;
        let addr = listener.local_addr()?;

        let reloader = Reloader::new();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let router = build_router(&config.root, config.live_reload, &reloader, shutdown_rx.clone());

        let mut signal = shutdown_rx;
        let task = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    let _ = signal.wait_for(|stopped| *stopped).await;
                })
                .await
        });

        let base_url = Url::parse(&format!("http://{}/", addr))
            .map_err(|_| ServerError::InvalidAddress {
                host: config.host.clone(),
                port: addr.port(),
            })?;

        info!(
            "Serving {} at {}{}",
            config.root.display(),
            base_url,
            if config.live_reload { " (live reload)" } else { "" }
        );

        Ok(ServerHandle {
            addr,
            base_url,
            reloader,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        })
    }
}

fn build_router(
    root: &Path,
    live_reload: bool,
    reloader: &Reloader,
    shutdown: watch::Receiver<bool>,
) -> Router {
    let files = ServeDir::new(root).append_index_html_on_directories(true);

    let router = if live_reload {
        let state = ReloadState {
            reloader: reloader.clone(),
            shutdown,
        };
        Router::new()
            .route(reload::SOCKET_PATH, get(reload::socket_handler))
            .route(reload::CLIENT_PATH, get(reload::client_handler))
            .with_state(state)
            .fallback_service(files)
            .layer(middleware::map_response(reload::inject_into_html))
    } else {
        Router::new().fallback_service(files)
    };

    router.layer(TraceLayer::new_for_http())
}

/// Handle to a running local server
pub struct ServerHandle {
    addr: SocketAddr,
    base_url: Url,
    reloader: Reloader,
    shutdown: Option<watch::Sender<bool>>,
    task: Option<JoinHandle<std::io::Result<()>>>,
}

impl ServerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Base URL, always ending in `/`
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// URL of a file under the server root
    ///
    /// Each path component becomes one percent-encoded segment, so `#` and
    /// `?` in file names stay part of the path.
    pub fn url_for(&self, relative: &Path) -> Url {
        let mut url = self.base_url.clone();
        // an http base always has path segments
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(relative.components().filter_map(|c| match c {
                Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
                _ => None,
            }));
        }
        url
    }

    /// Reload channel for this server's pages
    pub fn reloader(&self) -> &Reloader {
        &self.reloader
    }

    /// Stop the server, waiting for the serve task to finish.
    ///
    /// Consumes the handle, so a server is stopped at most once.
    pub async fn stop(mut self) -> ServerResult<()> {
        info!("Stopping server at {}", self.base_url);

        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(true);
        }

        let Some(mut task) = self.task.take() else {
            return Ok(());
        };
        match tokio::time::timeout(SHUTDOWN_GRACE, &mut task).await {
            Ok(Ok(Ok(()))) => Ok(()),
            Ok(Ok(Err(e))) => Err(ServerError::Io(e)),
            Ok(Err(e)) => Err(ServerError::Task(e.to_string())),
            Err(_) => {
                warn!("Server did not drain within {:?}; aborting", SHUTDOWN_GRACE);
                task.abort();
                Ok(())
            }
        }
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(true);
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
