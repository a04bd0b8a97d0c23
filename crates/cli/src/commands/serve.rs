//! Serve command: local server with live reload
//!
//! Watches the project tree: theme sources are recompiled on change, and
//! changed pages, scripts and stylesheets are pushed to open pages.

use std::path::{Component, Path, PathBuf};

use clap::Args;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use deckhand_common::{paths, StyleCompiler};
use deckhand_server::{LocalServer, Reloader, ServerConfig};

use crate::output::{print_info, print_success};
use crate::project::Project;

/// Directories never worth watching
const IGNORED_DIRS: &[&str] = &["node_modules", ".git", "target", "dist"];

#[derive(Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Bind host
    #[arg(long)]
    pub host: Option<String>,

    /// Bind port
    #[arg(long, short)]
    pub port: Option<u16>,

    /// Serve without live reload
    #[arg(long)]
    pub no_reload: bool,
}

/// What a changed file means for the running server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// A style source: recompile the themes
    Style,
    /// Tell open pages that this path changed
    Reload(String),
    Ignore,
}

/// Classify a changed path (relative to the project root)
pub fn classify(relative: &Path, project: &Project) -> Change {
    let ignored = relative.components().any(|c| match c {
        Component::Normal(name) => name.to_str().is_some_and(|n| IGNORED_DIRS.contains(&n)),
        _ => false,
    });
    if ignored {
        return Change::Ignore;
    }

    let extension = relative
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "scss" => Change::Style,
        // compiled themes are announced by the compile step
        "css" if relative.starts_with(&project.config.style.out_dir) => Change::Ignore,
        "html" | "css" | "js" => match served_path(relative, project) {
            Some(url_path) => Change::Reload(url_path),
            None => Change::Ignore,
        },
        _ => Change::Ignore,
    }
}

/// URL path of a project file, or `None` when it lies outside the server root
fn served_path(relative: &Path, project: &Project) -> Option<String> {
    let served_root: PathBuf = project
        .config
        .server
        .root
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();
    let served = relative.strip_prefix(&served_root).ok()?;
    Some(format!("/{}", paths::to_slash(served)))
}

pub async fn execute(project: &Project, args: &ServeArgs) -> anyhow::Result<()> {
    let settings = &project.config.server;
    let live_reload = settings.live_reload && !args.no_reload;
    let config = ServerConfig {
        root: project.server_root(),
        host: args.host.clone().unwrap_or_else(|| settings.host.clone()),
        port: args.port.unwrap_or(settings.port),
        live_reload,
    };

    let server = LocalServer::start(config).await?;
    print_success(&format!("Serving presentation at {}", server.base_url()));

    if live_reload {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut watcher: RecommendedWatcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            match res {
                Ok(event) => {
                    let _ = tx.send(event);
                }
                Err(e) => error!("Watch error: {}", e),
            }
        })?;
        watcher.watch(&project.root, RecursiveMode::Recursive)?;
        print_info("Watching for changes; press Ctrl-C to stop");

        let styles = StyleCompiler::new(&project.config.style)?;
        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => break,
                Some(event) = rx.recv() => {
                    on_change(project, &styles, server.reloader(), event).await;
                }
            }
        }
    } else {
        print_info("Press Ctrl-C to stop");
        tokio::signal::ctrl_c().await?;
    }

    info!("Received shutdown signal");
    server.stop().await?;
    Ok(())
}

async fn on_change(project: &Project, styles: &StyleCompiler, reloader: &Reloader, event: Event) {
    if !matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    ) {
        return;
    }

    let root = project.root.canonicalize().unwrap_or_else(|_| project.root.clone());
    let mut recompile = false;
    for path in &event.paths {
        let relative = path
            .strip_prefix(&root)
            .or_else(|_| path.strip_prefix(&project.root))
            .unwrap_or(path);
        match classify(relative, project) {
            Change::Style => recompile = true,
            Change::Reload(url_path) => {
                let clients = reloader.notify(&url_path);
                debug!("{} changed, notified {} page(s)", url_path, clients);
            }
            Change::Ignore => {}
        }
    }

    if recompile {
        let style = &project.config.style;
        match styles.compile_all(&project.root, style).await {
            Ok(outputs) => {
                for url_path in outputs.iter().filter_map(|o| served_path(o, project)) {
                    reloader.notify(url_path);
                }
            }
            // keep serving; the next save gets another chance
            Err(e) => error!("{}", e),
        }
    }
}
