use crate::config::ViewerConfig;
use crate::error::{Error, Result};
use crate::request::ViewRequest;
use crate::viewer::{self, Page};
use axum::extract::{RawQuery, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

pub fn router(config: Arc<ViewerConfig>) -> Router {
    Router::new()
        .route("/", get(index))
        .layer(TraceLayer::new_for_http())
        .with_state(config)
}

async fn index(State(config): State<Arc<ViewerConfig>>, RawQuery(query): RawQuery) -> impl IntoResponse {
    let request = ViewRequest::from_query(query.as_deref().unwrap_or_default());

    // SQLite calls block, keep them off the async workers
    let page = tokio::task::spawn_blocking(move || viewer::handle(&config, &request))
        .await
        .unwrap_or_else(|e| {
            error!(error = %e, "view task failed");
            Page {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                html: "<h1>Internal Server Error</h1>".to_string(),
            }
        });

    (page.status, Html(page.html))
}

/// Serve the viewer until Ctrl+C or SIGTERM
pub fn run(config: ViewerConfig, addr: SocketAddr) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        let local = listener.local_addr()?;

        info!(
            db_dir = %config.install_dir.display(),
            default_db = config.default_db.as_ref().map(|p| p.display().to_string()),
            "viewer listening on http://{local}"
        );

        axum::serve(listener, router(Arc::new(config)))
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(Error::Io)?;

        info!("viewer stopped");
        Ok::<(), Error>(())
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
