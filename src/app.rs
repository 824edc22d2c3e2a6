use crate::config::Config;
use crate::dynamo::DynamoScanner;
use crate::error::CatalogError;
use crate::models::{Movie, TableStatus};
use crate::store::{Catalog, TableScanner};
use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use std::{net::SocketAddr, sync::Arc};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

#[derive(Clone)]
pub struct AppState {
    pub catalog: Catalog,
    pub table_name: String,
}

pub async fn run_server(config: Config) -> Result<()> {
    let scanner = DynamoScanner::from_config(&config).await;
    if config.startup_check {
        scanner
            .probe()
            .await
            .with_context(|| format!("Table '{}' is not reachable", config.table_name))?;
    }
    info!(
        "Serving table '{}' in {} (failure policy {:?})",
        config.table_name, config.region, config.failure_policy
    );

    let scanner: Arc<dyn TableScanner> = Arc::new(scanner);
    let state = AppState {
        catalog: Catalog::new(scanner, config.failure_policy),
        table_name: config.table_name.clone(),
    };
    let app = build_router(state, &config.route_prefix);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;
    Ok(())
}

/// Routes are mounted under `prefix` (empty for the root).
pub fn build_router(state: AppState, prefix: &str) -> Router {
    let routes = Router::new()
        .route("/all", get(all_movies))
        .route("/status", get(status))
        .route("/search", get(search))
        .with_state(state);

    let app = if prefix.is_empty() {
        routes
    } else {
        Router::new().nest(prefix, routes)
    };
    app.layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

async fn status(State(state): State<AppState>) -> Result<Json<TableStatus>, CatalogError> {
    let snapshot = state.catalog.refresh_all().await?;
    Ok(Json(TableStatus {
        table: state.table_name,
        record_count: snapshot.count,
    }))
}

async fn all_movies(State(state): State<AppState>) -> Result<Json<Vec<Movie>>, CatalogError> {
    let snapshot = state.catalog.refresh_all().await?;
    debug!("Returning {} movies", snapshot.movies.len());
    Ok(Json(snapshot.movies))
}

async fn search(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<Movie>>, CatalogError> {
    // Repeated keys are allowed; the first `mediaType` wins.
    let media_type = params
        .into_iter()
        .find(|(key, _)| key == "mediaType")
        .map(|(_, value)| value)
        .unwrap_or_default();
    let movies = state.catalog.search(&media_type).await?;
    debug!("Search '{}' matched {} movies", media_type, movies.len());
    Ok(Json(movies))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Shutdown signal received (Ctrl+C)");
        }
        _ = terminate => {
            info!("Shutdown signal received (SIGTERM)");
        }
    }
}
