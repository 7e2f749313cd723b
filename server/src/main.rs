mod api;
mod auth;
mod config;
mod db;
mod error;
mod load_data;
mod models;
mod schema;
mod services;
mod telemetry;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::extract::{FromRef, MatchedPath, Request};
use axum::Router;
use clap::{Parser, Subcommand};
use tower::Layer;
use tower_http::normalize_path::NormalizePathLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::db::DbPool;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<DbPool>,
    pub config: Arc<Config>,
}

impl FromRef<AppState> for Arc<DbPool> {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Arc<Config> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

#[derive(Parser)]
#[command(name = "foodgram-server")]
#[command(about = "Foodgram recipe sharing server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server (default)
    Serve,
    /// Print the OpenAPI document and exit
    Openapi,
    /// Import ingredients and tags from JSON files
    LoadData {
        /// JSON array of {name, measurement_unit}
        #[arg(long)]
        ingredients: PathBuf,
        /// JSON array of {name, slug}
        #[arg(long)]
        tags: Option<PathBuf>,
    },
}

/// Swagger UI is served from `/swagger-ui/`, so it is routed ahead of the
/// trailing-slash trimming that wraps everything else.
fn app(state: AppState) -> Router {
    let swagger_ui = SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api::openapi());

    Router::new()
        .merge(swagger_ui)
        .fallback_service(NormalizePathLayer::trim_trailing_slash().layer(router(state)))
}

fn router(state: AppState) -> Router {
    Router::new()
        .nest("/api", api::router())
        .nest(api::short_links::SHORT_LINK_PATH, api::short_links::router())
        .nest(services::media::MEDIA_PATH, api::media::router())
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    let matched_path = request
                        .extensions()
                        .get::<MatchedPath>()
                        .map(MatchedPath::as_str)
                        .unwrap_or(request.uri().path());

                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %matched_path,
                    )
                })
                .on_request(|_request: &Request<_>, _span: &Span| {})
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     _span: &Span| {
                        let status = response.status().as_u16();
                        if status >= 500 {
                            tracing::error!(
                                status = %status,
                                latency_ms = %latency.as_millis(),
                                "request failed with server error"
                            );
                        } else {
                            tracing::info!(
                                status = %status,
                                latency_ms = %latency.as_millis(),
                                "request completed"
                            );
                        }
                    },
                )
                .on_failure(
                    |error: tower_http::classify::ServerErrorsFailureClass,
                     latency: std::time::Duration,
                     _span: &Span| {
                        tracing::error!(
                            error = %error,
                            latency_ms = %latency.as_millis(),
                            "request failed"
                        );
                    },
                ),
        )
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let pool = db::create_pool(&config.database_url, config.db_pool_size)?;
    let bind_addr = config.bind_addr;
    let public_url = config.public_url.clone();

    let state = AppState {
        pool: Arc::new(pool),
        config: Arc::new(config),
    };

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("binding {}", bind_addr))?;

    tracing::info!("Server listening on {}", listener.local_addr()?);
    tracing::info!("Swagger UI available at {}/swagger-ui/", public_url);
    tracing::info!(
        "OpenAPI spec available at {}/api-docs/openapi.json",
        public_url
    );

    axum::serve(listener, app(state)).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(Commands::Openapi) = cli.command {
        println!("{}", api::openapi().to_pretty_json()?);
        return Ok(());
    }

    // A missing .env file is fine
    dotenvy::dotenv().ok();
    telemetry::init_telemetry()?;

    let config = Config::from_env()?;

    match cli.command {
        Some(Commands::LoadData { ingredients, tags }) => {
            let pool = db::create_pool(&config.database_url, 1)?;
            load_data::load(&pool, &ingredients, tags.as_deref())
        }
        Some(Commands::Openapi) => Ok(()),
        Some(Commands::Serve) | None => serve(config).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, StatusCode};
    use diesel::r2d2::{ConnectionManager, Pool};
    use tower::ServiceExt;

    /// State whose pool never connects; fine for routes that don't query.
    fn offline_state() -> AppState {
        let manager = ConnectionManager::new("postgres://localhost/unused");
        let config = Config::from_lookup(|key| {
            (key == "DATABASE_URL").then(|| "postgres://localhost/unused".to_string())
        })
        .unwrap();
        AppState {
            pool: Arc::new(Pool::builder().build_unchecked(manager)),
            config: Arc::new(config),
        }
    }

    async fn get(uri: &str) -> axum::http::Response<Body> {
        let request = axum::http::Request::get(uri)
            .body(Body::empty())
            .unwrap();
        app(offline_state()).oneshot(request).await.unwrap()
    }

    #[tokio::test]
    async fn test_swagger_ui_is_reachable() {
        assert_eq!(get("/swagger-ui/").await.status(), StatusCode::OK);

        let response = get("/swagger-ui").await;
        assert!(response.status().is_redirection());
        assert_eq!(response.headers()[header::LOCATION], "/swagger-ui/");
    }

    #[tokio::test]
    async fn test_openapi_document_is_served() {
        assert_eq!(get("/api-docs/openapi.json").await.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_trailing_slash_is_trimmed_for_api_routes() {
        // Invalid codes are rejected by the handler before any query runs,
        // so a JSON error body shows the route was matched.
        let response = get("/s/not*valid/").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Short link not found");
    }
}
