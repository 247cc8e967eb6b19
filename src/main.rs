use std::time::Duration;

use axum::http::header::CONTENT_DISPOSITION;
use axum::http::HeaderValue;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::info;

use tuberelay::api::{self, AppState};
use tuberelay::config::Config;
use tuberelay::downloader::{MetadataFetcher, StreamRelay};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "tuberelay=info,tower_http=info".to_string()),
        )
        .init();

    let config = Config::from_env();

    let fetcher = MetadataFetcher::new(config.info_timeout_secs, config.basic_info_timeout_secs);
    let relay =
        StreamRelay::with_default_backends(Duration::from_secs(config.attempt_timeout_secs));
    let state = AppState::new(fetcher, relay);

    let app = api::router(state).layer(build_cors(&config.allowed_origins));

    let listener = match TcpListener::bind(&config.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("Failed to bind {}: {}", config.bind_addr, e);
            std::process::exit(1);
        }
    };

    info!(addr = %config.bind_addr, "tuberelay listening");

    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}

fn build_cors(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() {
        // development default; set ALLOWED_ORIGINS in production
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            origins
                .iter()
                .filter_map(|origin| origin.parse::<HeaderValue>().ok()),
        )
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([
            CONTENT_DISPOSITION,
            axum::http::HeaderName::from_static("x-download-info"),
        ])
}
