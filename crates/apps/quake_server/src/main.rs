use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use parking_lot::RwLock;
use scene::SessionHost;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod api;
mod config;
mod fetch;
mod loader;
mod page;

use api::AppState;
use config::Args;
use fetch::FeedFetcher;
use loader::{spawn_feed_loads, FeedSources};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let (app, session) = match Args::parse().into_configs() {
        Ok(configs) => configs,
        Err(err) => {
            error!("invalid configuration: {err}");
            return ExitCode::FAILURE;
        }
    };

    let host = match SessionHost::new(session) {
        Ok(host) => Arc::new(RwLock::new(host)),
        Err(err) => {
            error!("failed to build map session: {err}");
            return ExitCode::FAILURE;
        }
    };
    let fetcher = match FeedFetcher::new(app.fetch_timeout, app.max_feed_bytes) {
        Ok(fetcher) => fetcher,
        Err(err) => {
            error!("failed to build http client: {err}");
            return ExitCode::FAILURE;
        }
    };

    // Bind before fetching so the page is reachable while feeds load.
    let listener = match tokio::net::TcpListener::bind(app.addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("failed to bind {}: {err}", app.addr);
            return ExitCode::FAILURE;
        }
    };

    spawn_feed_loads(
        host.clone(),
        fetcher,
        FeedSources {
            earthquakes_url: app.earthquakes_url,
            plates_url: app.plates_url,
        },
    );

    let router = api::router(AppState { host });
    info!("earthquake map listening on http://{}", app.addr);
    if let Err(err) = axum::serve(listener, router).await {
        error!("server error: {err}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
