//! Tracing setup and shutdown handling
//!
//! Logs are structured JSON on stdout: pipeline stages (market fetches,
//! assembly, ranking) at info, HTTP traces via tower-http, and notifier
//! failures at warn. `RUST_LOG` overrides the default filter.

use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter: this crate at info, chatty HTTP/database internals at warn.
pub const DEFAULT_FILTER: &str =
    "pjm_like_day=info,tower_http=info,hyper=warn,reqwest=warn,sqlx=warn,warn";

pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler")
            .recv()
            .await;
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! { _ = ctrl_c => {}, _ = terminate => {}, }
    info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::EnvFilter;

    #[test]
    fn test_default_filter_parses_and_targets_this_crate() {
        let filter: EnvFilter = DEFAULT_FILTER.parse().unwrap();
        let rendered = filter.to_string();
        assert!(rendered.contains("pjm_like_day=info"));
        assert!(rendered.contains("sqlx=warn"));
    }
}
