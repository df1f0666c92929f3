use anyhow::Result;
use hostconsole::*;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;

    let sampler = sampler::Sampler::new();
    let host_info = Arc::new(sampler.host_info().await);
    let resolver = Arc::new(lookup::Resolver::new(
        &app_config.lookup.endpoint,
        Duration::from_millis(app_config.lookup.timeout_ms),
    )?);

    // One-time enrichment; failure just leaves public_ip/isp null.
    let public_net = resolver.lookup_self().await;
    match &public_net {
        Some(net) => tracing::info!(ip = %net.ip, isp = %net.isp, "public network resolved"),
        None => tracing::warn!("public network lookup failed; public_ip/isp will be null"),
    }

    let aggregator = Arc::new(aggregator::Aggregator::new(
        sampler,
        app_config.probing.targets.clone(),
        Duration::from_millis(app_config.probing.timeout_ms),
        public_net,
    ));

    let app = routes::app(aggregator, host_info, resolver, app_config.clone());
    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    let service = app.into_make_service_with_connect_info::<SocketAddr>();

    let in_container = std::path::Path::new("/.dockerenv").exists()
        || std::env::var("CONTAINER").as_deref() == Ok("1");

    if in_container {
        // In Docker: run server until error or SIGTERM (no signal handler; avoids immediate exit)
        axum::serve(listener, service).await?;
    } else {
        tokio::select! {
            result = axum::serve(listener, service) => {
                result?;
            }
            _ = async {
                #[cfg(unix)]
                {
                    let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                        Ok(s) => s,
                        Err(_) => {
                            let _ = tokio::signal::ctrl_c().await;
                            return;
                        }
                    };
                    tokio::select! {
                        _ = tokio::signal::ctrl_c() => {}
                        _ = sigterm.recv() => {}
                    }
                }
                #[cfg(not(unix))]
                {
                    tokio::signal::ctrl_c().await
                }
            } => {
                tracing::info!("Received shutdown signal");
            }
        }
    }

    Ok(())
}
