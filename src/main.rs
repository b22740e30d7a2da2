use anyhow::Context;
use tracing_subscriber::EnvFilter;

use lantern::config::Config;
use lantern::router::{Catalogue, Router};
use lantern::server::{self, Multiplexer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let [_, port] = args.as_slice() else {
        let program = args.first().map(String::as_str).unwrap_or("lantern");
        anyhow::bail!("usage: {} <port>", program);
    };

    let mut cfg = Config::load()?;
    cfg.server.port = port.clone();

    let listener = server::bind(&cfg.server)?;
    let catalogue = Catalogue::load(&cfg.static_files.root, cfg.static_files.buckets)
        .context("building file catalogue")?;
    let router = Router::with_default_routes(catalogue);

    let mut mux = Multiplexer::new(listener, &cfg.server)?;
    let shutdown = mux.shutdown_handle();
    let mut running = tokio::task::spawn_blocking(move || mux.run(&router));

    tokio::select! {
        res = &mut running => {
            res??;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
            shutdown.shutdown()?;
            running.await??;
        }
    }

    Ok(())
}
