//! Server wiring: build the pipeline, serve uploads, reload on SIGHUP

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use nel_pipeline::{
    build_router, Cors, HotSwap, Pipeline, PipelineConfig, SystemClock, UploadHandler,
};
use nel_processor::{
    default_registry, load_chain, Chain, DumpReportsAsClf, KeepNelReports, Processor,
    ProcessorRegistry,
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::Cli;

const ROOT_BODY: &str = r#"<html>
  <head>
    <title>Network Error Logging collector</title>
  </head>
  <body>
    <h1>Network Error Logging</h1>
    <p>
      This is a collector that can receive
      <a href="https://wicg.github.io/network-error-logging/">Network Error
      Logging</a> reports.
    </p>
  </body>
</html>
"#;

pub async fn run(cli: Cli) -> Result<()> {
    let cancel = CancellationToken::new();

    let registry = default_registry();
    let pipeline = build_pipeline(&cli, &registry, &cancel)?;
    let hotswap = Arc::new(HotSwap::new(Arc::new(pipeline) as Arc<dyn UploadHandler>));

    #[cfg(unix)]
    if cli.config.is_some() {
        spawn_reload_handler(cli.clone(), Arc::clone(&hotswap), cancel.clone());
    }

    let handler = Arc::new(Cors::new(hotswap.clone() as Arc<dyn UploadHandler>));
    let app = Router::new()
        .route("/", get(root))
        .merge(build_router(handler));

    let listener = TcpListener::bind(&cli.listen)
        .await
        .with_context(|| format!("failed to bind {}", cli.listen))?;
    info!(address = %cli.listen, "NEL collector listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(cancel.clone()))
    .await?;

    // Quiesce in-flight uploads and flush processor sinks.
    hotswap.close().await;
    info!("collector stopped");
    Ok(())
}

/// Build a pipeline from the configuration file, or the default chain
/// (filter to NEL reports, dump CLF lines to stdout) when none is given.
fn build_pipeline(
    cli: &Cli,
    registry: &ProcessorRegistry,
    cancel: &CancellationToken,
) -> Result<Pipeline> {
    let chain = match &cli.config {
        Some(path) => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            load_chain(registry, cancel, &bytes)?
        }
        None => {
            let mut processors: Vec<Box<dyn Processor>> = Vec::new();
            if !cli.keep_non_nel_reports {
                processors.push(Box::new(KeepNelReports));
            }
            processors.push(Box::new(DumpReportsAsClf::to_stdout()));
            Chain::new(processors)
        }
    };

    let config = PipelineConfig {
        queue_size: cli.queue_size,
        workers: cli.workers,
    };
    Ok(Pipeline::new(config, chain, Arc::new(SystemClock)))
}

/// Rebuild the pipeline from the config file on SIGHUP and swap it in.
/// In-flight uploads finish against the pipeline they started with; a
/// reload failure keeps the old pipeline running.
#[cfg(unix)]
fn spawn_reload_handler(cli: Cli, hotswap: Arc<HotSwap>, cancel: CancellationToken) {
    use tokio::signal::unix::{signal, SignalKind};

    tokio::spawn(async move {
        let mut sig = signal(SignalKind::hangup()).expect("failed to install SIGHUP handler");
        while sig.recv().await.is_some() {
            let registry = default_registry();
            match build_pipeline(&cli, &registry, &cancel) {
                Ok(pipeline) => {
                    hotswap.swap(Arc::new(pipeline)).await;
                    info!("SIGHUP: pipeline reloaded");
                }
                Err(error) => {
                    error!(%error, "SIGHUP: failed to reload pipeline, keeping the old one");
                }
            }
        }
    });
    info!("SIGHUP handler installed for pipeline hot reload");
}

async fn root() -> Html<&'static str> {
    Html(ROOT_BODY)
}

async fn shutdown_signal(cancel: CancellationToken) {
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if result.is_ok() {
                info!("shutdown signal received");
            }
        }
        () = cancel.cancelled() => {}
    }
}
