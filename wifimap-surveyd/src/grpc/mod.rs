pub mod convert;
pub mod samples;
pub mod survey;

use std::sync::Arc;

use samples::SamplesService;
use survey::SurveyService;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tonic::transport::Server;

use crate::config::Config;
use crate::scanner::ScanService;
use crate::store::ProjectStore;

pub mod wifimap {
    tonic::include_proto!("wifimap");
}

/// Floor plan uploads are the largest messages
pub const MAX_MESSAGE_BYTES: usize = 32 * 1024 * 1024;

pub async fn start_server(
    config: Config,
    scanner: Arc<ScanService>,
    store: ProjectStore,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr = config.server.address.parse()?;

    let survey_service = SurveyService::new(scanner.clone(), &config.server.mode);
    let samples_service = SamplesService::new(
        Arc::new(Mutex::new(store)),
        scanner,
        config.metrics,
        config.measure,
        config.heatmap,
    );

    // Cancelled once a shutdown signal arrives
    let shutdown_token = CancellationToken::new();
    let signal_token = shutdown_token.clone();

    tokio::spawn(async move {
        // SIGTERM (Unix only)
        #[cfg(unix)]
        let terminate = async {
            use tokio::signal::unix::{signal, SignalKind};
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    sigterm.recv().await;
                }
                Err(err) => {
                    log::error!("Failed to install SIGTERM handler: {}", err);
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                log::warn!("Stopping by Ctrl+C");
            },
            _ = terminate => {
                log::warn!("Stopping by terminate");
            },
            _ = signal_token.cancelled() => {},
        }

        signal_token.cancel();
    });

    log::info!("Starting gRPC server on {}", addr);

    Server::builder()
        .add_service(wifimap::survey_server::SurveyServer::new(survey_service))
        .add_service(
            wifimap::samples_server::SamplesServer::new(samples_service)
                .max_decoding_message_size(MAX_MESSAGE_BYTES)
                .max_encoding_message_size(MAX_MESSAGE_BYTES),
        )
        .serve_with_shutdown(addr, shutdown_token.cancelled_owned())
        .await?;

    log::info!("gRPC server stopped.");

    Ok(())
}
