use anyhow::Context;
use recibos_ocr::OcrBackend;
use recibos_server::config::{OcrConfig, ServerConfig};
use recibos_server::{router, telemetry, AppState};

#[cfg(feature = "tesseract")]
fn recognizer(config: &OcrConfig) -> Box<dyn OcrBackend> {
    Box::new(recibos_ocr::TesseractRecognizer::new(
        config.data_path.clone(),
        &config.language,
    ))
}

#[cfg(not(feature = "tesseract"))]
fn recognizer(_config: &OcrConfig) -> Box<dyn OcrBackend> {
    tracing::warn!("built without the `tesseract` feature; image uploads will be rejected");
    Box::new(recibos_ocr::DisabledRecognizer)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::load().context("Failed to load configuration")?;
    telemetry::init(config.log_format).context("Failed to install tracing subscriber")?;

    let state = AppState::new(recognizer(&config.ocr), &config);
    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;

    tracing::info!(addr = %listener.local_addr()?, "receipt generator listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
