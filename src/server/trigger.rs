use axum::extract::State;
use axum::http::StatusCode;
use chrono::Local;
use tracing::{error, info};

use super::AppState;
use crate::api::browser::BrowserSession;
use crate::api::cloudinary::CloudinaryClient;
use crate::api::twilio::{TwilioClient, WhatsAppNotifier};
use crate::models::PipelineOutcome;
use crate::services::chart_service::PlottersChartRenderer;
use crate::services::pipeline_service::EnergyPricePipeline;
use crate::utils::PipelineError;

pub const NO_DATA_MESSAGE: &str = "No data found.";

/// Map a finished run to the trigger's status and body
pub fn respond(result: Result<PipelineOutcome, PipelineError>) -> (StatusCode, String) {
    match result {
        Ok(PipelineOutcome::Delivered { message_id }) => {
            info!("✅ Run completed, message {}", message_id);
            (
                StatusCode::OK,
                format!("Completed successfully. Message ID: {}", message_id),
            )
        }
        Ok(PipelineOutcome::NoData) => (StatusCode::OK, NO_DATA_MESSAGE.to_string()),
        Err(e) => {
            error!("❌ Run failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error occurred: {}", e),
            )
        }
    }
}

/// GET|POST /api/energy-prices
///
/// Runs the whole pipeline synchronously. Configuration problems are answered
/// with 500 before any browser or network client is created.
pub async fn energy_prices_handler(State(state): State<AppState>) -> (StatusCode, String) {
    info!("⚡ Energy price trigger invoked");

    let config = match &state.config {
        Ok(config) => config.clone(),
        Err(e) => {
            error!("Cannot run: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
        }
    };

    let pipeline = EnergyPricePipeline::new(
        BrowserSession::from_config(&config),
        PlottersChartRenderer::in_temp_dir(),
        CloudinaryClient::new(&config.cloudinary),
        WhatsAppNotifier::new(
            TwilioClient::new(&config.twilio),
            &config.whatsapp_from,
            &config.whatsapp_to,
        ),
    );

    respond(pipeline.run(Local::now().date_naive()).await)
}
