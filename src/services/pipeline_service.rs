use chrono::NaiveDate;
use tracing::info;

use crate::api::{MediaPublisher, Notifier, SessionProvider};
use crate::models::{PipelineOutcome, SampleSeries};
use crate::services::chart_service::ChartRenderer;
use crate::services::{curve_service, extract_service};
use crate::utils::PipelineError;

/// Notification text for the chart of `date`
pub fn compose_message(date: NaiveDate) -> String {
    format!("These are the energy prices for {}!", date.format("%d-%m-%Y"))
}

/// Scrape, smooth, render, publish and notify, strictly in that order
pub struct EnergyPricePipeline<S, R, P, N> {
    session: S,
    renderer: R,
    publisher: P,
    notifier: N,
}

impl<S, R, P, N> EnergyPricePipeline<S, R, P, N>
where
    S: SessionProvider,
    R: ChartRenderer,
    P: MediaPublisher,
    N: Notifier,
{
    pub fn new(session: S, renderer: R, publisher: P, notifier: N) -> Self {
        Self {
            session,
            renderer,
            publisher,
            notifier,
        }
    }

    /// Run once. The first failing stage ends the run; nothing is rolled back.
    pub async fn run(&self, report_date: NaiveDate) -> Result<PipelineOutcome, PipelineError> {
        let markup = self.session.fetch_markup().await?;

        let points = extract_service::extract_price_points(&markup)?;
        if points.is_empty() {
            info!("No chart bars found, nothing to send");
            return Ok(PipelineOutcome::NoData);
        }
        info!("📊 Scraped {} price points", points.len());

        let series = SampleSeries::from_points(&points);
        let curve = curve_service::synthesize(&series)?;

        let chart = self.renderer.render(&curve, &series.labels).await?;
        let artifact = self.publisher.publish(&chart).await?;
        info!("Chart published as '{}'", artifact.public_id);

        let message_id = self
            .notifier
            .notify(&compose_message(report_date), &artifact.url)
            .await?;

        Ok(PipelineOutcome::Delivered { message_id })
    }
}
