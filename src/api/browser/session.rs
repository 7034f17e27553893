use std::time::Duration;

use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::json;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::api::SessionProvider;
use crate::config::AppConfig;
use crate::services::extract_service::BAR_SELECTOR;
use crate::utils::PipelineError;

/// Per-step wait for the login form elements
pub const ELEMENT_TIMEOUT: Duration = Duration::from_secs(10);
/// Wait for the chart bars after logging in
pub const CHART_TIMEOUT: Duration = Duration::from_secs(30);

const POLL_INTERVAL: Duration = Duration::from_millis(250);

const USERNAME_FIELD: &str = "#username";
const PASSWORD_FIELD: &str = "#outlined-adornment-password";
const LOGIN_BUTTON: &str = ".login-btn";

/// Logs into the price portal through a WebDriver-controlled headless Chrome
pub struct BrowserSession {
    webdriver_url: String,
    login_url: String,
    username: String,
    password: String,
}

impl BrowserSession {
    pub fn new(webdriver_url: &str, login_url: &str, username: &str, password: &str) -> Self {
        Self {
            webdriver_url: webdriver_url.to_string(),
            login_url: login_url.to_string(),
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            &config.webdriver_url,
            &config.login_url,
            &config.username,
            &config.password,
        )
    }

    async fn connect(&self) -> Result<Client, PipelineError> {
        let mut capabilities = serde_json::Map::new();
        capabilities.insert(
            "goog:chromeOptions".to_string(),
            json!({ "args": ["--headless=new", "--no-sandbox", "--disable-dev-shm-usage"] }),
        );

        let mut builder = ClientBuilder::native();
        builder.capabilities(capabilities);
        builder.connect(&self.webdriver_url).await.map_err(|e| {
            PipelineError::Scrape(format!("Failed to start browser session at {}: {}", self.webdriver_url, e))
        })
    }

    /// Drive the two-step login form and return the dashboard markup
    async fn login_and_capture(&self, client: &Client) -> Result<String, PipelineError> {
        client
            .goto(&self.login_url)
            .await
            .map_err(|e| PipelineError::Scrape(format!("Failed to open login page: {}", e)))?;

        let username_field = wait_present(client, USERNAME_FIELD, ELEMENT_TIMEOUT).await?;
        username_field
            .send_keys(&self.username)
            .await
            .map_err(|e| PipelineError::Scrape(format!("Failed to type username: {}", e)))?;

        let next_button = wait_clickable(client, LOGIN_BUTTON, ELEMENT_TIMEOUT).await?;
        next_button
            .click()
            .await
            .map_err(|e| PipelineError::Scrape(format!("Failed to continue to password step: {}", e)))?;

        let password_field = wait_present(client, PASSWORD_FIELD, ELEMENT_TIMEOUT).await?;
        password_field
            .send_keys(&self.password)
            .await
            .map_err(|e| PipelineError::Scrape(format!("Failed to type password: {}", e)))?;

        let login_button = wait_clickable(client, LOGIN_BUTTON, ELEMENT_TIMEOUT).await?;
        login_button
            .click()
            .await
            .map_err(|e| PipelineError::Scrape(format!("Failed to submit login: {}", e)))?;

        debug!("Login submitted, waiting for chart bars");
        wait_present(client, BAR_SELECTOR, CHART_TIMEOUT).await?;

        client
            .source()
            .await
            .map_err(|e| PipelineError::Scrape(format!("Failed to read page source: {}", e)))
    }
}

async fn wait_present(
    client: &Client,
    selector: &str,
    timeout: Duration,
) -> Result<Element, PipelineError> {
    client
        .wait()
        .at_most(timeout)
        .every(POLL_INTERVAL)
        .for_element(Locator::Css(selector))
        .await
        .map_err(|e| {
            PipelineError::Scrape(format!("Timed out after {}s waiting for {}: {}", timeout.as_secs(), selector, e))
        })
}

/// Present, displayed and enabled
async fn wait_clickable(
    client: &Client,
    selector: &str,
    timeout: Duration,
) -> Result<Element, PipelineError> {
    let deadline = Instant::now() + timeout;
    let element = wait_present(client, selector, timeout).await?;

    loop {
        let displayed = element.is_displayed().await.unwrap_or(false);
        let enabled = element.is_enabled().await.unwrap_or(false);
        if displayed && enabled {
            return Ok(element);
        }
        if Instant::now() >= deadline {
            return Err(PipelineError::Scrape(format!(
                "Timed out after {}s waiting for {} to become clickable",
                timeout.as_secs(),
                selector
            )));
        }
        sleep(POLL_INTERVAL).await;
    }
}

#[async_trait]
impl SessionProvider for BrowserSession {
    async fn fetch_markup(&self) -> Result<String, PipelineError> {
        let client = self.connect().await?;
        info!("🌐 Browser session started, logging in at {}", self.login_url);

        let result = self.login_and_capture(&client).await;

        if let Err(e) = client.close().await {
            warn!("Failed to close browser session: {}", e);
        }

        let markup = result?;
        info!("Captured {} bytes of chart markup", markup.len());
        Ok(markup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_webdriver_is_scrape_error() {
        let session = BrowserSession::new(
            "http://127.0.0.1:9",
            "https://portal.example/login",
            "user",
            "pass",
        );

        match session.fetch_markup().await {
            Err(PipelineError::Scrape(msg)) => assert!(msg.contains("127.0.0.1:9")),
            other => panic!("expected Scrape error, got {:?}", other),
        }
    }
}
