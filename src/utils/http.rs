use crate::config::FetchConfig;
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Build the shared HTTP client: configured User-Agent, and a whole-request
/// timeout unless the config disables it.
pub fn build_client(config: &FetchConfig) -> reqwest::Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
    if let Some(timeout) = config.timeout() {
        builder = builder
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT.min(timeout));
    }
    builder.build()
}
