use std::{env, path::PathBuf, time::Duration};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_url: String,
    pub session_file: PathBuf,
    pub http_timeout: Duration,
    pub customer_poll_interval: Duration,
    pub business_poll_interval: Duration,
    pub catalog_page_size: u32,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let api_url = env::var("API_URL")?;
        let session_file = env::var("SESSION_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("session.json"));
        let http_timeout = Duration::from_secs(parse_or("HTTP_TIMEOUT_SECS", 30));
        let customer_poll_interval = Duration::from_secs(parse_or("CUSTOMER_POLL_SECS", 15));
        let business_poll_interval = Duration::from_secs(parse_or("BUSINESS_POLL_SECS", 30));
        let catalog_page_size = parse_or("CATALOG_PAGE_SIZE", 1000);
        Ok(Self {
            api_url,
            session_file,
            http_timeout,
            customer_poll_interval,
            business_poll_interval,
            catalog_page_size,
        })
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
