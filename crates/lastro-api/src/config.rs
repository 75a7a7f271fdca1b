use std::time::Duration;

/// Backend used when nothing else is configured
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";

/// Public IP lookup service
pub const DEFAULT_IP_LOOKUP_URL: &str = "https://api.ipify.org?format=json";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the archive backend
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_url: String,
    pub ip_lookup_url: String,
    pub timeout: Duration,
    /// Dump every request and response to the console
    pub verbose: bool,
}

impl ClientConfig {
    pub fn new(api_url: &str) -> Self {
        Self {
            api_url: normalize_api_url(api_url),
            ..Self::default()
        }
    }

    pub fn with_ip_lookup_url(mut self, url: &str) -> Self {
        self.ip_lookup_url = url.trim().to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            ip_lookup_url: DEFAULT_IP_LOOKUP_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            verbose: false,
        }
    }
}

/// Normalize a backend base URL: no surrounding whitespace, no trailing
/// slash, and an explicit scheme (plain http when none is given).
pub fn normalize_api_url(url: &str) -> String {
    let url = url.trim().trim_end_matches('/');

    if url.contains("://") {
        url.to_string()
    } else {
        format!("http://{}", url)
    }
}
