/// Runtime configuration for the scraper, the store and the read API
use std::path::PathBuf;
use std::time::Duration;

/// Base URL of GMU's Banner student registration service.
pub const BANNER_BASE_URL: &str = "https://ssbstureg.gmu.edu/StudentRegistrationSsb";

/// Spring 2026.
pub const DEFAULT_TERM: &str = "202610";

/// Configuration for one scrape run.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// Base URL of the registration portal
    pub base_url: String,
    /// Term code to select on the session, e.g. `202610`
    pub term: String,
    /// Subjects to scrape; empty means every subject offered in the term
    pub subjects: Vec<String>,
    /// Records requested per page
    pub page_size: u32,
    /// Pause between two pages of the same subject
    pub page_delay: Duration,
    /// Pause between two subjects
    pub subject_delay: Duration,
    /// Timeout applied to every request
    pub request_timeout: Duration,
    /// Maximum number of room documents written at once
    pub room_writers: usize,
    /// User agent string
    pub user_agent: String,
    /// Where unparseable portal responses are dumped
    pub debug_dir: PathBuf,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            base_url: BANNER_BASE_URL.to_string(),
            term: DEFAULT_TERM.to_string(),
            subjects: Vec::new(),
            page_size: 50,
            page_delay: Duration::from_millis(500),
            subject_delay: Duration::from_secs(2),
            request_timeout: Duration::from_secs(15),
            room_writers: 20,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            debug_dir: PathBuf::from("debug"),
        }
    }
}

/// Configuration for the document store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Path of the SQLite database file
    pub db_path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: "ghost.db".to_string(),
        }
    }
}

/// Configuration for the read API.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// Address to bind, e.g. `0.0.0.0:5000`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}
