//! HTTP session against Banner's class search.
//!
//! Banner keeps search state on the server, scoped to the session:
//! 1. GET classSearch to receive a JSESSIONID cookie and the synchronizer token
//! 2. POST term/search to bind a term to the session
//! 3. POST resetDataForm before every new subject
//! 4. GET searchResults page by page
//!
//! Every request after step 1 carries the token header and the session cookie.

use super::diagnostics::DiagnosticSink;
use super::error::ScrapeError;
use super::pager::SearchPortal;
use super::types::{RawSubject, SearchResponse};
use crate::config::ScrapeConfig;
use async_trait::async_trait;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Response, StatusCode};
use scraper::{Html, Selector};
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use std::sync::LazyLock;
use tracing::{debug, error, info};
use url::Url;

/// Paths for class search endpoints.
const SEARCH_PAGE_PATH: &str = "/ssb/classSearch/classSearch";
const TERM_PATH: &str = "/ssb/term/search";
const RESET_PATH: &str = "/ssb/classSearch/resetDataForm";
const RESULTS_PATH: &str = "/ssb/searchResults/searchResults";
const SUBJECTS_PATH: &str = "/ssb/classSearch/get_subject";

/// Header carrying the anti-forgery token.
pub const TOKEN_HEADER: &str = "X-Synchronizer-Token";

/// File name used when the landing page cannot be parsed.
pub const DEBUG_PAGE_NAME: &str = "debug_page.html";

static TOKEN_META_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[name="synchronizerToken"]"#).unwrap());
static TOKEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"name="synchronizerToken"\s+content="([^"]+)""#).unwrap());

/// Extracts the synchronizer token from the class search landing page.
pub fn extract_token(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let from_meta = document
        .select(&TOKEN_META_SELECTOR)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    // Fallback for pages the HTML parser mangles
    from_meta.or_else(|| {
        TOKEN_REGEX
            .captures(html)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    })
}

/// Short hash of the token, safe to log.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct TokenFingerprint(String);

impl TokenFingerprint {
    pub fn from_token(token: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        let result = hasher.finalize();
        Self(hex::encode(&result[..8]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TokenFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

mod hex {
    pub fn encode(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

/// Session id sent with the term selection; only scopes one run.
fn unique_session_id() -> String {
    format!("guest{}", chrono::Utc::now().timestamp())
}

/// A guest session holding the cookie jar and the synchronizer token.
pub struct SessionClient {
    client: Client,
    base_url: String,
    token: String,
    fingerprint: TokenFingerprint,
}

impl SessionClient {
    /// Opens a guest session by loading the class search page.
    ///
    /// If the token cannot be found the raw page is handed to `sink`, since
    /// that usually means the portal changed shape.
    pub async fn open(
        config: &ScrapeConfig,
        sink: &dyn DiagnosticSink,
    ) -> Result<Self, ScrapeError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/json, text/javascript, */*; q=0.01"),
        );
        headers.insert(
            HeaderName::from_static("x-requested-with"),
            HeaderValue::from_static("XMLHttpRequest"),
        );

        let client = Client::builder()
            .cookie_store(true)
            .default_headers(headers)
            .user_agent(&config.user_agent)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ScrapeError::Network {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        let url = format!("{}{}", base_url, SEARCH_PAGE_PATH);
        info!(url = %url, "Opening guest session");

        let response = client.get(&url).send().await?;
        let body = expect_ok(response, &url).await?;

        let Some(token) = extract_token(&body) else {
            error!(url = %url, body_len = body.len(), "Synchronizer token not found");
            sink.dump(DEBUG_PAGE_NAME, body.as_bytes());
            return Err(ScrapeError::TokenNotFound {
                body_len: body.len(),
            });
        };

        let fingerprint = TokenFingerprint::from_token(&token);
        info!(session = %fingerprint, "Guest session established");

        Ok(Self {
            client,
            base_url,
            token,
            fingerprint,
        })
    }

    /// Binds `term` to the server-side session.
    ///
    /// Must complete before any search; there is no fallback term.
    pub async fn select_term(self, term: &str) -> Result<TermSession, ScrapeError> {
        let session_id = unique_session_id();
        let url = Url::parse_with_params(
            &format!("{}{}", self.base_url, TERM_PATH),
            &[("mode", "search"), ("uniqueSessionId", session_id.as_str())],
        )?;

        info!(term = %term, session = %self.fingerprint, "Selecting term");

        let response = self
            .client
            .post(url.clone())
            .header(TOKEN_HEADER, &self.token)
            .form(&[
                ("term", term),
                ("studyPath", ""),
                ("studyPathText", ""),
                ("startDatepicker", ""),
                ("endDatepicker", ""),
            ])
            .send()
            .await
            .map_err(|e| ScrapeError::TermSelection {
                term: term.to_string(),
                message: e.to_string(),
            })?;

        if response.status() != StatusCode::OK {
            return Err(ScrapeError::TermSelection {
                term: term.to_string(),
                message: format!("{} returned status {}", url, response.status()),
            });
        }

        Ok(TermSession {
            session: self,
            term: term.to_string(),
        })
    }

    /// Fingerprint of the session token.
    pub fn fingerprint(&self) -> &TokenFingerprint {
        &self.fingerprint
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, context: &str) -> Result<T, ScrapeError> {
        let response = self
            .client
            .get(url.clone())
            .header(TOKEN_HEADER, &self.token)
            .send()
            .await?;

        let body = expect_ok(response, url.as_str()).await?;
        debug!(url = %url, bytes = body.len(), "Received response");

        serde_json::from_str(&body).map_err(|e| ScrapeError::decode(context, e))
    }
}

/// A session with its term selected; the only handle that can search.
pub struct TermSession {
    session: SessionClient,
    term: String,
}

impl TermSession {
    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn fingerprint(&self) -> &TokenFingerprint {
        self.session.fingerprint()
    }

    /// Lists every subject code offered in the term.
    pub async fn fetch_subjects(&self) -> Result<Vec<String>, ScrapeError> {
        let url = Url::parse_with_params(
            &format!("{}{}", self.session.base_url, SUBJECTS_PATH),
            &[
                ("searchTerm", ""),
                ("term", self.term.as_str()),
                ("offset", "1"),
                ("max", "500"),
            ],
        )?;

        let subjects: Vec<RawSubject> = self.session.get_json(url, "subject list").await?;
        let codes: Vec<String> = subjects
            .into_iter()
            .map(|s| s.code.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();

        info!(term = %self.term, count = codes.len(), "Fetched subject list");
        Ok(codes)
    }
}

#[async_trait]
impl SearchPortal for TermSession {
    async fn reset_search(&self) -> Result<(), ScrapeError> {
        let url = format!("{}{}", self.session.base_url, RESET_PATH);
        let response = self
            .session
            .client
            .post(&url)
            .header(TOKEN_HEADER, &self.session.token)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .send()
            .await?;

        expect_ok(response, &url).await?;
        Ok(())
    }

    async fn search_page(
        &self,
        subject: &str,
        offset: u32,
        page_size: u32,
    ) -> Result<SearchResponse, ScrapeError> {
        let url = Url::parse_with_params(
            &format!("{}{}", self.session.base_url, RESULTS_PATH),
            &[
                ("txt_subject", subject.to_string()),
                ("txt_term", self.term.clone()),
                ("pageOffset", offset.to_string()),
                ("pageMaxSize", page_size.to_string()),
            ],
        )?;

        self.session
            .get_json(url, &format!("search results for {subject} at offset {offset}"))
            .await
    }
}

/// Reads the body, failing on anything but 200 OK.
async fn expect_ok(response: Response, url: &str) -> Result<String, ScrapeError> {
    let status = response.status();
    let body = response.text().await?;
    if status != StatusCode::OK {
        return Err(ScrapeError::unexpected_status(url, status, &body));
    }
    Ok(body)
}
