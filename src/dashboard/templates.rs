//! View fragment loading

use async_trait::async_trait;
use rand::Rng;
use rand::distributions::Alphanumeric;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use crate::api::constants::{CACHE_BUST_PARAM, headers};
use crate::dashboard::markup::Markup;
use crate::dashboard::registry::{ModalId, TemplateKey};
use crate::error::{DashboardError, Result};

/// Whether a fetch may be served from the per-key cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Freshness {
    Cached,
    /// Bypass any cache; the token is appended to the request as `?v=<token>`
    Bust(String),
}

impl Freshness {
    /// Freshness a modal's template must be fetched with
    pub fn for_modal(modal: ModalId) -> Self {
        if modal.is_volatile() {
            Freshness::Bust(CacheBust::volatile_modal())
        } else {
            Freshness::Cached
        }
    }

    pub fn for_screen() -> Self {
        Freshness::Bust(CacheBust::screen())
    }
}

/// Cache-busting token builders
pub struct CacheBust;

impl CacheBust {
    /// Timestamp plus a random suffix; unique even for two navigations in the same millisecond
    pub fn screen() -> String {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(8)
            .map(char::from)
            .collect();
        format!("{}-{}", chrono::Utc::now().timestamp_millis(), suffix.to_lowercase())
    }

    /// Timestamp only
    pub fn volatile_modal() -> String {
        chrono::Utc::now().timestamp_millis().to_string()
    }
}

/// Source of named view fragments
#[async_trait]
pub trait TemplateSource: Send + Sync {
    async fn fetch(&self, key: TemplateKey, freshness: Freshness) -> Result<Markup>;
}

/// Fetches fragments over HTTP from `<base>/screens/<name>.html` and `<base>/modals/<name>.html`
pub struct HttpTemplateSource {
    base_url: String,
    client: reqwest::Client,
    cache: Mutex<HashMap<TemplateKey, Markup>>,
}

impl HttpTemplateSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(headers::USER_AGENT)
            .build()?;
        Ok(Self::with_client(base_url, client))
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Absolute URL for a key, with the cache-busting parameter when requested
    pub fn url_for(&self, key: TemplateKey, freshness: &Freshness) -> String {
        let base = format!("{}/{}", self.base_url, key.path());
        match freshness {
            Freshness::Cached => base,
            Freshness::Bust(token) => format!("{}?{}={}", base, CACHE_BUST_PARAM, urlencoding::encode(token)),
        }
    }

    fn cached(&self, key: TemplateKey) -> Option<Markup> {
        match self.cache.lock() {
            Ok(cache) => cache.get(&key).cloned(),
            Err(poisoned) => poisoned.into_inner().get(&key).cloned(),
        }
    }

    fn store(&self, key: TemplateKey, markup: &Markup) {
        let mut cache = match self.cache.lock() {
            Ok(cache) => cache,
            Err(poisoned) => poisoned.into_inner(),
        };
        cache.insert(key, markup.clone());
    }
}

#[async_trait]
impl TemplateSource for HttpTemplateSource {
    async fn fetch(&self, key: TemplateKey, freshness: Freshness) -> Result<Markup> {
        if freshness == Freshness::Cached {
            if let Some(markup) = self.cached(key) {
                log::debug!("Template cache hit: {}", key);
                return Ok(markup);
            }
        }

        let url = self.url_for(key, &freshness);
        log::debug!("Fetching template {}", url);

        let response = self
            .client
            .get(&url)
            .header("Accept", headers::ACCEPT_HTML)
            .send()
            .await
            .map_err(|e| DashboardError::Network(format!("template {}: {}", key, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DashboardError::Network(format!("template {} returned {}", key, status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| DashboardError::Network(format!("template {}: {}", key, e)))?;

        let markup = Markup::new(body);
        self.store(key, &markup);
        Ok(markup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::registry::ScreenId;

    #[test]
    fn test_screen_tokens_are_unique() {
        let a = CacheBust::screen();
        let b = CacheBust::screen();
        assert_ne!(a, b);
        assert!(a.contains('-'));
    }

    #[test]
    fn test_volatile_token_is_timestamp_only() {
        let token = CacheBust::volatile_modal();
        assert!(token.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_modal_freshness() {
        assert!(matches!(Freshness::for_modal(ModalId::AddClass), Freshness::Bust(_)));
        assert_eq!(Freshness::for_modal(ModalId::Homework), Freshness::Cached);
    }

    #[test]
    fn test_url_for() {
        let source = HttpTemplateSource::with_client("http://localhost:3000/", reqwest::Client::new());
        assert_eq!(
            source.url_for(ScreenId::Home.template_key(), &Freshness::Cached),
            "http://localhost:3000/screens/home.html"
        );
        assert_eq!(
            source.url_for(ModalId::AddClass.template_key(), &Freshness::Bust("123".into())),
            "http://localhost:3000/modals/add-class.html?v=123"
        );
    }
}
