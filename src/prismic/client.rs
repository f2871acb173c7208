//! HTTP client for the content API

use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use super::{ApiInfo, ContentSource, Query, SearchResponse};
use crate::config::SiteConfig;
use crate::error::{Error, Result};

/// Talks to a Prismic-compatible REST API
#[derive(Debug, Clone)]
pub struct PrismicClient {
    http: Client,
    endpoint: Url,
    access_token: Option<String>,
}

impl PrismicClient {
    /// Create a client for the configured endpoint
    pub fn new(config: &SiteConfig) -> Result<Self> {
        let endpoint = Url::parse(config.api_endpoint.trim_end_matches('/'))?;
        let http = Client::builder()
            .user_agent(concat!("spacetraveling/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            endpoint,
            access_token: config.access_token.clone(),
        })
    }

    fn search_url(&self) -> Result<Url> {
        Ok(Url::parse(&format!(
            "{}/documents/search",
            self.endpoint.as_str().trim_end_matches('/')
        ))?)
    }

    /// Append the access token unless the URL already carries one
    fn authorize(&self, url: &mut Url) {
        if let Some(token) = &self.access_token {
            if !url.query_pairs().any(|(k, _)| k == "access_token") {
                url.query_pairs_mut().append_pair("access_token", token);
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        tracing::debug!("GET {}", redact(&url));
        // reqwest errors carry the URL, token included
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| Error::Http(e.without_url()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Api {
                status,
                url: redact(&url),
            });
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Http(e.without_url()))?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl ContentSource for PrismicClient {
    async fn master_ref(&self) -> Result<String> {
        let mut url = self.endpoint.clone();
        self.authorize(&mut url);
        let info: ApiInfo = self.get_json(url).await?;
        info.master_ref()
            .map(str::to_string)
            .ok_or(Error::NoMasterRef)
    }

    async fn search(&self, query: Query) -> Result<SearchResponse> {
        let reference = match &query.reference {
            Some(reference) => reference.clone(),
            None => self.master_ref().await?,
        };

        let mut url = self.search_url()?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("ref", &reference);
            for (key, value) in query.params() {
                pairs.append_pair(key, &value);
            }
        }
        self.authorize(&mut url);

        self.get_json(url).await
    }

    async fn fetch_page(&self, cursor: &str) -> Result<SearchResponse> {
        let mut url = Url::parse(cursor)?;
        self.authorize(&mut url);
        self.get_json(url).await
    }
}

/// Strip the access token before a URL ends up in logs or errors
fn redact(url: &Url) -> String {
    let mut clean = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != "access_token")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    if pairs.is_empty() {
        clean.set_query(None);
    } else {
        clean.query_pairs_mut().clear().extend_pairs(pairs);
    }
    clean.to_string()
}
