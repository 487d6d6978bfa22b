use crate::error::{Result, ScanError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

const DEFAULT_TITLE_SELECTORS: &[&str] = &["h1#firstHeading", "title"];

/// Title and outbound links of one page. Both are empty when the fetch failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageContent {
    pub title: String,
    pub links: Vec<String>,
}

/// Turns one URL into a [`PageContent`].
///
/// Implementations never fail: errors are logged and reported as an empty
/// page. Dropping the returned future must abort any in-flight request.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> PageContent;
}

pub struct HttpFetcher {
    client: Client,
    title_selectors: Vec<Selector>,
    link_selector: Selector,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        Self::with_timeout(10)
    }

    pub fn with_timeout(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("pagegraph/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs((timeout_secs / 2).max(1)))
            .pool_max_idle_per_host(50)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self {
            client,
            title_selectors: parse_selectors(DEFAULT_TITLE_SELECTORS)?,
            link_selector: parse_selector("a[href]")?,
        })
    }

    /// Replaces the title lookup. Selectors are tried in order; the first
    /// element found wins.
    pub fn with_title_selectors(mut self, selectors: &[&str]) -> Result<Self> {
        self.title_selectors = parse_selectors(selectors)?;
        Ok(self)
    }

    pub async fn try_fetch(&self, url: &str) -> Result<PageContent> {
        let body = self.load(url).await?;
        Ok(self.parse(url, &body))
    }

    async fn load(&self, url: &str) -> Result<String> {
        debug!("Fetching {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(ScanError::StatusError {
                url: url.to_string(),
                status,
            });
        }

        Ok(response.text().await?)
    }

    /// Extracts the title and the resolved, fragment-free links of a document.
    pub fn parse(&self, page_url: &str, html: &str) -> PageContent {
        let document = Html::parse_document(html);

        let title = self
            .title_selectors
            .iter()
            .find_map(|selector| document.select(selector).next())
            .map(|element| element.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        let Ok(base) = Url::parse(page_url) else {
            return PageContent {
                title,
                links: Vec::new(),
            };
        };
        let own_url = without_fragment(base.clone()).to_string();

        let links = document
            .select(&self.link_selector)
            .filter_map(|element| element.value().attr("href"))
            .filter_map(|href| resolve_link(&base, href))
            .filter(|link| link != &own_url && link != page_url)
            .collect();

        PageContent { title, links }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> PageContent {
        match self.try_fetch(url).await {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to fetch {}: {}", url, e);
                PageContent::default()
            }
        }
    }
}

fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ScanError::ParseError(format!("selector '{}': {:?}", css, e)))
}

fn parse_selectors(selectors: &[&str]) -> Result<Vec<Selector>> {
    selectors.iter().map(|css| parse_selector(css)).collect()
}

fn without_fragment(mut url: Url) -> Url {
    url.set_fragment(None);
    url
}

/// Resolves `href` against `base`, keeping only http(s) targets.
fn resolve_link(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    let resolved = without_fragment(base.join(href).ok()?);
    match resolved.scheme() {
        "http" | "https" => Some(resolved.to_string()),
        _ => None,
    }
}
