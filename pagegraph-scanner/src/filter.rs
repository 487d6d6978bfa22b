use std::fmt;
use std::sync::Arc;
use url::form_urlencoded;

/// Returns `true` for URLs that must not be crawled.
pub type SkipPredicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Ordered list of skip predicates. A URL is skipped if any of them matches.
#[derive(Clone, Default)]
pub struct SkipFilter {
    predicates: Vec<SkipPredicate>,
}

impl SkipFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.predicates.push(Arc::new(predicate));
        self
    }

    pub fn push(&mut self, predicate: SkipPredicate) {
        self.predicates.push(predicate);
    }

    pub fn should_skip(&self, url: &str) -> bool {
        self.predicates.iter().any(|skip| skip(url))
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

impl fmt::Debug for SkipFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SkipFilter")
            .field("predicates", &self.predicates.len())
            .finish()
    }
}

/// Skips every URL that does not start with `prefix`.
pub fn outside_prefix(prefix: impl Into<String>) -> impl Fn(&str) -> bool + Send + Sync + 'static {
    let prefix = prefix.into();
    move |url: &str| !url.starts_with(&prefix)
}

/// Skips URLs under `base` that belong to one of the given namespaces,
/// e.g. `https://uk.wikipedia.org/wiki/` + `Special` matches
/// `https://uk.wikipedia.org/wiki/Special:Random`.
///
/// Namespace names are query-escaped the same way the wiki escapes them in hrefs.
pub fn namespace_prefixes<S>(base: &str, namespaces: &[S]) -> impl Fn(&str) -> bool + Send + Sync + 'static
where
    S: AsRef<str>,
{
    let prefixes: Vec<String> = namespaces
        .iter()
        .map(|ns| {
            let escaped: String = form_urlencoded::byte_serialize(ns.as_ref().as_bytes()).collect();
            format!("{}{}:", base, escaped)
        })
        .collect();
    move |url: &str| prefixes.iter().any(|p| url.starts_with(p.as_str()))
}
