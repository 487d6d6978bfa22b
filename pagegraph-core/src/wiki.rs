use url::Url;

/// Main page of the Ukrainian Wikipedia.
pub const DEFAULT_START_URL: &str = "https://uk.wikipedia.org/wiki/%D0%93%D0%BE%D0%BB%D0%BE%D0%B2%D0%BD%D0%B0_%D1%81%D1%82%D0%BE%D1%80%D1%96%D0%BD%D0%BA%D0%B0";

/// Service namespaces whose pages are not articles.
pub const DEFAULT_SKIPPED_NAMESPACES: &[&str] = &[
    "Файл",
    "Портал",
    "Вікіпедія",
    "Шаблон",
    "Спеціальна",
    "Обговорення",
    "Категорія",
    "Special",
    "Довідка",
];

/// `scheme://host/wiki/` for URLs whose path is under `/wiki/`.
pub fn article_prefix(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    if !parsed.path().starts_with("/wiki/") {
        return None;
    }

    let authority = match parsed.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    };
    Some(format!("{}://{}/wiki/", parsed.scheme(), authority))
}

pub fn default_namespaces() -> Vec<String> {
    DEFAULT_SKIPPED_NAMESPACES.iter().map(|ns| ns.to_string()).collect()
}
