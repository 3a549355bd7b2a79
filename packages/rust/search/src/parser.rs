//! Result-page parser for the DuckDuckGo HTML endpoint.
//!
//! Organic results are `<a class="result__a" href="...">` anchors. The href is
//! usually a redirect of the form `//duckduckgo.com/l/?uddg=<target>&rut=...`,
//! occasionally the target itself. Sponsored blocks reuse the same anchor
//! class inside a `.result--ad` container and point at `duckduckgo.com/y.js`.

use std::sync::LazyLock;

use scraper::{Html, Selector};
use url::Url;

static RESULT_LINK_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a.result__a").expect("result selector"));

static AD_RESULT_LINK_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".result--ad a.result__a").expect("ad result selector")
});

/// Base used to resolve protocol-relative and root-relative redirect hrefs.
const REDIRECT_BASE: &str = "https://duckduckgo.com/";

/// Extract result URLs from a results page, in ranked order.
pub(crate) fn parse_results(html: &str) -> Vec<String> {
    let doc = Html::parse_document(html);
    let Ok(base) = Url::parse(REDIRECT_BASE) else {
        return Vec::new();
    };

    let ads: Vec<_> = doc.select(&AD_RESULT_LINK_SEL).map(|el| el.id()).collect();

    doc.select(&RESULT_LINK_SEL)
        .filter(|el| !ads.contains(&el.id()))
        .filter_map(|el| el.value().attr("href"))
        .filter_map(|href| resolve_href(&base, href))
        .collect()
}

/// Turn a result href into the target URL, unwrapping the redirect if present.
fn resolve_href(base: &Url, href: &str) -> Option<String> {
    let resolved = base.join(href.trim()).ok()?;

    let target = if resolved.path() == "/l/" {
        let uddg = resolved
            .query_pairs()
            .find(|(k, _)| k == "uddg")
            .map(|(_, v)| v.into_owned())?;
        Url::parse(&uddg).ok()?
    } else {
        resolved
    };

    if !matches!(target.scheme(), "http" | "https") || is_engine_host(&target) {
        return None;
    }
    Some(target.to_string())
}

/// Links back into the search engine itself (ad redirects, settings pages).
fn is_engine_host(url: &Url) -> bool {
    url.host_str()
        .is_some_and(|h| h == "duckduckgo.com" || h.ends_with(".duckduckgo.com"))
}
