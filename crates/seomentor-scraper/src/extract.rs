//! Homepage signal extraction over the html5ever-backed `scraper` parser.
//!
//! The parser never fails on irregular markup, so the only rejected inputs
//! are ones that carry no document at all.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use seomentor_core::PageSignals;
use url::Url;

use crate::error::ExtractError;

static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("valid title selector"));
static META_NAMED: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("meta[name]").expect("valid meta selector"));
static H1: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1").expect("valid h1 selector"));
static H2: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h2").expect("valid h2 selector"));
static ANCHOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid anchor selector"));
static IMG: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img").expect("valid img selector"));
static ANY: LazyLock<Selector> = LazyLock::new(|| Selector::parse("*").expect("valid selector"));

/// Elements whose text never counts as visible.
const HIDDEN_CONTAINERS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Elements html5ever synthesizes for any input, markup or not.
const IMPLIED_ELEMENTS: &[&str] = &["html", "head", "body"];

const IGNORED_HREF_PREFIXES: &[&str] = &["javascript:", "mailto:", "tel:"];

/// Extract [`PageSignals`] from a document body fetched from `url`.
///
/// # Errors
///
/// - [`ExtractError::InvalidUrl`] when `url` does not parse or has no host.
/// - [`ExtractError::EmptyDocument`] when `body` is empty or whitespace.
/// - [`ExtractError::NotMarkup`] when `body` holds no elements.
pub fn extract_signals(body: &str, url: &str) -> Result<PageSignals, ExtractError> {
    let base = Url::parse(url).map_err(|e| ExtractError::InvalidUrl {
        url: url.to_owned(),
        reason: e.to_string(),
    })?;
    let host = base
        .host_str()
        .filter(|h| !h.is_empty())
        .map(str::to_ascii_lowercase)
        .ok_or_else(|| ExtractError::InvalidUrl {
            url: url.to_owned(),
            reason: "missing host".to_owned(),
        })?;

    if body.trim().is_empty() {
        return Err(ExtractError::EmptyDocument {
            url: url.to_owned(),
        });
    }

    let document = Html::parse_document(body);
    let has_markup = document
        .select(&ANY)
        .any(|el| !IMPLIED_ELEMENTS.contains(&el.value().name()));
    if !has_markup {
        return Err(ExtractError::NotMarkup {
            url: url.to_owned(),
        });
    }

    let signals = PageSignals {
        title: title(&document),
        meta_description: meta_description(&document),
        h1_count: count(&document, &H1),
        h2_count: count(&document, &H2),
        word_count: visible_word_count(&document),
        internal_link_count: internal_link_count(&document, &base, &host),
        missing_alt_image_count: missing_alt_count(&document),
    };

    tracing::debug!(
        url,
        h1 = signals.h1_count,
        h2 = signals.h2_count,
        words = signals.word_count,
        internal_links = signals.internal_link_count,
        missing_alt = signals.missing_alt_image_count,
        "extracted page signals"
    );

    Ok(signals)
}

fn saturating_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

fn count(document: &Html, selector: &Selector) -> u32 {
    saturating_u32(document.select(selector).count())
}

fn title(document: &Html) -> String {
    document
        .select(&TITLE)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_owned())
        .unwrap_or_default()
}

fn meta_description(document: &Html) -> String {
    document
        .select(&META_NAMED)
        .find(|el| {
            el.value()
                .attr("name")
                .is_some_and(|name| name.trim().eq_ignore_ascii_case("description"))
        })
        .and_then(|el| el.value().attr("content"))
        .map(|content| content.trim().to_owned())
        .unwrap_or_default()
}

fn is_hidden(element: ElementRef<'_>) -> bool {
    HIDDEN_CONTAINERS.contains(&element.value().name())
}

fn visible_word_count(document: &Html) -> u32 {
    let words: usize = document
        .root_element()
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let hidden = node
                .ancestors()
                .filter_map(ElementRef::wrap)
                .any(is_hidden);
            (!hidden).then(|| text.split_whitespace().count())
        })
        .sum();
    saturating_u32(words)
}

fn internal_link_count(document: &Html, base: &Url, host: &str) -> u32 {
    let n = document
        .select(&ANCHOR)
        .filter_map(|el| el.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty() && !href.starts_with('#'))
        .filter(|href| {
            let lower = href.to_ascii_lowercase();
            !IGNORED_HREF_PREFIXES.iter().any(|p| lower.starts_with(p))
        })
        .filter_map(|href| base.join(href).ok())
        .filter(|resolved| {
            resolved
                .host_str()
                .is_some_and(|h| h.eq_ignore_ascii_case(host))
        })
        .count();
    saturating_u32(n)
}

fn missing_alt_count(document: &Html) -> u32 {
    let n = document
        .select(&IMG)
        .filter(|img| img.value().attr("alt").is_none_or(|alt| alt.trim().is_empty()))
        .count();
    saturating_u32(n)
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
