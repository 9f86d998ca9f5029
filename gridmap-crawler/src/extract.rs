use crate::record::PageMeta;
use scraper::{Html, Selector};

/// An anchor as it appeared in the document: raw href plus the visible
/// text, in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorLink {
    pub href: String,
    pub text: String,
}

/// Collect every `<a href>` in the document. Anchors with an empty
/// href are skipped; everything else is returned raw for the caller to
/// resolve.
pub fn extract_links(html: &str) -> Vec<AnchorLink> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("a[href]").unwrap();

    let mut links = Vec::new();
    for element in document.select(&selector) {
        if let Some(href) = element.value().attr("href")
            && !href.trim().is_empty()
        {
            let text = element.text().collect::<String>().trim().to_string();
            links.push(AnchorLink {
                href: href.to_string(),
                text,
            });
        }
    }
    links
}

/// Fill page metadata from the document head and headings.
///
/// Every known field is overwritten on each call, so extracting twice
/// from the same document leaves the record unchanged. Fields with no
/// source element become empty strings (or `None` for the canonical
/// link); the caller-owned `extra` map is left alone.
pub fn extract_meta(html: &str, meta: &mut PageMeta) {
    let document = Html::parse_document(html);

    meta.title = select_text(&document, "title");
    meta.meta_description =
        select_attr(&document, "meta[name='description']", "content").unwrap_or_default();
    meta.meta_keywords =
        select_attr(&document, "meta[name='keywords']", "content").unwrap_or_default();
    meta.canonical_link = select_attr(&document, "link[rel='canonical']", "href");

    meta.h1_contents = heading_texts(&document, "h1");
    meta.h1_count = meta.h1_contents.len();
    meta.h2_contents = heading_texts(&document, "h2");
    meta.h2_count = meta.h2_contents.len();
}

fn select_text(document: &Html, css: &str) -> String {
    let selector = Selector::parse(css).unwrap();
    document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

fn select_attr(document: &Html, css: &str, attr: &str) -> Option<String> {
    let selector = Selector::parse(css).unwrap();
    document
        .select(&selector)
        .next()
        .and_then(|element| element.value().attr(attr))
        .map(|value| value.trim().to_string())
}

fn heading_texts(document: &Html, tag: &str) -> Vec<String> {
    let selector = Selector::parse(tag).unwrap();
    document
        .select(&selector)
        .map(|element| element.text().collect::<String>().trim().to_string())
        .collect()
}
