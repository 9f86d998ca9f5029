use crate::urls;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use url::Url;

/// Lifecycle of a discovered link.
///
/// `Unvisited` moves to `Trying` when a visit starts, then to `Visited`
/// or `VisitedWithError`. Links that will never be fetched (wrong
/// scheme, rejected by the filter, past the depth bound) move straight
/// to `ShouldNotVisit`. The three end states and `ShouldNotVisit` are
/// terminal: once reached, later encounters of the same link can only
/// merge metadata, never change the status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VisitStatus {
    Unvisited,
    Trying,
    Visited,
    VisitedWithError,
    ShouldNotVisit,
}

impl VisitStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            VisitStatus::Visited | VisitStatus::VisitedWithError | VisitStatus::ShouldNotVisit
        )
    }
}

/// What went wrong on a page that was tried. Either the server answered
/// with an error status, or the attempt failed locally before a status
/// existed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ErrorInfo {
    HttpStatus { code: u16 },
    Failure { message: String },
}

/// A caller-supplied metadata value in the `extra` map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Count(usize),
    Text(String),
    List(Vec<String>),
}

/// Page metadata pulled from the document head and headings.
///
/// Description and keywords default to the empty string rather than
/// being absent, so consumers always see the keys. The anchor
/// bookkeeping fields are copied over from the owning record when it
/// is projected; extraction never writes them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub title: String,
    pub meta_description: String,
    pub meta_keywords: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical_link: Option<String>,
    pub h1_count: usize,
    pub h1_contents: Vec<String>,
    pub h2_count: usize,
    pub h2_contents: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub original_urls: Vec<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub extra: HashMap<String, MetaValue>,
}

/// One entry in the link table. A record is created the first time a
/// URL is discovered and is never removed; its depth is fixed at that
/// first discovery.
#[derive(Debug, Clone)]
pub struct LinkRecord {
    pub url: Url,
    pub key: String,
    pub original_urls: Vec<String>,
    pub parent: Option<String>,
    pub depth: usize,
    pub status: VisitStatus,
    pub status_code: Option<u16>,
    pub status_text: Option<String>,
    pub content_type: Option<String>,
    pub error: Option<ErrorInfo>,
    pub meta: PageMeta,
    pub links_text: Option<String>,
    pub href: Option<String>,
    pub internal: bool,
}

impl LinkRecord {
    pub fn new(
        url: Url,
        raw: String,
        parent: Option<String>,
        depth: usize,
        internal: bool,
    ) -> Self {
        let key = urls::canonical_key(&url);
        Self {
            url,
            key,
            original_urls: vec![raw],
            parent,
            depth,
            status: VisitStatus::Unvisited,
            status_code: None,
            status_text: None,
            content_type: None,
            error: None,
            meta: PageMeta::default(),
            links_text: None,
            href: None,
            internal,
        }
    }

    /// Start a visit. Returns false when the record is not eligible
    /// (already tried, or in a terminal state).
    pub fn begin_visit(&mut self) -> bool {
        if self.status == VisitStatus::Unvisited {
            self.status = VisitStatus::Trying;
            true
        } else {
            false
        }
    }

    pub fn finish_visited(&mut self) {
        if self.status == VisitStatus::Trying {
            self.status = VisitStatus::Visited;
        }
    }

    pub fn finish_with_error(&mut self, error: ErrorInfo) {
        if self.status == VisitStatus::Trying {
            self.status = VisitStatus::VisitedWithError;
            self.error = Some(error);
        }
    }

    /// Mark a link that must never be fetched. Only an untouched record
    /// can be excluded.
    pub fn exclude(&mut self) {
        if self.status == VisitStatus::Unvisited {
            self.status = VisitStatus::ShouldNotVisit;
        }
    }

    pub fn project(&self) -> PageRecord {
        let mut meta = self.meta.clone();
        meta.links_text = self.links_text.clone();
        meta.href = self.href.clone();
        meta.original_urls = self.original_urls.clone();
        PageRecord {
            full_url: self.url.to_string(),
            path: urls::url_path(&self.url),
            meta,
            parent_url: self.parent.clone(),
            status_code: self.status_code,
            status: self.status_text.clone(),
            content_type: self.content_type.clone(),
            error: self.error.clone(),
            depth: self.depth,
            state: self.status,
        }
    }
}

/// The reportable view of a record.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRecord {
    pub full_url: String,
    pub path: String,
    #[serde(rename = "metaInfo")]
    pub meta: PageMeta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(rename = "errorInfo", skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
    #[serde(rename = "crawlDepth")]
    pub depth: usize,
    pub state: VisitStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> LinkRecord {
        let url = Url::parse("https://example.com/about").unwrap();
        LinkRecord::new(url, "/about".to_string(), None, 1, true)
    }

    #[test]
    fn test_new_record_starts_unvisited() {
        let rec = record();
        assert_eq!(rec.status, VisitStatus::Unvisited);
        assert_eq!(rec.key, "https://example.com/about");
        assert_eq!(rec.original_urls, vec!["/about".to_string()]);
        assert!(rec.error.is_none());
    }

    #[test]
    fn test_visit_lifecycle() {
        let mut rec = record();
        assert!(rec.begin_visit());
        assert_eq!(rec.status, VisitStatus::Trying);
        rec.finish_visited();
        assert_eq!(rec.status, VisitStatus::Visited);
    }

    #[test]
    fn test_begin_visit_only_once() {
        let mut rec = record();
        assert!(rec.begin_visit());
        assert!(!rec.begin_visit());
    }

    #[test]
    fn test_error_lifecycle() {
        let mut rec = record();
        rec.begin_visit();
        rec.finish_with_error(ErrorInfo::HttpStatus { code: 404 });
        assert_eq!(rec.status, VisitStatus::VisitedWithError);
        assert_eq!(rec.error, Some(ErrorInfo::HttpStatus { code: 404 }));
    }

    #[test]
    fn test_terminal_states_are_stable() {
        let mut rec = record();
        rec.begin_visit();
        rec.finish_visited();

        // Nothing moves a visited record
        rec.exclude();
        assert_eq!(rec.status, VisitStatus::Visited);
        rec.finish_with_error(ErrorInfo::Failure {
            message: "late".to_string(),
        });
        assert_eq!(rec.status, VisitStatus::Visited);
        assert!(rec.error.is_none());

        let mut excluded = record();
        excluded.exclude();
        assert!(!excluded.begin_visit());
        assert_eq!(excluded.status, VisitStatus::ShouldNotVisit);
    }

    #[test]
    fn test_exclude_requires_untouched_record() {
        let mut rec = record();
        rec.begin_visit();
        rec.exclude();
        assert_eq!(rec.status, VisitStatus::Trying);
    }

    #[test]
    fn test_meta_defaults_to_empty_strings() {
        let meta = PageMeta::default();
        assert_eq!(meta.title, "");
        assert_eq!(meta.meta_description, "");
        assert_eq!(meta.meta_keywords, "");
        assert!(meta.canonical_link.is_none());
        assert_eq!(meta.h1_count, 0);
        assert!(meta.h1_contents.is_empty());
    }

    #[test]
    fn test_projection_field_names() {
        let mut rec = record();
        rec.begin_visit();
        rec.status_code = Some(200);
        rec.status_text = Some("OK".to_string());
        rec.content_type = Some("text/html".to_string());
        rec.finish_visited();

        let json = serde_json::to_value(rec.project()).unwrap();
        assert_eq!(json["fullUrl"], "https://example.com/about");
        assert_eq!(json["path"], "/about");
        assert_eq!(json["statusCode"], 200);
        assert_eq!(json["status"], "OK");
        assert_eq!(json["contentType"], "text/html");
        assert_eq!(json["crawlDepth"], 1);
        assert_eq!(json["state"], "visited");
        assert!(json["metaInfo"]["metaDescription"].is_string());
        assert!(json.get("errorInfo").is_none());
    }

    #[test]
    fn test_projection_carries_anchor_bookkeeping() {
        let mut rec = record();
        rec.links_text = Some("About us".to_string());
        rec.href = Some("/about".to_string());
        rec.original_urls.push("/about?ref=nav".to_string());

        let json = serde_json::to_value(rec.project()).unwrap();
        assert_eq!(json["metaInfo"]["linksText"], "About us");
        assert_eq!(json["metaInfo"]["href"], "/about");
        assert_eq!(
            json["metaInfo"]["originalUrls"],
            serde_json::json!(["/about", "/about?ref=nav"])
        );
        // Extraction-owned meta on the record itself stays untouched
        assert!(rec.meta.links_text.is_none());
    }

    #[test]
    fn test_error_info_serialization() {
        let status = serde_json::to_value(ErrorInfo::HttpStatus { code: 500 }).unwrap();
        assert_eq!(status["kind"], "http_status");
        assert_eq!(status["code"], 500);

        let failure = serde_json::to_value(ErrorInfo::Failure {
            message: "connection refused".to_string(),
        })
        .unwrap();
        assert_eq!(failure["kind"], "failure");
        assert_eq!(failure["message"], "connection refused");
    }

    #[test]
    fn test_meta_extra_values() {
        let mut meta = PageMeta::default();
        meta.extra
            .insert("generator".to_string(), MetaValue::Text("hugo".to_string()));
        meta.extra.insert("imgCount".to_string(), MetaValue::Count(4));

        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["extra"]["generator"], "hugo");
        assert_eq!(json["extra"]["imgCount"], 4);
    }
}
