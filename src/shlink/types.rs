// This file is part of the product LinkPress.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// Wire records for the Shlink REST API (v3). One explicit shape per
// endpoint; anything the remote adds that we do not model is ignored on
// deserialization, and we never serialize fields the endpoint does not take.

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitsSummary {
    pub total: u64,
    #[serde(default)]
    pub non_bots: u64,
    #[serde(default)]
    pub bots: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortUrlMeta {
    pub valid_since: Option<String>,
    pub valid_until: Option<String>,
    pub max_visits: Option<u64>,
}

/// A short URL as the remote service reports it. Owned entirely by the
/// shortener; the console keeps it only for request-scoped rendering.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortUrl {
    pub short_code: String,
    pub short_url: String,
    pub long_url: String,
    pub date_created: String,
    pub visits_summary: VisitsSummary,
    #[serde(default)]
    pub tags: Vec<String>,
    pub title: Option<String>,
    #[serde(default)]
    pub meta: ShortUrlMeta,
    #[serde(default)]
    pub crawlable: Option<bool>,
    #[serde(default)]
    pub forward_query: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub pages_count: u32,
    pub total_items: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShortUrlsPage {
    pub data: Vec<ShortUrl>,
    pub pagination: Pagination,
}

// GET /rest/v3/short-urls wraps the page in a "shortUrls" envelope.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ShortUrlsEnvelope {
    pub short_urls: ShortUrlsPage,
}

/// Listing parameters for the short URL index.
#[derive(Debug, Clone)]
pub struct ShortUrlsQuery {
    pub page: u32,
    pub items_per_page: u32,
    pub search_term: Option<String>,
    pub tags: Vec<String>,
}

impl Default for ShortUrlsQuery {
    fn default() -> Self {
        Self {
            page: 1,
            items_per_page: 20,
            search_term: None,
            tags: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateShortUrlRequest {
    pub long_url: String,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_since: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_visits: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crawlable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forward_query: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditShortUrlRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_since: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_visits: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crawlable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forward_query: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagStats {
    pub short_urls_count: u64,
    pub visits_count: u64,
}

/// GET /rest/v3/tags?withStats=true: tag names plus per-tag counters.
#[derive(Debug, Clone, Deserialize)]
pub struct TagsWithStats {
    pub data: Vec<String>,
    #[serde(default)]
    pub stats: HashMap<String, TagStats>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TagsEnvelope {
    pub tags: TagsWithStats,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RenameTagRequest {
    pub old_name: String,
    pub new_name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visit {
    pub date: String,
    #[serde(default)]
    pub referer: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub visited_url: Option<String>,
    #[serde(default)]
    pub potential_bot: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VisitsList {
    pub data: Vec<Visit>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VisitsEnvelope {
    pub visits: VisitsList,
}

// RFC 7807 problem body the API uses for error responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiProblem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

impl ApiProblem {
    pub fn message(self) -> Option<String> {
        self.detail.or(self.title)
    }
}

/// QR image bytes proxied from the remote shortener.
#[derive(Debug, Clone)]
pub struct QrCodeImage {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn short_urls_envelope_deserializes_remote_shape() {
        let envelope: ShortUrlsEnvelope = serde_json::from_value(json!({
            "shortUrls": {
                "data": [{
                    "shortCode": "abc123",
                    "shortUrl": "https://s.example.com/abc123",
                    "longUrl": "https://example.com/landing?x=1",
                    "dateCreated": "2026-01-15T09:30:00+00:00",
                    "visitsSummary": {"total": 42, "nonBots": 40, "bots": 2},
                    "tags": ["custom:launch", "createdBy:ops@example.com"],
                    "title": "Landing",
                    "meta": {"validSince": null, "validUntil": null, "maxVisits": null},
                    "crawlable": true,
                    "forwardQuery": true
                }],
                "pagination": {"currentPage": 1, "pagesCount": 3, "totalItems": 55}
            }
        }))
        .expect("short urls envelope should deserialize");

        let page = envelope.short_urls;
        assert_eq!(page.pagination.total_items, 55);
        assert_eq!(page.data[0].short_code, "abc123");
        assert_eq!(page.data[0].visits_summary.non_bots, 40);
        assert_eq!(page.data[0].tags.len(), 2);
    }

    #[test]
    fn short_url_tolerates_missing_optional_fields() {
        let short_url: ShortUrl = serde_json::from_value(json!({
            "shortCode": "abc123",
            "shortUrl": "https://s.example.com/abc123",
            "longUrl": "https://example.com/",
            "dateCreated": "2026-01-15T09:30:00+00:00",
            "visitsSummary": {"total": 0},
            "title": null
        }))
        .expect("short url should deserialize");

        assert!(short_url.tags.is_empty());
        assert_eq!(short_url.meta.max_visits, None);
        assert_eq!(short_url.crawlable, None);
    }

    #[test]
    fn tags_envelope_reads_stats_map() {
        let envelope: TagsEnvelope = serde_json::from_value(json!({
            "tags": {
                "data": ["custom:launch", "team:growth"],
                "stats": {
                    "custom:launch": {"shortUrlsCount": 3, "visitsCount": 120}
                }
            }
        }))
        .expect("tags envelope should deserialize");

        assert_eq!(envelope.tags.data.len(), 2);
        assert_eq!(envelope.tags.stats["custom:launch"].visits_count, 120);
    }

    #[test]
    fn create_request_omits_unset_fields() {
        let request = CreateShortUrlRequest {
            long_url: "https://example.com/".to_string(),
            tags: vec!["custom:launch".to_string()],
            ..CreateShortUrlRequest::default()
        };
        let value = serde_json::to_value(&request).expect("serialize");
        assert_eq!(value["longUrl"], "https://example.com/");
        assert!(value.get("customSlug").is_none());
        assert!(value.get("maxVisits").is_none());
    }
}
