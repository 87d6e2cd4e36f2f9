// This file is part of the product LinkPress.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::ShlinkError;
use super::types::{
    ApiProblem, CreateShortUrlRequest, EditShortUrlRequest, QrCodeImage, RenameTagRequest,
    ShortUrl, ShortUrlsEnvelope, ShortUrlsPage, ShortUrlsQuery, TagsEnvelope, TagsWithStats,
    VisitsEnvelope, VisitsList,
};
use crate::config::ValidatedShlinkConfig;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use url::Url;
use uuid::Uuid;

const API_KEY_HEADER: &str = "X-Api-Key";

/// Typed client for the remote shortener's REST API.
///
/// Constructed once at startup from validated configuration and shared via
/// `AppState`; the underlying reqwest client pools connections internally.
pub struct ShlinkClient {
    http: Client,
    base_url: Url,
    api_key: String,
}

impl ShlinkClient {
    pub fn new(config: &ValidatedShlinkConfig) -> Result<Self, ShlinkError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|error| ShlinkError::Configuration(error.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn url(&self, segments: &[&str]) -> Result<Url, ShlinkError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ShlinkError::Configuration("Shlink base URL cannot hold a path".to_string())
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn rest_url(&self, segments: &[&str]) -> Result<Url, ShlinkError> {
        let mut all = vec!["rest", "v3"];
        all.extend_from_slice(segments);
        self.url(&all)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Response, ShlinkError> {
        request
            .header(API_KEY_HEADER, &self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|error| ShlinkError::Transport(error.to_string()))
    }

    async fn expect_success(&self, response: Response) -> Result<Response, ShlinkError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        // Shlink reports failures as RFC 7807 problem documents.
        let detail = response
            .json::<ApiProblem>()
            .await
            .ok()
            .and_then(ApiProblem::message)
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_string()
            });
        Err(ShlinkError::Api {
            status: status.as_u16(),
            detail,
        })
    }

    async fn decode<T: DeserializeOwned>(&self, response: Response) -> Result<T, ShlinkError> {
        response
            .json::<T>()
            .await
            .map_err(|error| ShlinkError::Decode(error.to_string()))
    }

    pub async fn list_short_urls(
        &self,
        query: &ShortUrlsQuery,
    ) -> Result<ShortUrlsPage, ShlinkError> {
        let mut request = self
            .http
            .get(self.rest_url(&["short-urls"])?)
            .query(&[
                ("page", query.page.to_string()),
                ("itemsPerPage", query.items_per_page.to_string()),
            ]);
        if let Some(term) = &query.search_term {
            request = request.query(&[("searchTerm", term.as_str())]);
        }
        for tag in &query.tags {
            request = request.query(&[("tags[]", tag.as_str())]);
        }

        let response = self.expect_success(self.send(request).await?).await?;
        let envelope: ShortUrlsEnvelope = self.decode(response).await?;
        Ok(envelope.short_urls)
    }

    pub async fn get_short_url(&self, short_code: &str) -> Result<ShortUrl, ShlinkError> {
        let request = self.http.get(self.rest_url(&["short-urls", short_code])?);
        let response = self.expect_success(self.send(request).await?).await?;
        self.decode(response).await
    }

    pub async fn create_short_url(
        &self,
        create: &CreateShortUrlRequest,
    ) -> Result<ShortUrl, ShlinkError> {
        let request = self
            .http
            .post(self.rest_url(&["short-urls"])?)
            .json(create);
        let response = self.expect_success(self.send(request).await?).await?;
        self.decode(response).await
    }

    pub async fn edit_short_url(
        &self,
        short_code: &str,
        edit: &EditShortUrlRequest,
    ) -> Result<ShortUrl, ShlinkError> {
        let request = self
            .http
            .patch(self.rest_url(&["short-urls", short_code])?)
            .json(edit);
        let response = self.expect_success(self.send(request).await?).await?;
        self.decode(response).await
    }

    pub async fn delete_short_url(&self, short_code: &str) -> Result<(), ShlinkError> {
        let request = self
            .http
            .delete(self.rest_url(&["short-urls", short_code])?);
        self.expect_success(self.send(request).await?).await?;
        Ok(())
    }

    pub async fn list_tags(&self) -> Result<TagsWithStats, ShlinkError> {
        let request = self
            .http
            .get(self.rest_url(&["tags"])?)
            .query(&[("withStats", "true")]);
        let response = self.expect_success(self.send(request).await?).await?;
        let envelope: TagsEnvelope = self.decode(response).await?;
        Ok(envelope.tags)
    }

    pub async fn rename_tag(&self, old_name: &str, new_name: &str) -> Result<(), ShlinkError> {
        let request = self.http.put(self.rest_url(&["tags"])?).json(&RenameTagRequest {
            old_name: old_name.to_string(),
            new_name: new_name.to_string(),
        });
        self.expect_success(self.send(request).await?).await?;
        Ok(())
    }

    pub async fn delete_tags(&self, tags: &[String]) -> Result<(), ShlinkError> {
        let mut request = self.http.delete(self.rest_url(&["tags"])?);
        for tag in tags {
            request = request.query(&[("tags[]", tag.as_str())]);
        }
        self.expect_success(self.send(request).await?).await?;
        Ok(())
    }

    /// Create tags without an associated short URL.
    ///
    /// The remote API has no direct tag-creation endpoint, so this creates a
    /// throwaway short URL carrying the tags and deletes it again. The tags
    /// survive the deletion. See DESIGN.md for the capability-gap note.
    pub async fn create_tags(&self, tags: &[String]) -> Result<(), ShlinkError> {
        let placeholder = format!(
            "https://example.com/tag-placeholder-{}",
            Uuid::new_v4().simple()
        );
        let created = self
            .create_short_url(&CreateShortUrlRequest {
                long_url: placeholder,
                tags: tags.to_vec(),
                ..CreateShortUrlRequest::default()
            })
            .await?;

        if let Err(error) = self.delete_short_url(&created.short_code).await {
            log::error!(
                "Tag placeholder short URL {} could not be deleted: {}",
                created.short_code,
                error
            );
            return Err(error);
        }
        Ok(())
    }

    pub async fn list_visits(&self) -> Result<VisitsList, ShlinkError> {
        let request = self.http.get(self.rest_url(&["visits"])?);
        let response = self.expect_success(self.send(request).await?).await?;
        let envelope: VisitsEnvelope = self.decode(response).await?;
        Ok(envelope.visits)
    }

    pub async fn short_url_visits(&self, short_code: &str) -> Result<VisitsList, ShlinkError> {
        let request = self
            .http
            .get(self.rest_url(&["short-urls", short_code, "visits"])?);
        let response = self.expect_success(self.send(request).await?).await?;
        let envelope: VisitsEnvelope = self.decode(response).await?;
        Ok(envelope.visits)
    }

    /// The remote QR endpoint for a short code. Image rendering stays on the
    /// shortener's side; the console only builds the URL and proxies bytes.
    pub fn qr_code_url(
        &self,
        short_code: &str,
        size: u32,
        format: &str,
    ) -> Result<Url, ShlinkError> {
        let mut url = self.url(&[short_code, "qr-code"])?;
        url.query_pairs_mut()
            .append_pair("size", &size.to_string())
            .append_pair("format", format);
        Ok(url)
    }

    pub async fn fetch_qr_code(
        &self,
        short_code: &str,
        size: u32,
        format: &str,
    ) -> Result<QrCodeImage, ShlinkError> {
        let url = self.qr_code_url(short_code, size, format)?;
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|error| ShlinkError::Transport(error.to_string()))?;
        let response = self.expect_success(response).await?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = response
            .bytes()
            .await
            .map_err(|error| ShlinkError::Transport(error.to_string()))?;

        Ok(QrCodeImage {
            content_type,
            bytes: bytes.to_vec(),
        })
    }
}
