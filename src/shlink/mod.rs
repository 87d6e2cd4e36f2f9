// This file is part of the product LinkPress.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

mod client;
mod types;

pub use client::ShlinkClient;
pub use types::{
    CreateShortUrlRequest, EditShortUrlRequest, Pagination, QrCodeImage, ShortUrl, ShortUrlMeta,
    ShortUrlsPage, ShortUrlsQuery, TagStats, TagsWithStats, Visit, VisitsList, VisitsSummary,
};

/// Failures talking to the remote shortener.
///
/// The console itself owns no link data, so every variant is surfaced to the
/// operator as a rendered error rather than retried.
#[derive(Debug)]
pub enum ShlinkError {
    Configuration(String),
    Transport(String),
    Api { status: u16, detail: String },
    Decode(String),
}

impl ShlinkError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ShlinkError::Api { status: 404, .. })
    }
}

impl std::fmt::Display for ShlinkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShlinkError::Configuration(msg) => write!(f, "Shlink configuration error: {}", msg),
            ShlinkError::Transport(msg) => write!(f, "Shlink request failed: {}", msg),
            ShlinkError::Api { status, detail } => {
                write!(f, "Shlink API returned {}: {}", status, detail)
            }
            ShlinkError::Decode(msg) => write!(f, "Shlink response decode error: {}", msg),
        }
    }
}

impl std::error::Error for ShlinkError {}
