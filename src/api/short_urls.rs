// This file is part of the product LinkPress.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::admin::shared::log_and_return_generic_error;
use crate::app_state::AppState;
use crate::config::ValidatedConfig;
use crate::iam::AuthRequest;
use crate::shlink::{ShlinkError, ShortUrl, ShortUrlsQuery};
use crate::tags;
use actix_web::{HttpRequest, HttpResponse, http::StatusCode, web};
use serde::{Deserialize, Serialize};

// JSON mirror of the listing for the console's fetch calls. Same display
// policy as the HTML pages: custom tag values only.
#[derive(Serialize)]
struct ShortUrlItem {
    short_code: String,
    short_url: String,
    long_url: String,
    date_created: String,
    visits: u64,
    display_tags: Vec<String>,
    utm: tags::UtmParameters,
}

impl ShortUrlItem {
    fn from_short_url(short_url: &ShortUrl) -> Self {
        Self {
            short_code: short_url.short_code.clone(),
            short_url: short_url.short_url.clone(),
            long_url: short_url.long_url.clone(),
            date_created: short_url.date_created.clone(),
            visits: short_url.visits_summary.total,
            display_tags: tags::display_tags(&short_url.tags),
            utm: tags::extract_utm_parameters(&short_url.tags),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default)]
    pub search: Option<String>,
}

fn default_page() -> u32 {
    1
}

fn require_staff(req: &HttpRequest, config: &ValidatedConfig) -> Option<HttpResponse> {
    if req.has_role(&config.auth.staff_role) {
        None
    } else {
        Some(
            HttpResponse::Unauthorized().json(serde_json::json!({
                "success": false,
                "message": "Authentication required",
            })),
        )
    }
}

fn shlink_status(error: &ShlinkError) -> StatusCode {
    if error.is_not_found() {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

pub async fn list(
    req: HttpRequest,
    query: web::Query<ListQuery>,
    config: web::Data<ValidatedConfig>,
    app_state: web::Data<AppState>,
) -> HttpResponse {
    if let Some(rejection) = require_staff(&req, &config) {
        return rejection;
    }

    let listing = ShortUrlsQuery {
        page: query.page.max(1),
        search_term: query.search.clone().filter(|term| !term.trim().is_empty()),
        ..ShortUrlsQuery::default()
    };

    match app_state.shlink.list_short_urls(&listing).await {
        Ok(page) => {
            let items: Vec<ShortUrlItem> =
                page.data.iter().map(ShortUrlItem::from_short_url).collect();
            HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "data": items,
                "pagination": {
                    "current_page": page.pagination.current_page,
                    "pages_count": page.pagination.pages_count,
                    "total_items": page.pagination.total_items,
                },
            }))
        }
        Err(error) => {
            log_and_return_generic_error("list short URLs", &error, shlink_status(&error))
        }
    }
}

pub async fn detail(
    req: HttpRequest,
    path: web::Path<String>,
    config: web::Data<ValidatedConfig>,
    app_state: web::Data<AppState>,
) -> HttpResponse {
    if let Some(rejection) = require_staff(&req, &config) {
        return rejection;
    }

    let short_code = path.into_inner();
    match app_state.shlink.get_short_url(&short_code).await {
        Ok(short_url) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": ShortUrlItem::from_short_url(&short_url),
        })),
        Err(error) => {
            log_and_return_generic_error("fetch short URL", &error, shlink_status(&error))
        }
    }
}
