// This file is part of the product LinkPress.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::admin::shared::{console_context, render_console_page, serve_shlink_error};
use crate::app_state::AppState;
use crate::config::ValidatedConfig;
use crate::util::CsrfTokenStore;
use actix_web::{HttpRequest, HttpResponse, Result, web};
use minijinja::context;
use serde::Deserialize;

const SIZE_OPTIONS: [u32; 4] = [200, 300, 400, 600];

#[derive(Debug, Deserialize)]
pub struct QrQuery {
    #[serde(default)]
    pub short_code: Option<String>,
    #[serde(default)]
    pub size: Option<u32>,
    #[serde(default)]
    pub format: Option<String>,
}

/// Clamp untrusted query values to what the page offers; anything else
/// falls back to the configured defaults.
fn effective_options(config: &ValidatedConfig, query: &QrQuery) -> (u32, String) {
    let size = query
        .size
        .filter(|size| SIZE_OPTIONS.contains(size))
        .unwrap_or(config.shlink.qr_size);
    let format = query
        .format
        .as_deref()
        .filter(|format| matches!(*format, "png" | "svg"))
        .unwrap_or(&config.shlink.qr_format)
        .to_string();
    (size, format)
}

pub async fn page(
    req: HttpRequest,
    query: web::Query<QrQuery>,
    config: web::Data<ValidatedConfig>,
    app_state: web::Data<AppState>,
    csrf_store: web::Data<CsrfTokenStore>,
) -> Result<HttpResponse> {
    let (size, format) = effective_options(&config, &query);
    let short_code = query
        .short_code
        .as_deref()
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(str::to_string);

    let base = console_context(&req, &config, &csrf_store, "qr");
    render_console_page(
        &app_state,
        "admin/qr.html",
        context! {
            short_code => short_code.unwrap_or_default(),
            size => size,
            format => format,
            size_options => SIZE_OPTIONS,
            ..base.to_value()
        },
    )
}

/// Proxy the QR image bytes from the shortener so the operator's browser
/// never talks to it directly.
pub async fn image(
    path: web::Path<String>,
    query: web::Query<QrQuery>,
    config: web::Data<ValidatedConfig>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let short_code = path.into_inner();
    let (size, format) = effective_options(&config, &query);

    match app_state.shlink.fetch_qr_code(&short_code, size, &format).await {
        Ok(image) => Ok(HttpResponse::Ok()
            .content_type(image.content_type)
            .body(image.bytes)),
        Err(error) => serve_shlink_error(&app_state, &error),
    }
}
