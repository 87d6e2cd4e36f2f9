// This file is part of the product LinkPress.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::admin::shared::{console_context, render_console_page, serve_shlink_error};
use crate::app_state::AppState;
use crate::config::ValidatedConfig;
use crate::shlink::VisitsList;
use crate::util::CsrfTokenStore;
use actix_web::{HttpRequest, HttpResponse, Result, web};
use minijinja::context;
use serde::Serialize;

#[derive(Serialize)]
struct VisitRow {
    date: String,
    referer: String,
    user_agent: String,
    potential_bot: bool,
}

fn visit_rows(visits: &VisitsList) -> Vec<VisitRow> {
    visits
        .data
        .iter()
        .map(|visit| VisitRow {
            date: visit.date.clone(),
            referer: visit
                .referer
                .clone()
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| "direct".to_string()),
            user_agent: visit.user_agent.clone().unwrap_or_default(),
            potential_bot: visit.potential_bot,
        })
        .collect()
}

fn render_visits_page(
    req: &HttpRequest,
    config: &ValidatedConfig,
    app_state: &AppState,
    csrf_store: &CsrfTokenStore,
    short_code: Option<String>,
    visits: &VisitsList,
) -> Result<HttpResponse> {
    let base = console_context(req, config, csrf_store, "visits");
    render_console_page(
        app_state,
        "admin/visits.html",
        context! {
            short_code => short_code.unwrap_or_default(),
            visits => visit_rows(visits),
            ..base.to_value()
        },
    )
}

pub async fn index(
    req: HttpRequest,
    config: web::Data<ValidatedConfig>,
    app_state: web::Data<AppState>,
    csrf_store: web::Data<CsrfTokenStore>,
) -> Result<HttpResponse> {
    match app_state.shlink.list_visits().await {
        Ok(visits) => render_visits_page(&req, &config, &app_state, &csrf_store, None, &visits),
        Err(error) => serve_shlink_error(&app_state, &error),
    }
}

pub async fn short_url_index(
    req: HttpRequest,
    path: web::Path<String>,
    config: web::Data<ValidatedConfig>,
    app_state: web::Data<AppState>,
    csrf_store: web::Data<CsrfTokenStore>,
) -> Result<HttpResponse> {
    let short_code = path.into_inner();
    match app_state.shlink.short_url_visits(&short_code).await {
        Ok(visits) => render_visits_page(
            &req,
            &config,
            &app_state,
            &csrf_store,
            Some(short_code),
            &visits,
        ),
        Err(error) => serve_shlink_error(&app_state, &error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shlink::VisitsList;

    #[test]
    fn visit_rows_default_missing_referrers_to_direct() {
        let visits: VisitsList = serde_json::from_value(serde_json::json!({
            "data": [
                {"date": "2026-02-01T10:00:00+00:00", "referer": "", "userAgent": "curl/8"},
                {"date": "2026-02-01T11:00:00+00:00", "referer": "https://news.example.com",
                 "userAgent": "Mozilla/5.0", "potentialBot": true}
            ]
        }))
        .expect("visits");

        let rows = visit_rows(&visits);
        assert_eq!(rows[0].referer, "direct");
        assert!(!rows[0].potential_bot);
        assert_eq!(rows[1].referer, "https://news.example.com");
        assert!(rows[1].potential_bot);
    }
}
