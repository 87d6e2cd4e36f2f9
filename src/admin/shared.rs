// This file is part of the product LinkPress.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::app_state::AppState;
use crate::config::ValidatedConfig;
use crate::iam::AuthRequest;
use crate::shlink::ShlinkError;
use crate::templates::{ConsolePageContext, render_minijinja_template};
use crate::util::{CsrfTokenOutcome, CsrfTokenStore, issue_csrf_token};
use actix_web::{HttpRequest, HttpResponse, Result, http::StatusCode};
use minijinja::Value;

pub fn json_error_response(message: &str, status_code: StatusCode) -> HttpResponse {
    let mut builder = HttpResponse::build(status_code);
    builder.content_type("application/json");
    builder.json(serde_json::json!({
        "success": false,
        "message": message,
    }))
}

/// Log detailed error server-side and return generic JSON error response to client
pub fn log_and_return_generic_error(
    operation: &str,
    error: &dyn std::fmt::Display,
    status_code: StatusCode,
) -> HttpResponse {
    log::error!("Failed to {}: {}", operation, error);

    let generic_message = match status_code {
        StatusCode::BAD_REQUEST => "Invalid input provided",
        StatusCode::CONFLICT => "Resource already exists",
        StatusCode::NOT_FOUND => "Resource not found",
        StatusCode::FORBIDDEN => "Operation not permitted",
        StatusCode::INTERNAL_SERVER_ERROR => "An internal error occurred",
        _ => "An error occurred",
    };

    json_error_response(generic_message, status_code)
}

/// Chrome shared by every console page, built from the authenticated
/// request. The staff gate runs before any handler, so a missing user here
/// means a routing bug rather than an anonymous visitor.
pub fn console_context(
    req: &HttpRequest,
    config: &ValidatedConfig,
    csrf_store: &CsrfTokenStore,
    active_nav: &str,
) -> ConsolePageContext {
    let user = req.user_info();
    let csrf_token = match issue_csrf_token(req, csrf_store) {
        CsrfTokenOutcome::Authorized { token, .. } => token,
        CsrfTokenOutcome::Unauthorized => {
            log::error!("Console page rendered without an authenticated session");
            String::new()
        }
    };

    ConsolePageContext {
        app_name: config.app_name.clone(),
        user_name: user.as_ref().map(|u| u.name.clone()).unwrap_or_default(),
        user_email: user.map(|u| u.email).unwrap_or_default(),
        active_nav: active_nav.to_string(),
        csrf_token,
    }
}

/// Render a console template, degrading to the generic 500 page when the
/// template fails.
pub fn render_console_page(
    app_state: &AppState,
    template_name: &str,
    context: Value,
) -> Result<HttpResponse> {
    match render_minijinja_template(app_state.templates.as_ref(), template_name, context) {
        Ok(html) => Ok(HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(html)),
        Err(error) => {
            log::error!("Failed to render {}: {}", template_name, error);
            crate::errors::serve_500(&app_state.error_renderer, None)
        }
    }
}

/// Map a remote failure on a page load to a rendered error response.
pub fn serve_shlink_error(app_state: &AppState, error: &ShlinkError) -> Result<HttpResponse> {
    log::error!("Remote shortener call failed: {}", error);
    if error.is_not_found() {
        crate::errors::serve_404(&app_state.error_renderer, Some(app_state.templates.as_ref()))
    } else {
        crate::errors::serve_500(&app_state.error_renderer, Some(app_state.templates.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn json_error_response_carries_failure_flag() {
        let response = json_error_response("nope", StatusCode::BAD_REQUEST);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
