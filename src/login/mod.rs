// This file is part of the product LinkPress.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::app_state::AppState;
use crate::config::ValidatedConfig;
use crate::iam::jwt::JwtService;
use crate::iam::{AuthRequest, UserDirectory};
use crate::templates::{LoginPageContext, render_minijinja_template};
use crate::util::CsrfTokenStore;
use actix_web::{HttpRequest, HttpResponse, Result, web};
use serde::Deserialize;

const DEFAULT_RETURN_PATH: &str = "/admin/urls";

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/login")
            .route("", web::get().to(login_page))
            .route("/session", web::post().to(create_session))
            .route("/logout", web::post().to(logout)),
    );
}

#[derive(Debug, Deserialize)]
pub struct LoginPageQuery {
    #[serde(default)]
    pub return_path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub return_path: Option<String>,
}

/// Keep redirects on-site: only rooted paths, and never protocol-relative
/// ones, survive. Anything else falls back to the console index.
pub fn sanitize_return_path(candidate: Option<&str>) -> String {
    match candidate {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.starts_with("/\\") =>
        {
            path.to_string()
        }
        _ => DEFAULT_RETURN_PATH.to_string(),
    }
}

async fn login_page(
    req: HttpRequest,
    query: web::Query<LoginPageQuery>,
    config: web::Data<ValidatedConfig>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let return_path = sanitize_return_path(query.return_path.as_deref());
    if req.is_authenticated() {
        return Ok(HttpResponse::Found()
            .insert_header(("Location", return_path))
            .finish());
    }

    render_login_page(&config, &app_state, None, &return_path, HttpResponse::Ok())
}

async fn create_session(
    req: HttpRequest,
    form: web::Form<LoginForm>,
    config: web::Data<ValidatedConfig>,
    app_state: web::Data<AppState>,
    directory: web::Data<UserDirectory>,
    jwt_service: web::Data<JwtService>,
) -> Result<HttpResponse> {
    let return_path = sanitize_return_path(form.return_path.as_deref());
    let email = form.email.trim();

    let Some(user) = directory.authenticate(email, &form.password) else {
        log::warn!("Failed sign-in attempt for {}", email);
        return render_login_page(
            &config,
            &app_state,
            Some("Invalid email or password.".to_string()),
            &return_path,
            HttpResponse::Unauthorized(),
        );
    };

    let token = match jwt_service.create_token(user) {
        Ok(token) => token,
        Err(error) => {
            log::error!("Could not create session token for {}: {}", email, error);
            return crate::errors::serve_500(
                &app_state.error_renderer,
                Some(app_state.templates.as_ref()),
            );
        }
    };

    log::info!("User {} signed in", email);
    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", return_path))
        .cookie(jwt_service.create_auth_cookie(&token))
        .finish())
}

async fn logout(
    req: HttpRequest,
    jwt_service: web::Data<JwtService>,
    csrf_store: web::Data<CsrfTokenStore>,
) -> Result<HttpResponse> {
    if let Some(jwt_id) = req.jwt_id() {
        csrf_store.remove_session(&jwt_id);
    }
    if let Some(user) = req.user_info() {
        log::info!("User {} signed out", user.email);
    }

    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", "/login"))
        .cookie(jwt_service.create_logout_cookie())
        .finish())
}

fn render_login_page(
    config: &ValidatedConfig,
    app_state: &AppState,
    error_message: Option<String>,
    return_path: &str,
    mut response: actix_web::HttpResponseBuilder,
) -> Result<HttpResponse> {
    let context =
        LoginPageContext::new(&config.app_name, error_message, return_path).to_value();
    match render_minijinja_template(
        app_state.templates.as_ref(),
        "login/login_page.html",
        context,
    ) {
        Ok(html) => Ok(response.content_type("text/html; charset=utf-8").body(html)),
        Err(error) => {
            log::error!("Failed to render login page: {}", error);
            crate::errors::serve_500(&app_state.error_renderer, None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_return_path_keeps_rooted_paths() {
        assert_eq!(sanitize_return_path(Some("/admin/tags")), "/admin/tags");
        assert_eq!(
            sanitize_return_path(Some("/admin/urls?page=2")),
            "/admin/urls?page=2"
        );
    }

    #[test]
    fn sanitize_return_path_rejects_offsite_targets() {
        assert_eq!(sanitize_return_path(None), DEFAULT_RETURN_PATH);
        assert_eq!(
            sanitize_return_path(Some("https://evil.example.com")),
            DEFAULT_RETURN_PATH
        );
        assert_eq!(sanitize_return_path(Some("//evil.example.com")), DEFAULT_RETURN_PATH);
        assert_eq!(sanitize_return_path(Some("relative/path")), DEFAULT_RETURN_PATH);
    }
}
