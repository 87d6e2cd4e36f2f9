// This file is part of the product LinkPress.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::admin::shared::{console_context, render_console_page, serve_shlink_error};
use crate::app_state::AppState;
use crate::config::ValidatedConfig;
use crate::tags;
use crate::util::{CsrfTokenStore, validate_csrf_token};
use actix_web::{HttpRequest, HttpResponse, Result, web};
use minijinja::context;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct TagRow {
    name: String,
    short_urls_count: u64,
    visits_count: u64,
}

#[derive(Debug, Deserialize)]
pub struct TagsIndexQuery {
    #[serde(default)]
    pub flash: Option<String>,
}

pub async fn index(
    req: HttpRequest,
    query: web::Query<TagsIndexQuery>,
    config: web::Data<ValidatedConfig>,
    app_state: web::Data<AppState>,
    csrf_store: web::Data<CsrfTokenStore>,
) -> Result<HttpResponse> {
    let listing = match app_state.shlink.list_tags().await {
        Ok(listing) => listing,
        Err(error) => return serve_shlink_error(&app_state, &error),
    };

    // Same display policy as the URL listing: only custom tags surface,
    // shown without their prefix. UTM and ownership tags stay backstage.
    let rows: Vec<TagRow> = listing
        .data
        .iter()
        .filter(|tag| tags::is_custom_tag(tag))
        .map(|tag| {
            let stats = listing.stats.get(tag).cloned().unwrap_or_default();
            TagRow {
                name: tags::parse_tag(tag).value,
                short_urls_count: stats.short_urls_count,
                visits_count: stats.visits_count,
            }
        })
        .collect();

    let base = console_context(&req, &config, &csrf_store, "tags");
    render_console_page(
        &app_state,
        "admin/tags_index.html",
        context! {
            tags => rows,
            flash => query.flash.clone().unwrap_or_default(),
            ..base.to_value()
        },
    )
}

#[derive(Debug, Deserialize)]
pub struct CreateTagForm {
    #[serde(default)]
    pub csrf_token: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct RenameTagForm {
    #[serde(default)]
    pub csrf_token: String,
    #[serde(default)]
    pub old_name: String,
    #[serde(default)]
    pub new_name: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteTagForm {
    #[serde(default)]
    pub csrf_token: String,
    #[serde(default)]
    pub name: String,
}

fn csrf_rejection() -> HttpResponse {
    HttpResponse::Forbidden()
        .content_type("text/plain; charset=utf-8")
        .body("The form token is invalid or has expired. Go back and try again.")
}

fn flash_redirect(flash: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((
            "Location",
            format!("/admin/tags?flash={}", urlencoding::encode(flash)),
        ))
        .finish()
}

pub async fn create(
    req: HttpRequest,
    form: web::Form<CreateTagForm>,
    app_state: web::Data<AppState>,
    csrf_store: web::Data<CsrfTokenStore>,
) -> Result<HttpResponse> {
    if !validate_csrf_token(&req, &csrf_store, &form.csrf_token) {
        return Ok(csrf_rejection());
    }

    let name = form.name.trim();
    if name.is_empty() {
        return Ok(flash_redirect("Tag name must not be empty."));
    }

    let formatted = tags::format_tag(tags::CUSTOM_PREFIX, name);
    match app_state.shlink.create_tags(&[formatted]).await {
        Ok(()) => {
            log::info!("Tag {} created", name);
            Ok(flash_redirect(&format!("Tag {} created.", name)))
        }
        Err(error) => {
            log::error!("Failed to create tag {}: {}", name, error);
            serve_shlink_error(&app_state, &error)
        }
    }
}

pub async fn rename(
    req: HttpRequest,
    form: web::Form<RenameTagForm>,
    app_state: web::Data<AppState>,
    csrf_store: web::Data<CsrfTokenStore>,
) -> Result<HttpResponse> {
    if !validate_csrf_token(&req, &csrf_store, &form.csrf_token) {
        return Ok(csrf_rejection());
    }

    let old_name = form.old_name.trim();
    let new_name = form.new_name.trim();
    if old_name.is_empty() || new_name.is_empty() {
        return Ok(flash_redirect("Both the old and the new tag name are required."));
    }

    // The page shows bare values; the wire format carries the prefix.
    let old_tag = tags::format_tag(tags::CUSTOM_PREFIX, old_name);
    let new_tag = tags::format_tag(tags::CUSTOM_PREFIX, new_name);
    match app_state.shlink.rename_tag(&old_tag, &new_tag).await {
        Ok(()) => {
            log::info!("Tag {} renamed to {}", old_name, new_name);
            Ok(flash_redirect(&format!(
                "Tag {} renamed to {}.",
                old_name, new_name
            )))
        }
        Err(error) => {
            log::error!("Failed to rename tag {}: {}", old_name, error);
            serve_shlink_error(&app_state, &error)
        }
    }
}

pub async fn delete(
    req: HttpRequest,
    form: web::Form<DeleteTagForm>,
    app_state: web::Data<AppState>,
    csrf_store: web::Data<CsrfTokenStore>,
) -> Result<HttpResponse> {
    if !validate_csrf_token(&req, &csrf_store, &form.csrf_token) {
        return Ok(csrf_rejection());
    }

    let name = form.name.trim();
    if name.is_empty() {
        return Ok(flash_redirect("Tag name must not be empty."));
    }

    let formatted = tags::format_tag(tags::CUSTOM_PREFIX, name);
    match app_state.shlink.delete_tags(&[formatted]).await {
        Ok(()) => {
            log::info!("Tag {} deleted", name);
            Ok(flash_redirect(&format!("Tag {} deleted.", name)))
        }
        Err(error) => {
            log::error!("Failed to delete tag {}: {}", name, error);
            serve_shlink_error(&app_state, &error)
        }
    }
}
