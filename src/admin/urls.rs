// This file is part of the product LinkPress.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::admin::shared::{console_context, render_console_page, serve_shlink_error};
use crate::app_state::AppState;
use crate::config::ValidatedConfig;
use crate::iam::AuthRequest;
use crate::shlink::{
    CreateShortUrlRequest, EditShortUrlRequest, ShlinkError, ShortUrl, ShortUrlsQuery,
};
use crate::tags;
use crate::tags::UtmParameters;
use crate::util::{CsrfTokenStore, validate_csrf_token};
use actix_web::{HttpRequest, HttpResponse, Result, web};
use minijinja::context;
use serde::{Deserialize, Serialize};
use url::Url;

const ITEMS_PER_PAGE: u32 = 20;

// Field copy shown next to the UTM inputs, in the codec's canonical order.
const UTM_FIELDS: [(&str, &str, &str); 5] = [
    ("utm_source", "Campaign source", "e.g. google, newsletter, facebook"),
    ("utm_medium", "Campaign medium", "e.g. cpc, banner, email"),
    ("utm_campaign", "Campaign name", "e.g. summer-sale, product-launch"),
    ("utm_term", "Campaign term", "e.g. running+shoes"),
    ("utm_content", "Campaign content", "e.g. logolink, textlink"),
];

#[derive(Serialize)]
struct UrlRow {
    short_code: String,
    short_url: String,
    long_url: String,
    date_created: String,
    visits: u64,
    display_tags: Vec<String>,
}

impl UrlRow {
    fn from_short_url(short_url: &ShortUrl) -> Self {
        Self {
            short_code: short_url.short_code.clone(),
            short_url: short_url.short_url.clone(),
            long_url: short_url.long_url.clone(),
            // The remote reports full ISO 8601; the listing only needs the day.
            date_created: short_url.date_created.chars().take(10).collect(),
            visits: short_url.visits_summary.total,
            display_tags: tags::display_tags(&short_url.tags),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UrlsIndexQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub flash: Option<String>,
}

fn default_page() -> u32 {
    1
}

pub async fn index(
    req: HttpRequest,
    query: web::Query<UrlsIndexQuery>,
    config: web::Data<ValidatedConfig>,
    app_state: web::Data<AppState>,
    csrf_store: web::Data<CsrfTokenStore>,
) -> Result<HttpResponse> {
    let search_term = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .map(str::to_string);

    let listing = ShortUrlsQuery {
        page: query.page.max(1),
        items_per_page: ITEMS_PER_PAGE,
        search_term: search_term.clone(),
        tags: Vec::new(),
    };

    let page = match app_state.shlink.list_short_urls(&listing).await {
        Ok(page) => page,
        Err(error) => return serve_shlink_error(&app_state, &error),
    };

    let rows: Vec<UrlRow> = page.data.iter().map(UrlRow::from_short_url).collect();
    let base = console_context(&req, &config, &csrf_store, "urls");

    render_console_page(
        &app_state,
        "admin/urls_index.html",
        context! {
            urls => rows,
            page => page.pagination.current_page,
            pages_count => page.pagination.pages_count.max(1),
            total_items => page.pagination.total_items,
            search_term => search_term.unwrap_or_default(),
            flash => query.flash.clone().unwrap_or_default(),
            ..base.to_value()
        },
    )
}

// One mutating form covers create and edit; absent checkboxes simply do not
// appear in the posted pairs, hence the Option<String> fields.
#[derive(Debug, Default, Deserialize)]
pub struct UrlForm {
    #[serde(default)]
    pub csrf_token: String,
    #[serde(default)]
    pub long_url: String,
    #[serde(default)]
    pub custom_slug: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub custom_tags: String,
    #[serde(default)]
    pub utm_source: String,
    #[serde(default)]
    pub utm_medium: String,
    #[serde(default)]
    pub utm_campaign: String,
    #[serde(default)]
    pub utm_term: String,
    #[serde(default)]
    pub utm_content: String,
    #[serde(default)]
    pub valid_since: String,
    #[serde(default)]
    pub valid_until: String,
    #[serde(default)]
    pub max_visits: String,
    #[serde(default)]
    pub crawlable: Option<String>,
    #[serde(default)]
    pub forward_query: Option<String>,
}

impl UrlForm {
    fn utm_parameters(&self) -> UtmParameters {
        let mut params = UtmParameters::default();
        for (key, value) in [
            ("utm_source", &self.utm_source),
            ("utm_medium", &self.utm_medium),
            ("utm_campaign", &self.utm_campaign),
            ("utm_term", &self.utm_term),
            ("utm_content", &self.utm_content),
        ] {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                params.set(key, trimmed.to_string());
            }
        }
        params
    }

    fn custom_tag_values(&self) -> Vec<String> {
        self.custom_tags
            .split(',')
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn optional(value: &str) -> Option<String> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    fn max_visits_value(&self) -> Result<Option<u64>, String> {
        let trimmed = self.max_visits.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        trimmed
            .parse::<u64>()
            .map(Some)
            .map_err(|_| "Maximum visits must be a positive number".to_string())
    }
}

struct FormView {
    is_edit: bool,
    short_code: String,
    form_error: Option<String>,
    utm_conflicts: Vec<tags::UtmConflict>,
}

#[derive(Serialize)]
struct UtmFieldView {
    key: &'static str,
    label: &'static str,
    placeholder: &'static str,
    value: String,
    error: Option<String>,
}

fn utm_field_views(params: &UtmParameters, errors: &[(&'static str, String)]) -> Vec<UtmFieldView> {
    UTM_FIELDS
        .iter()
        .map(|(key, label, placeholder)| UtmFieldView {
            key,
            label,
            placeholder,
            value: params.get(key).unwrap_or_default().to_string(),
            error: errors
                .iter()
                .find(|(error_key, _)| error_key == key)
                .map(|(_, message)| message.clone()),
        })
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn render_url_form(
    req: &HttpRequest,
    config: &ValidatedConfig,
    app_state: &AppState,
    csrf_store: &CsrfTokenStore,
    view: FormView,
    form: &UrlForm,
    utm_errors: &[(&'static str, String)],
) -> Result<HttpResponse> {
    let base = console_context(req, config, csrf_store, "urls");
    let form_action = if view.is_edit {
        format!("/admin/urls/{}/edit", view.short_code)
    } else {
        "/admin/urls/create".to_string()
    };

    render_console_page(
        app_state,
        "admin/url_form.html",
        context! {
            is_edit => view.is_edit,
            short_code => view.short_code,
            form_action => form_action,
            form_error => view.form_error,
            utm_conflicts => view.utm_conflicts,
            long_url => &form.long_url,
            custom_slug => &form.custom_slug,
            title => &form.title,
            custom_tags => &form.custom_tags,
            utm_fields => utm_field_views(&form.utm_parameters(), utm_errors),
            valid_since => &form.valid_since,
            valid_until => &form.valid_until,
            max_visits => &form.max_visits,
            crawlable => form.crawlable.is_some(),
            forward_query => form.forward_query.is_some(),
            ..base.to_value()
        },
    )
}

pub async fn create_form(
    req: HttpRequest,
    config: web::Data<ValidatedConfig>,
    app_state: web::Data<AppState>,
    csrf_store: web::Data<CsrfTokenStore>,
) -> Result<HttpResponse> {
    render_url_form(
        &req,
        &config,
        &app_state,
        &csrf_store,
        FormView {
            is_edit: false,
            short_code: String::new(),
            form_error: None,
            utm_conflicts: Vec::new(),
        },
        &UrlForm::default(),
        &[],
    )
}

/// Check everything the form can get wrong before the remote sees it.
/// Returns the per-field UTM errors plus an optional form-wide error.
fn validate_form(form: &UrlForm) -> (Vec<(&'static str, String)>, Option<String>) {
    let mut utm_errors = Vec::new();
    for (key, value) in [
        ("utm_source", &form.utm_source),
        ("utm_medium", &form.utm_medium),
        ("utm_campaign", &form.utm_campaign),
        ("utm_term", &form.utm_term),
        ("utm_content", &form.utm_content),
    ] {
        if let Err(error) = tags::validate_utm_value(value) {
            utm_errors.push((key, error.message().to_string()));
        }
    }

    let form_error = if form.long_url.trim().is_empty() {
        Some("A long URL is required.".to_string())
    } else if Url::parse(form.long_url.trim()).is_err() {
        Some("The long URL must be a valid absolute URL.".to_string())
    } else if let Err(message) = form.max_visits_value() {
        Some(message)
    } else {
        None
    };

    (utm_errors, form_error)
}

/// Full tag list for a save: user-entered custom tags, creator attribution,
/// tags we must not lose (team, project, createdBy from earlier saves), and
/// the UTM parameter tags last.
fn assemble_tags(
    custom_values: &[String],
    created_by: Option<&str>,
    preserved: &[String],
    utm: &UtmParameters,
) -> Vec<String> {
    let mut all = Vec::new();
    for value in custom_values {
        all.push(tags::format_tag(tags::CUSTOM_PREFIX, value));
    }
    if let Some(email) = created_by {
        all.push(tags::format_tag(tags::CREATED_BY_PREFIX, email));
    }
    all.extend_from_slice(preserved);
    all.extend(tags::utm_parameters_to_tags(utm));
    all
}

fn csrf_rejection() -> HttpResponse {
    HttpResponse::Forbidden()
        .content_type("text/plain; charset=utf-8")
        .body("The form token is invalid or has expired. Go back and try again.")
}

fn flash_redirect(location: &str, flash: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((
            "Location",
            format!("{}?flash={}", location, urlencoding::encode(flash)),
        ))
        .finish()
}

pub async fn create(
    req: HttpRequest,
    form: web::Form<UrlForm>,
    config: web::Data<ValidatedConfig>,
    app_state: web::Data<AppState>,
    csrf_store: web::Data<CsrfTokenStore>,
) -> Result<HttpResponse> {
    if !validate_csrf_token(&req, &csrf_store, &form.csrf_token) {
        return Ok(csrf_rejection());
    }

    let (utm_errors, form_error) = validate_form(&form);
    if !utm_errors.is_empty() || form_error.is_some() {
        return render_url_form(
            &req,
            &config,
            &app_state,
            &csrf_store,
            FormView {
                is_edit: false,
                short_code: String::new(),
                form_error,
                utm_conflicts: Vec::new(),
            },
            &form,
            &utm_errors,
        );
    }

    let creator = req.user_info().map(|user| user.email);
    let all_tags = assemble_tags(
        &form.custom_tag_values(),
        creator.as_deref(),
        &[],
        &form.utm_parameters(),
    );

    let request = CreateShortUrlRequest {
        long_url: form.long_url.trim().to_string(),
        tags: all_tags,
        custom_slug: UrlForm::optional(&form.custom_slug),
        title: UrlForm::optional(&form.title),
        valid_since: UrlForm::optional(&form.valid_since),
        valid_until: UrlForm::optional(&form.valid_until),
        max_visits: form.max_visits_value().unwrap_or(None),
        crawlable: form.crawlable.as_ref().map(|_| true),
        forward_query: form.forward_query.as_ref().map(|_| true),
    };

    match app_state.shlink.create_short_url(&request).await {
        Ok(created) => {
            log::info!("Short URL {} created", created.short_code);
            Ok(flash_redirect(
                "/admin/urls",
                &format!("Short URL {} created.", created.short_code),
            ))
        }
        Err(error @ ShlinkError::Api { .. }) => {
            log::warn!("Create short URL rejected: {}", error);
            render_url_form(
                &req,
                &config,
                &app_state,
                &csrf_store,
                FormView {
                    is_edit: false,
                    short_code: String::new(),
                    form_error: Some(format!("The link service rejected the request: {}", error)),
                    utm_conflicts: Vec::new(),
                },
                &form,
                &[],
            )
        }
        Err(error) => serve_shlink_error(&app_state, &error),
    }
}

fn form_from_short_url(short_url: &ShortUrl) -> UrlForm {
    let utm = tags::extract_utm_parameters(&short_url.tags);
    UrlForm {
        long_url: short_url.long_url.clone(),
        title: short_url.title.clone().unwrap_or_default(),
        custom_tags: tags::display_tags(&short_url.tags).join(", "),
        utm_source: utm.utm_source.unwrap_or_default(),
        utm_medium: utm.utm_medium.unwrap_or_default(),
        utm_campaign: utm.utm_campaign.unwrap_or_default(),
        utm_term: utm.utm_term.unwrap_or_default(),
        utm_content: utm.utm_content.unwrap_or_default(),
        valid_since: short_url.meta.valid_since.clone().unwrap_or_default(),
        valid_until: short_url.meta.valid_until.clone().unwrap_or_default(),
        max_visits: short_url
            .meta
            .max_visits
            .map(|value| value.to_string())
            .unwrap_or_default(),
        crawlable: short_url.crawlable.unwrap_or(false).then(|| "1".to_string()),
        forward_query: short_url
            .forward_query
            .unwrap_or(false)
            .then(|| "1".to_string()),
        ..UrlForm::default()
    }
}

/// Tag/URL disagreements are worth a warning in the log as well as the
/// banner on the edit page; the tag value is the one that wins.
fn log_utm_conflicts(short_code: &str, conflicts: &[tags::UtmConflict]) {
    for conflict in conflicts {
        log::warn!(
            "Short URL {} has conflicting {}: tag={} url={}",
            short_code,
            conflict.key,
            conflict.tag_value,
            conflict.url_value
        );
    }
}

pub async fn edit_form(
    req: HttpRequest,
    path: web::Path<String>,
    config: web::Data<ValidatedConfig>,
    app_state: web::Data<AppState>,
    csrf_store: web::Data<CsrfTokenStore>,
) -> Result<HttpResponse> {
    let short_code = path.into_inner();
    let short_url = match app_state.shlink.get_short_url(&short_code).await {
        Ok(short_url) => short_url,
        Err(error) => return serve_shlink_error(&app_state, &error),
    };

    let conflicts = tags::utm_conflicts(&short_url.tags, &short_url.long_url);
    log_utm_conflicts(&short_code, &conflicts);

    let form = form_from_short_url(&short_url);
    render_url_form(
        &req,
        &config,
        &app_state,
        &csrf_store,
        FormView {
            is_edit: true,
            short_code,
            form_error: None,
            utm_conflicts: conflicts,
        },
        &form,
        &[],
    )
}

pub async fn update(
    req: HttpRequest,
    path: web::Path<String>,
    form: web::Form<UrlForm>,
    config: web::Data<ValidatedConfig>,
    app_state: web::Data<AppState>,
    csrf_store: web::Data<CsrfTokenStore>,
) -> Result<HttpResponse> {
    let short_code = path.into_inner();
    if !validate_csrf_token(&req, &csrf_store, &form.csrf_token) {
        return Ok(csrf_rejection());
    }

    let (utm_errors, form_error) = validate_form(&form);
    if !utm_errors.is_empty() || form_error.is_some() {
        return render_url_form(
            &req,
            &config,
            &app_state,
            &csrf_store,
            FormView {
                is_edit: true,
                short_code,
                form_error,
                utm_conflicts: Vec::new(),
            },
            &form,
            &utm_errors,
        );
    }

    // The remote replaces the whole tag list on edit, so the existing
    // ownership tags have to be carried over from the current record.
    let existing = match app_state.shlink.get_short_url(&short_code).await {
        Ok(existing) => existing,
        Err(error) => return serve_shlink_error(&app_state, &error),
    };
    let preserved: Vec<String> = existing
        .tags
        .iter()
        .filter(|tag| !tags::is_custom_tag(tag) && !tags::is_utm_tag(tag))
        .cloned()
        .collect();

    let all_tags = assemble_tags(
        &form.custom_tag_values(),
        None,
        &preserved,
        &form.utm_parameters(),
    );

    let request = EditShortUrlRequest {
        long_url: Some(form.long_url.trim().to_string()),
        tags: Some(all_tags),
        title: UrlForm::optional(&form.title),
        valid_since: UrlForm::optional(&form.valid_since),
        valid_until: UrlForm::optional(&form.valid_until),
        max_visits: form.max_visits_value().unwrap_or(None),
        crawlable: Some(form.crawlable.is_some()),
        forward_query: Some(form.forward_query.is_some()),
    };

    match app_state.shlink.edit_short_url(&short_code, &request).await {
        Ok(_) => {
            log::info!("Short URL {} updated", short_code);
            Ok(flash_redirect(
                "/admin/urls",
                &format!("Short URL {} updated.", short_code),
            ))
        }
        Err(error @ ShlinkError::Api { .. }) => {
            log::warn!("Edit short URL {} rejected: {}", short_code, error);
            render_url_form(
                &req,
                &config,
                &app_state,
                &csrf_store,
                FormView {
                    is_edit: true,
                    short_code,
                    form_error: Some(format!("The link service rejected the request: {}", error)),
                    utm_conflicts: Vec::new(),
                },
                &form,
                &[],
            )
        }
        Err(error) => serve_shlink_error(&app_state, &error),
    }
}

#[derive(Debug, Deserialize)]
pub struct DeleteForm {
    #[serde(default)]
    pub csrf_token: String,
}

pub async fn delete(
    req: HttpRequest,
    path: web::Path<String>,
    form: web::Form<DeleteForm>,
    app_state: web::Data<AppState>,
    csrf_store: web::Data<CsrfTokenStore>,
) -> Result<HttpResponse> {
    let short_code = path.into_inner();
    if !validate_csrf_token(&req, &csrf_store, &form.csrf_token) {
        return Ok(csrf_rejection());
    }

    match app_state.shlink.delete_short_url(&short_code).await {
        Ok(()) => {
            log::info!("Short URL {} deleted", short_code);
            Ok(flash_redirect(
                "/admin/urls",
                &format!("Short URL {} deleted.", short_code),
            ))
        }
        Err(error) => serve_shlink_error(&app_state, &error),
    }
}
