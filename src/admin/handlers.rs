// This file is part of the product LinkPress.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::admin::{middleware, qr, tags_page, urls, visits};
use crate::config::ValidatedConfig;
use actix_web::{HttpResponse, Result, web};
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: &Arc<ValidatedConfig>) {
    // Apply the staff gate to every console route
    cfg.service(
        web::scope("/admin")
            .wrap(middleware::RequireStaffMiddleware::new(config.clone()))
            .route("", web::get().to(admin_redirect_to_urls))
            .route("/urls", web::get().to(urls::index))
            .route("/urls/create", web::get().to(urls::create_form))
            .route("/urls/create", web::post().to(urls::create))
            .route("/urls/{short_code}/edit", web::get().to(urls::edit_form))
            .route("/urls/{short_code}/edit", web::post().to(urls::update))
            .route("/urls/{short_code}/delete", web::post().to(urls::delete))
            .route(
                "/urls/{short_code}/visits",
                web::get().to(visits::short_url_index),
            )
            .route("/tags", web::get().to(tags_page::index))
            .route("/tags/create", web::post().to(tags_page::create))
            .route("/tags/rename", web::post().to(tags_page::rename))
            .route("/tags/delete", web::post().to(tags_page::delete))
            .route("/visits", web::get().to(visits::index))
            .route("/qr", web::get().to(qr::page))
            .route("/qr/{short_code}/image", web::get().to(qr::image)),
    );
}

async fn admin_redirect_to_urls() -> Result<HttpResponse> {
    Ok(HttpResponse::Found()
        .insert_header(("Location", "/admin/urls"))
        .finish())
}
