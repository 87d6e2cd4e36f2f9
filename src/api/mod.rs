// This file is part of the product LinkPress.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_web::web;

mod profile;
mod short_urls;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/profile", web::get().to(profile::get_profile))
            .route("/short-urls", web::get().to(short_urls::list))
            .route(
                "/short-urls/{short_code}",
                web::get().to(short_urls::detail),
            ),
    );
}
