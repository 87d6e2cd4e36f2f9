// This file is part of the product LinkPress.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_web::{HttpRequest, HttpResponse, web};
use serde::Serialize;

use crate::config::ValidatedConfig;
use crate::iam::AuthRequest;

#[derive(Serialize)]
struct ProfileResponse {
    authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_staff: Option<bool>,
}

pub async fn get_profile(req: HttpRequest, config: web::Data<ValidatedConfig>) -> HttpResponse {
    let Some(user) = req.user_info() else {
        return HttpResponse::Ok().json(ProfileResponse {
            authenticated: false,
            display_name: None,
            email: None,
            is_staff: None,
        });
    };

    let is_staff = user.has_role(&config.auth.staff_role);
    HttpResponse::Ok().json(ProfileResponse {
        authenticated: true,
        display_name: Some(user.name),
        email: Some(user.email),
        is_staff: Some(is_staff),
    })
}
