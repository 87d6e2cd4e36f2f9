// This file is part of the product LinkPress.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::config::ValidatedConfig;
use crate::iam::AuthRequest;
use actix_web::{
    Error, HttpResponse,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::header::LOCATION,
};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};
use std::sync::Arc;

/// Middleware that requires the configured staff role - redirects to /login
/// if the user is not authenticated, or returns 403 when authenticated
/// without the role.
pub struct RequireStaffMiddleware {
    config: Arc<ValidatedConfig>,
}

impl RequireStaffMiddleware {
    pub fn new(config: Arc<ValidatedConfig>) -> Self {
        Self { config }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireStaffMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireStaffMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireStaffMiddlewareService {
            service,
            config: self.config.clone(),
        }))
    }
}

pub struct RequireStaffMiddlewareService<S> {
    service: S,
    config: Arc<ValidatedConfig>,
}

impl<S, B> Service<ServiceRequest> for RequireStaffMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let is_authenticated = req.request().is_authenticated();
        let has_staff_role = req.request().has_role(&self.config.auth.staff_role);

        if !has_staff_role {
            let (req, _) = req.into_parts();

            let response = if is_authenticated {
                // Signed in, but not staff: no console for you.
                log::warn!(
                    "User {} lacks the {} role for {}",
                    req.user_info().map(|u| u.email).unwrap_or_default(),
                    self.config.auth.staff_role,
                    req.path()
                );
                HttpResponse::Forbidden()
                    .content_type("text/plain; charset=utf-8")
                    .body("This account is not allowed into the console.")
                    .map_into_right_body()
            } else {
                let current_path = req
                    .uri()
                    .path_and_query()
                    .map(|pq| pq.as_str())
                    .unwrap_or(req.uri().path());
                let redirect_location =
                    format!("/login?return_path={}", urlencoding::encode(current_path));
                HttpResponse::Found()
                    .insert_header((LOCATION, redirect_location))
                    .finish()
                    .map_into_right_body()
            };

            return Box::pin(async move { Ok(ServiceResponse::new(req, response)) });
        }

        let fut = self.service.call(req);
        Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
    }
}
