// This file is part of the product LinkPress.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::web::Data;
use actix_web::{HttpMessage, HttpRequest};
use std::future::{Ready, ready};
use std::pin::Pin;
use std::rc::Rc; // Services are per-thread

use super::jwt::{Claims, JwtService};
use super::types::User;
use super::user_directory::UserDirectory;

/// Trait to add authentication methods to HttpRequest
pub trait AuthRequest {
    fn user_info(&self) -> Option<User>;
    fn jwt_claims(&self) -> Option<Claims>;
    fn jwt_id(&self) -> Option<String>;
    fn has_role(&self, role: &str) -> bool;

    fn is_authenticated(&self) -> bool;
}

impl AuthRequest for HttpRequest {
    fn user_info(&self) -> Option<User> {
        self.extensions().get::<User>().cloned()
    }

    fn jwt_claims(&self) -> Option<Claims> {
        self.extensions().get::<Claims>().cloned()
    }

    fn jwt_id(&self) -> Option<String> {
        self.jwt_claims().map(|claims| claims.jti)
    }

    fn has_role(&self, role: &str) -> bool {
        self.user_info()
            .map(|info| info.roles.iter().any(|candidate| candidate == role))
            .unwrap_or(false)
    }

    fn is_authenticated(&self) -> bool {
        self.user_info().is_some()
    }
}

// JWT Authentication Middleware
//
// Verifies the session cookie when present and attaches the claims and user
// record to the request. Enforcement (redirects, 403s) happens later in the
// staff-gate middleware so public routes stay reachable.
pub struct JwtAuthMiddlewareFactory;

impl<S, B> Transform<S, ServiceRequest> for JwtAuthMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct JwtAuthMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let jwt_service = req.app_data::<Data<JwtService>>().cloned();
        let directory = req.app_data::<Data<UserDirectory>>().cloned();
        let service = self.service.clone();

        Box::pin(async move {
            if let (Some(jwt_service), Some(directory)) = (jwt_service, directory)
                && let Some(cookie) = req.request().cookie(jwt_service.cookie_name())
            {
                match jwt_service.verify_token(cookie.value()) {
                    Ok(claims) => match directory.find(&claims.sub) {
                        Some(user) => {
                            req.extensions_mut().insert(user.clone());
                            req.extensions_mut().insert(claims);
                        }
                        None => {
                            // Token for an account that has since been removed.
                            log::warn!("Valid session token for unknown user {}", claims.sub);
                        }
                    },
                    Err(error) => {
                        log::debug!("Session cookie failed verification: {}", error);
                    }
                }
            }

            service.call(req).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn unauthenticated_request_has_no_user() {
        let req = TestRequest::default().to_http_request();
        assert!(!req.is_authenticated());
        assert!(req.user_info().is_none());
        assert!(req.jwt_id().is_none());
        assert!(!req.has_role("staff"));
    }

    #[test]
    fn extensions_drive_auth_request_accessors() {
        let req = TestRequest::default().to_http_request();
        req.extensions_mut().insert(User {
            email: "ops@example.com".to_string(),
            name: "Ops Person".to_string(),
            password_hash: None,
            roles: vec!["staff".to_string()],
        });

        assert!(req.is_authenticated());
        assert!(req.has_role("staff"));
        assert!(!req.has_role("admin"));
        assert_eq!(req.user_info().map(|u| u.email).as_deref(), Some("ops@example.com"));
    }
}
