// This file is part of the product LinkPress.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

#![allow(dead_code)]

pub mod stub_shlink;

use actix_web::{App, HttpServer, web};
use std::sync::Arc;

use lnp::admin;
use lnp::api;
use lnp::app_state::AppState;
use lnp::assets;
use lnp::config::ValidatedConfig;
use lnp::headers::SecurityHeaders;
use lnp::iam::jwt::JwtService;
use lnp::iam::middleware::JwtAuthMiddlewareFactory;
use lnp::iam::{FileUserStore, UserDirectory, hash_password};
use lnp::login;
use lnp::util::{CsrfTokenStore, TestConfigBuilder};

pub const STAFF_EMAIL: &str = "ops@example.com";
pub const STAFF_NAME: &str = "Ops Person";
pub const STAFF_PASSWORD: &str = "correct-horse-battery";
pub const VIEWER_EMAIL: &str = "viewer@example.com";
pub const VIEWER_PASSWORD: &str = "viewer-password-123";

/// Everything a test server needs, seeded with one staff account and one
/// account without the staff role. The users file lives in a temp dir that
/// is dropped with the harness.
pub struct TestHarness {
    pub config: Arc<ValidatedConfig>,
    pub app_state: web::Data<AppState>,
    pub directory: web::Data<UserDirectory>,
    pub jwt_service: web::Data<JwtService>,
    pub csrf_store: web::Data<CsrfTokenStore>,
    _users_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn new(shlink_base_url: &str) -> Self {
        let config = Arc::new(
            TestConfigBuilder::new()
                .with_shlink_base_url(shlink_base_url)
                .build(),
        );

        let users_dir = tempfile::tempdir().expect("temp users dir");
        let users_file = users_dir.path().join("users.yaml");
        let users_yaml = format!(
            "{staff}:\n  name: {staff_name}\n  password_hash: \"{staff_hash}\"\n  roles: [staff]\n\
             {viewer}:\n  name: Viewer\n  password_hash: \"{viewer_hash}\"\n  roles: []\n",
            staff = STAFF_EMAIL,
            staff_name = STAFF_NAME,
            staff_hash = hash_password(STAFF_PASSWORD).expect("hash"),
            viewer = VIEWER_EMAIL,
            viewer_hash = hash_password(VIEWER_PASSWORD).expect("hash"),
        );
        std::fs::write(&users_file, users_yaml).expect("write users file");

        let store = FileUserStore::new(users_file).expect("user store");
        let directory = UserDirectory::from_store(&store).expect("directory");

        let app_state = AppState::new(&config).expect("app state");

        Self {
            jwt_service: web::Data::new(JwtService::new(&config)),
            directory: web::Data::new(directory),
            app_state: web::Data::new(app_state),
            csrf_store: web::Data::new(CsrfTokenStore::new()),
            config,
            _users_dir: users_dir,
        }
    }

    /// A signed-in staff session: the auth cookie plus a CSRF token valid
    /// for it, without going through the login form.
    pub fn staff_session(&self) -> AuthSession {
        let user = self.directory.find(STAFF_EMAIL).expect("staff user").clone();
        let token = self.jwt_service.create_token(&user).expect("token");
        let claims = self.jwt_service.verify_token(&token).expect("claims");
        let csrf_token = self.csrf_store.get_or_refresh_token(&claims.jti);
        let cookie = self.jwt_service.create_auth_cookie(&token).into_owned();
        AuthSession {
            cookie,
            csrf_token,
            jwt_id: claims.jti,
        }
    }
}

pub struct AuthSession {
    pub cookie: actix_web::cookie::Cookie<'static>,
    pub csrf_token: String,
    pub jwt_id: String,
}

/// Boot the console on an ephemeral loopback port and return its base URL.
pub async fn start_test_server(harness: &TestHarness) -> String {
    let config = harness.config.clone();
    let config_data = web::Data::from(config.clone());
    let app_state = harness.app_state.clone();
    let directory = harness.directory.clone();
    let jwt_service = harness.jwt_service.clone();
    let csrf_store = harness.csrf_store.clone();

    let server = HttpServer::new(move || {
        let admin_config = config.clone();
        App::new()
            .app_data(config_data.clone())
            .app_data(app_state.clone())
            .app_data(directory.clone())
            .app_data(jwt_service.clone())
            .app_data(csrf_store.clone())
            .wrap(JwtAuthMiddlewareFactory)
            .wrap(SecurityHeaders)
            .configure(assets::configure)
            .configure(login::configure)
            .configure(api::configure)
            .configure(move |cfg| admin::handlers::configure(cfg, &admin_config))
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .expect("bind test server");

    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());
    format!("http://{}", addr)
}
