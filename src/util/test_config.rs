// This file is part of the product LinkPress.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::config::{AppConfig, AuthConfig, JwtConfig, ShlinkConfig, ValidatedConfig};

pub const TEST_JWT_SECRET: &str = "test-secret-test-secret-test-secret!";
pub const TEST_API_KEY: &str = "test-api-key";

/// Builder for a validated configuration usable in unit and integration
/// tests without touching the filesystem.
pub struct TestConfigBuilder {
    shlink_base_url: String,
    staff_role: String,
    app_name: String,
}

impl TestConfigBuilder {
    pub fn new() -> Self {
        Self {
            shlink_base_url: "http://127.0.0.1:9/".to_string(),
            staff_role: "staff".to_string(),
            app_name: "LinkPress Test".to_string(),
        }
    }

    pub fn with_shlink_base_url(mut self, base_url: &str) -> Self {
        self.shlink_base_url = base_url.to_string();
        self
    }

    pub fn with_staff_role(mut self, role: &str) -> Self {
        self.staff_role = role.to_string();
        self
    }

    pub fn with_app_name(mut self, name: &str) -> Self {
        self.app_name = name.to_string();
        self
    }

    pub fn build(self) -> ValidatedConfig {
        let raw = AppConfig {
            app: crate::config::AppSection {
                name: self.app_name,
            },
            shlink: ShlinkConfig {
                base_url: self.shlink_base_url,
                api_key: TEST_API_KEY.to_string(),
                ..ShlinkConfig::default()
            },
            auth: AuthConfig {
                staff_role: self.staff_role,
                jwt: JwtConfig {
                    secret: TEST_JWT_SECRET.to_string(),
                    ..JwtConfig::default()
                },
                ..AuthConfig::default()
            },
            ..AppConfig::default()
        };
        ValidatedConfig::from_app_config(raw).expect("test configuration should validate")
    }
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
