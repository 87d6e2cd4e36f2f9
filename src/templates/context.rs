// This file is part of the product LinkPress.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use minijinja::{Value, context};

#[derive(Debug, Clone)]
pub struct ErrorPageContext {
    app_name: String,
}

impl ErrorPageContext {
    pub fn new(app_name: &str) -> Self {
        Self {
            app_name: app_name.to_string(),
        }
    }

    pub fn to_value(&self) -> Value {
        context! {
            app_name => &self.app_name
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoginPageContext {
    app_name: String,
    error_message: Option<String>,
    return_path: String,
}

impl LoginPageContext {
    pub fn new(app_name: &str, error_message: Option<String>, return_path: &str) -> Self {
        Self {
            app_name: app_name.to_string(),
            error_message,
            return_path: return_path.to_string(),
        }
    }

    pub fn to_value(&self) -> Value {
        context! {
            app_name => &self.app_name,
            error_message => &self.error_message,
            return_path => &self.return_path
        }
    }
}

/// Shared chrome for every console page: product name, signed-in user, the
/// nav item to highlight, and the session's CSRF token for mutating forms.
#[derive(Debug, Clone)]
pub struct ConsolePageContext {
    pub app_name: String,
    pub user_name: String,
    pub user_email: String,
    pub active_nav: String,
    pub csrf_token: String,
}

impl ConsolePageContext {
    pub fn to_value(&self) -> Value {
        context! {
            app_name => &self.app_name,
            user_name => &self.user_name,
            user_email => &self.user_email,
            active_nav => &self.active_nav,
            csrf_token => &self.csrf_token
        }
    }
}
