// This file is part of the product LinkPress.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

pub mod csrf_helper;
pub mod test_config;

pub use csrf_helper::{CsrfTokenOutcome, CsrfTokenStore, issue_csrf_token, validate_csrf_token};
pub use test_config::TestConfigBuilder;
