// This file is part of the product LinkPress.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

mod common;

use awc::Client;
use common::{STAFF_EMAIL, STAFF_PASSWORD, VIEWER_EMAIL, VIEWER_PASSWORD, TestHarness};

fn test_client() -> Client {
    Client::builder().disable_redirects().finish()
}

#[actix_web::test]
async fn console_redirects_anonymous_users_to_login() {
    let (shlink_url, _stub) = common::stub_shlink::start().await;
    let harness = TestHarness::new(&shlink_url);
    let base_url = common::start_test_server(&harness).await;

    let response = test_client()
        .get(format!("{}/admin/urls", base_url))
        .send()
        .await
        .expect("request");

    assert_eq!(response.status(), 302);
    let location = response
        .headers()
        .get("location")
        .and_then(|value| value.to_str().ok())
        .expect("location header");
    assert_eq!(location, "/login?return_path=%2Fadmin%2Furls");
}

#[actix_web::test]
async fn login_page_renders_the_form() {
    let (shlink_url, _stub) = common::stub_shlink::start().await;
    let harness = TestHarness::new(&shlink_url);
    let base_url = common::start_test_server(&harness).await;

    let mut response = test_client()
        .get(format!("{}/login", base_url))
        .send()
        .await
        .expect("request");

    assert_eq!(response.status(), 200);
    let bytes = response.body().await.expect("body");
    let body = String::from_utf8_lossy(&bytes).to_string();
    assert!(body.contains("Sign in"));
    assert!(body.contains("/login/session"));
}

#[actix_web::test]
async fn wrong_password_is_rejected_without_a_cookie() {
    let (shlink_url, _stub) = common::stub_shlink::start().await;
    let harness = TestHarness::new(&shlink_url);
    let base_url = common::start_test_server(&harness).await;

    let mut response = test_client()
        .post(format!("{}/login/session", base_url))
        .send_form(&[
            ("email", STAFF_EMAIL),
            ("password", "definitely-wrong"),
            ("return_path", "/admin/urls"),
        ])
        .await
        .expect("request");

    assert_eq!(response.status(), 401);
    assert!(response.cookies().expect("cookies").is_empty());
    let bytes = response.body().await.expect("body");
    let body = String::from_utf8_lossy(&bytes).to_string();
    assert!(body.contains("Invalid email or password"));
}

#[actix_web::test]
async fn staff_login_sets_session_cookie_and_opens_console() {
    let (shlink_url, _stub) = common::stub_shlink::start().await;
    let harness = TestHarness::new(&shlink_url);
    let base_url = common::start_test_server(&harness).await;
    let client = test_client();

    let response = client
        .post(format!("{}/login/session", base_url))
        .send_form(&[
            ("email", STAFF_EMAIL),
            ("password", STAFF_PASSWORD),
            ("return_path", "/admin/urls"),
        ])
        .await
        .expect("request");

    assert_eq!(response.status(), 303);
    let cookies = response.cookies().expect("cookies");
    let session_cookie = cookies
        .iter()
        .find(|cookie| cookie.name() == "linkpress_session")
        .expect("session cookie")
        .clone();
    assert!(session_cookie.http_only().unwrap_or(false));

    let mut response = client
        .get(format!("{}/admin/urls", base_url))
        .cookie(session_cookie)
        .send()
        .await
        .expect("request");

    assert_eq!(response.status(), 200);
    let bytes = response.body().await.expect("body");
    let body = String::from_utf8_lossy(&bytes).to_string();
    // The listing shows custom tag values only; backstage tags stay hidden.
    assert!(body.contains("abc123"));
    assert!(body.contains("launch"));
    assert!(!body.contains("createdBy"));
    assert!(!body.contains("utm_source:newsletter"));
}

#[actix_web::test]
async fn non_staff_accounts_get_403_from_the_console() {
    let (shlink_url, _stub) = common::stub_shlink::start().await;
    let harness = TestHarness::new(&shlink_url);
    let base_url = common::start_test_server(&harness).await;
    let client = test_client();

    let response = client
        .post(format!("{}/login/session", base_url))
        .send_form(&[
            ("email", VIEWER_EMAIL),
            ("password", VIEWER_PASSWORD),
            ("return_path", "/admin/urls"),
        ])
        .await
        .expect("request");
    assert_eq!(response.status(), 303);
    let cookies = response.cookies().expect("cookies");
    let session_cookie = cookies
        .iter()
        .find(|cookie| cookie.name() == "linkpress_session")
        .expect("session cookie")
        .clone();

    let response = client
        .get(format!("{}/admin/urls", base_url))
        .cookie(session_cookie)
        .send()
        .await
        .expect("request");
    assert_eq!(response.status(), 403);
}

#[actix_web::test]
async fn offsite_return_path_falls_back_to_console_index() {
    let (shlink_url, _stub) = common::stub_shlink::start().await;
    let harness = TestHarness::new(&shlink_url);
    let base_url = common::start_test_server(&harness).await;

    let response = test_client()
        .post(format!("{}/login/session", base_url))
        .send_form(&[
            ("email", STAFF_EMAIL),
            ("password", STAFF_PASSWORD),
            ("return_path", "https://evil.example.com/"),
        ])
        .await
        .expect("request");

    assert_eq!(response.status(), 303);
    let location = response
        .headers()
        .get("location")
        .and_then(|value| value.to_str().ok())
        .expect("location header");
    assert_eq!(location, "/admin/urls");
}

#[actix_web::test]
async fn logout_clears_the_session_cookie() {
    let (shlink_url, _stub) = common::stub_shlink::start().await;
    let harness = TestHarness::new(&shlink_url);
    let base_url = common::start_test_server(&harness).await;
    let session = harness.staff_session();

    let response = test_client()
        .post(format!("{}/login/logout", base_url))
        .cookie(session.cookie)
        .send_form(&[("csrf_token", session.csrf_token.as_str())])
        .await
        .expect("request");

    assert_eq!(response.status(), 303);
    let cookies = response.cookies().expect("cookies");
    let cleared = cookies
        .iter()
        .find(|cookie| cookie.name() == "linkpress_session")
        .expect("session cookie");
    assert!(cleared.value().is_empty());
}
