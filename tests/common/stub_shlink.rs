// This file is part of the product LinkPress.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

// Canned stand-in for the remote Shlink API. Records every call so tests
// can assert on what the console sent.

use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

use lnp::util::test_config::TEST_API_KEY;

#[derive(Clone, Default)]
pub struct StubShlink {
    calls: Arc<Mutex<Vec<String>>>,
    create_bodies: Arc<Mutex<Vec<Value>>>,
}

impl StubShlink {
    pub fn recorded_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn recorded_create_bodies(&self) -> Vec<Value> {
        self.create_bodies.lock().unwrap().clone()
    }

    fn record(&self, req: &HttpRequest) {
        let entry = match req.query_string() {
            "" => format!("{} {}", req.method(), req.path()),
            query => format!("{} {}?{}", req.method(), req.path(), query),
        };
        self.calls.lock().unwrap().push(entry);
    }
}

fn authorized(req: &HttpRequest) -> bool {
    req.headers()
        .get("X-Api-Key")
        .and_then(|value| value.to_str().ok())
        == Some(TEST_API_KEY)
}

fn problem(status: u16, detail: &str) -> HttpResponse {
    let mut builder = match status {
        401 => HttpResponse::Unauthorized(),
        404 => HttpResponse::NotFound(),
        _ => HttpResponse::BadRequest(),
    };
    builder.json(json!({
        "type": "https://shlink.io/api/error",
        "title": "Error",
        "detail": detail,
        "status": status,
    }))
}

fn short_url_json(short_code: &str, long_url: &str, tags: Vec<&str>) -> Value {
    json!({
        "shortCode": short_code,
        "shortUrl": format!("https://s.example.com/{}", short_code),
        "longUrl": long_url,
        "dateCreated": "2026-01-15T09:30:00+00:00",
        "visitsSummary": {"total": 42, "nonBots": 40, "bots": 2},
        "tags": tags,
        "title": null,
        "meta": {"validSince": null, "validUntil": null, "maxVisits": null},
        "crawlable": true,
        "forwardQuery": true,
    })
}

async fn list_short_urls(req: HttpRequest, stub: web::Data<StubShlink>) -> HttpResponse {
    stub.record(&req);
    if !authorized(&req) {
        return problem(401, "Invalid API key");
    }
    HttpResponse::Ok().json(json!({
        "shortUrls": {
            "data": [
                short_url_json(
                    "abc123",
                    "https://example.com/landing",
                    vec!["custom:launch", "createdBy:ops@example.com", "utm_source:newsletter"],
                ),
                short_url_json("def456", "https://example.com/other", vec![]),
            ],
            "pagination": {"currentPage": 1, "pagesCount": 1, "totalItems": 2},
        }
    }))
}

async fn create_short_url(
    req: HttpRequest,
    body: web::Json<Value>,
    stub: web::Data<StubShlink>,
) -> HttpResponse {
    stub.record(&req);
    if !authorized(&req) {
        return problem(401, "Invalid API key");
    }
    let body = body.into_inner();
    stub.create_bodies.lock().unwrap().push(body.clone());

    if body["customSlug"] == json!("taken") {
        return problem(400, "Slug already in use");
    }

    let long_url = body["longUrl"].as_str().unwrap_or_default().to_string();
    let tags: Vec<&str> = body["tags"]
        .as_array()
        .map(|values| values.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    HttpResponse::Ok().json(short_url_json("new123", &long_url, tags))
}

async fn get_short_url(
    req: HttpRequest,
    path: web::Path<String>,
    stub: web::Data<StubShlink>,
) -> HttpResponse {
    stub.record(&req);
    if !authorized(&req) {
        return problem(401, "Invalid API key");
    }
    let short_code = path.into_inner();
    if short_code == "missing" {
        return problem(404, "No URL found with short code missing");
    }
    HttpResponse::Ok().json(short_url_json(
        &short_code,
        "https://example.com/landing?utm_source=google",
        vec!["custom:launch", "createdBy:ops@example.com", "utm_source:newsletter"],
    ))
}

async fn edit_short_url(
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<Value>,
    stub: web::Data<StubShlink>,
) -> HttpResponse {
    stub.record(&req);
    if !authorized(&req) {
        return problem(401, "Invalid API key");
    }
    let short_code = path.into_inner();
    if short_code == "missing" {
        return problem(404, "No URL found with short code missing");
    }
    let body = body.into_inner();
    stub.create_bodies.lock().unwrap().push(body.clone());
    let long_url = body["longUrl"].as_str().unwrap_or("https://example.com/landing");
    let tags: Vec<&str> = body["tags"]
        .as_array()
        .map(|values| values.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    HttpResponse::Ok().json(short_url_json(&short_code, long_url, tags))
}

async fn delete_short_url(
    req: HttpRequest,
    path: web::Path<String>,
    stub: web::Data<StubShlink>,
) -> HttpResponse {
    stub.record(&req);
    if !authorized(&req) {
        return problem(401, "Invalid API key");
    }
    if path.into_inner() == "missing" {
        return problem(404, "No URL found with short code missing");
    }
    HttpResponse::NoContent().finish()
}

async fn list_tags(req: HttpRequest, stub: web::Data<StubShlink>) -> HttpResponse {
    stub.record(&req);
    if !authorized(&req) {
        return problem(401, "Invalid API key");
    }
    HttpResponse::Ok().json(json!({
        "tags": {
            "data": ["custom:launch", "custom:spring-sale", "team:growth", "utm_source:newsletter"],
            "stats": {
                "custom:launch": {"shortUrlsCount": 3, "visitsCount": 120},
                "custom:spring-sale": {"shortUrlsCount": 1, "visitsCount": 7},
            },
        }
    }))
}

async fn rename_tag(req: HttpRequest, stub: web::Data<StubShlink>) -> HttpResponse {
    stub.record(&req);
    if !authorized(&req) {
        return problem(401, "Invalid API key");
    }
    HttpResponse::Ok().json(json!({}))
}

async fn delete_tags(req: HttpRequest, stub: web::Data<StubShlink>) -> HttpResponse {
    stub.record(&req);
    if !authorized(&req) {
        return problem(401, "Invalid API key");
    }
    HttpResponse::NoContent().finish()
}

async fn list_visits(req: HttpRequest, stub: web::Data<StubShlink>) -> HttpResponse {
    stub.record(&req);
    if !authorized(&req) {
        return problem(401, "Invalid API key");
    }
    HttpResponse::Ok().json(json!({
        "visits": {
            "data": [
                {"date": "2026-02-01T10:00:00+00:00", "referer": "", "userAgent": "curl/8",
                 "potentialBot": false},
                {"date": "2026-02-01T11:00:00+00:00", "referer": "https://news.example.com",
                 "userAgent": "Mozilla/5.0", "potentialBot": true},
            ],
        }
    }))
}

async fn short_url_visits(
    req: HttpRequest,
    path: web::Path<String>,
    stub: web::Data<StubShlink>,
) -> HttpResponse {
    stub.record(&req);
    if !authorized(&req) {
        return problem(401, "Invalid API key");
    }
    if path.into_inner() == "missing" {
        return problem(404, "No URL found with short code missing");
    }
    HttpResponse::Ok().json(json!({
        "visits": {
            "data": [
                {"date": "2026-02-01T10:00:00+00:00", "referer": "", "userAgent": "curl/8",
                 "potentialBot": false},
            ],
        }
    }))
}

// The QR endpoint is public on real instances as well, no API key involved.
async fn qr_code(req: HttpRequest, stub: web::Data<StubShlink>) -> HttpResponse {
    stub.record(&req);
    HttpResponse::Ok()
        .content_type("image/png")
        .body(vec![0x89, 0x50, 0x4e, 0x47])
}

/// Boot the stub on an ephemeral loopback port; returns its base URL and
/// the handle for asserting on recorded calls.
pub async fn start() -> (String, StubShlink) {
    let stub = StubShlink::default();
    let stub_data = web::Data::new(stub.clone());

    let server = HttpServer::new(move || {
        App::new()
            .app_data(stub_data.clone())
            .route("/rest/v3/short-urls", web::get().to(list_short_urls))
            .route("/rest/v3/short-urls", web::post().to(create_short_url))
            .route("/rest/v3/short-urls/{short_code}", web::get().to(get_short_url))
            .route(
                "/rest/v3/short-urls/{short_code}",
                web::patch().to(edit_short_url),
            )
            .route(
                "/rest/v3/short-urls/{short_code}",
                web::delete().to(delete_short_url),
            )
            .route(
                "/rest/v3/short-urls/{short_code}/visits",
                web::get().to(short_url_visits),
            )
            .route("/rest/v3/tags", web::get().to(list_tags))
            .route("/rest/v3/tags", web::put().to(rename_tag))
            .route("/rest/v3/tags", web::delete().to(delete_tags))
            .route("/rest/v3/visits", web::get().to(list_visits))
            .route("/{short_code}/qr-code", web::get().to(qr_code))
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .expect("bind stub shlink");

    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());
    (format!("http://{}", addr), stub)
}
