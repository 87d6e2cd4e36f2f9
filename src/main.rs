// This file is part of the product LinkPress.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_web::rt::System;
use actix_web::{App, HttpResponse, HttpServer, middleware::Logger, web};
use log::{LevelFilter, info};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use lnp::admin;
use lnp::api;
use lnp::app_state::AppState;
use lnp::assets;
use lnp::config::{ValidatedConfig, load_validated_config};
use lnp::errors;
use lnp::headers::SecurityHeaders;
use lnp::iam::jwt::JwtService;
use lnp::iam::middleware::JwtAuthMiddlewareFactory;
use lnp::iam::{FileUserStore, UserDirectory};
use lnp::login;
use lnp::util::CsrfTokenStore;

const DEFAULT_CONFIG_FILE: &str = "linkpress.yaml";

struct ParsedArgs {
    config_path: PathBuf,
    show_help: bool,
}

fn parse_args() -> Result<ParsedArgs, String> {
    let mut config_path = PathBuf::from(DEFAULT_CONFIG_FILE);
    let mut show_help = false;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-C" => {
                let value = args
                    .next()
                    .ok_or_else(|| "-C requires a configuration file path".to_string())?;
                config_path = PathBuf::from(value);
            }
            "-h" | "--help" => show_help = true,
            other => return Err(format!("Unknown argument: {}", other)),
        }
    }

    Ok(ParsedArgs {
        config_path,
        show_help,
    })
}

fn help_text() -> &'static str {
    "LinkPress - staff console for a Shlink-compatible URL shortener\n\
     \n\
     Usage: lnp [-C <config-file>]\n\
     \n\
     Options:\n\
     \x20 -C <config-file>  Configuration file (default: linkpress.yaml)\n\
     \x20 -h, --help        Show this help\n"
}

fn main() {
    let exit_code = run();
    std::process::exit(exit_code);
}

fn run() -> i32 {
    let parsed_args = match parse_args() {
        Ok(args) => args,
        Err(error) => {
            eprintln!("❌ Invalid command line arguments: {}", error);
            eprintln!("❌ Use -C <config-file> to point at the configuration file.");
            return 1;
        }
    };

    if parsed_args.show_help {
        print!("{}", help_text());
        return 0;
    }

    let config = match load_validated_config(&parsed_args.config_path) {
        Ok(config) => Arc::new(config),
        Err(error) => {
            eprintln!("❌ Configuration error: {}", error);
            eprintln!("❌ Application cannot start with invalid configuration.");
            return 1;
        }
    };

    init_logging(&config);

    let result = System::new().block_on(run_server(config));
    match result {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("❌ Server failed to start: {}", error);
            1
        }
    }
}

fn init_logging(config: &ValidatedConfig) {
    let log_level = match config.logging.level.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Info,
    };

    // Stable timestamped format; stdout only, rotation is the supervisor's job.
    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] {}: {}",
                chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f UTC"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}

async fn run_server(config: Arc<ValidatedConfig>) -> std::io::Result<()> {
    let user_store = FileUserStore::new(config.auth.users_file.clone())
        .map_err(|error| std::io::Error::other(error.to_string()))?;
    let directory = UserDirectory::from_store(&user_store)
        .map_err(|error| std::io::Error::other(error.to_string()))?;
    let app_state = AppState::new(&config)
        .map_err(|error| std::io::Error::other(error.to_string()))?;

    let config_data = web::Data::from(config.clone());
    let app_state_data = web::Data::new(app_state);
    let directory_data = web::Data::new(directory);
    let jwt_service_data = web::Data::new(JwtService::new(&config));
    let csrf_store_data = web::Data::new(CsrfTokenStore::new());

    let addr = config.socket_addr();
    info!("{} listening on http://{}", config.app_name, addr);
    info!("Remote shortener: {}", config.shlink.base_url);
    info!("Staff accounts loaded: {}", directory_data.len());

    let admin_config = config.clone();
    HttpServer::new(move || {
        App::new()
            .app_data(config_data.clone())
            .app_data(app_state_data.clone())
            .app_data(directory_data.clone())
            .app_data(jwt_service_data.clone())
            .app_data(csrf_store_data.clone())
            // Registered first so it runs closest to the handlers, after
            // logging and header middleware have seen the request.
            .wrap(JwtAuthMiddlewareFactory)
            .wrap(SecurityHeaders)
            .wrap(Logger::default())
            .configure(assets::configure)
            .configure(login::configure)
            .configure(api::configure)
            .configure(|cfg| admin::handlers::configure(cfg, &admin_config))
            .route("/", web::get().to(root_redirect))
            .default_service(web::route().to(not_found))
    })
    .bind(addr)?
    .run()
    .await
}

async fn root_redirect() -> HttpResponse {
    HttpResponse::Found()
        .insert_header(("Location", "/admin/urls"))
        .finish()
}

async fn not_found(app_state: web::Data<AppState>) -> actix_web::Result<HttpResponse> {
    errors::serve_404(
        &app_state.error_renderer,
        Some(app_state.templates.as_ref()),
    )
}
