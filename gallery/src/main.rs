// This file is part of the product NoPressure Gallery.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_web::middleware::{DefaultHeaders, Logger};
use actix_web::rt::System;
use actix_web::{App, HttpServer, web};
use gallery::app_state::AppState;
use gallery::bootstrap::{self, BootstrapResult};
use gallery::config::ValidatedConfig;
use gallery::public;
use gallery::runtime_paths::RuntimePaths;
use gallery::util;
use log::info;
use std::path::PathBuf;
use std::sync::Arc;

fn main() {
    let exit_code = run();
    std::process::exit(exit_code);
}

fn run() -> i32 {
    let parsed_args = match parse_args() {
        Ok(args) => args,
        Err(error) => {
            eprintln!("❌ Invalid command line arguments: {}", error);
            eprintln!("❌ Use -C <root> to set the runtime directory.");
            return 1;
        }
    };

    if matches!(parsed_args.mode, RunMode::Help) {
        print!("{}", help_text());
        return 0;
    }

    let bootstrap = match bootstrap::bootstrap_runtime(&parsed_args.runtime_root) {
        Ok(result) => result,
        Err(error) => {
            eprintln!("❌ Bootstrap error: {}", error);
            eprintln!("❌ Application cannot start with invalid configuration.");
            return 1;
        }
    };

    match System::new().block_on(run_server(bootstrap)) {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("❌ Server failed to start: {}", error);
            1
        }
    }
}

async fn run_server(bootstrap: BootstrapResult) -> std::io::Result<()> {
    let validated_config = Arc::new(bootstrap.validated_config);
    let runtime_paths = bootstrap.runtime_paths;

    let logger = util::build_logger(validated_config.logging.level_filter());
    util::init_logger(logger).map_err(|error| {
        eprintln!("❌ Failed to initialize logger: {}", error);
        std::io::Error::other(error.to_string())
    })?;

    log_startup_info(&validated_config, &runtime_paths);
    if bootstrap.created_config {
        info!(
            "Created default configuration at {}",
            runtime_paths.config_file.display()
        );
    }

    let app_state = match AppState::open(&validated_config.app.name, runtime_paths.clone()) {
        Ok(state) => Arc::new(state),
        Err(error) => {
            eprintln!("❌ Failed to open asset store: {}", error);
            eprintln!("❌ Application cannot start without the asset store.");
            return Err(std::io::Error::other(error.to_string()));
        }
    };
    let asset_count = app_state.assets.all().map(|assets| assets.len()).unwrap_or(0);
    info!("✅ Asset store loaded with {} assets", asset_count);

    let workers = validated_config.server.workers;
    let factory = {
        let config_for_app = validated_config.clone();
        let app_state_for_app = app_state.clone();

        move || {
            App::new()
                .app_data(web::Data::from(config_for_app.clone()))
                .app_data(web::Data::from(app_state_for_app.clone()))
                .wrap(Logger::new(
                    r#"%a "%r" %s %b "%{Referer}i" "%{User-Agent}i" %T"#,
                ))
                .wrap(DefaultHeaders::new().add(("X-Content-Type-Options", "nosniff")))
                .configure(public::configure)
                .default_service(web::route().to(public::handlers::not_found))
        }
    };

    HttpServer::new(factory)
        .workers(workers)
        .bind(validated_config.server.address_tuple())?
        .run()
        .await
}

fn log_startup_info(config: &ValidatedConfig, runtime_paths: &RuntimePaths) {
    info!("Starting {} - {}", config.app.name, config.app.description);
    info!("Workers: {}", config.server.workers);
    info!(
        "Listening on http://{}:{}",
        config.server.host, config.server.port
    );
    match config.upload.max_upload_bytes() {
        Some(_) => info!("Upload limit: {} MB", config.upload.max_file_size_mb),
        None => info!("Upload limit: unlimited"),
    }

    info!("Runtime root: {}", runtime_paths.root.display());
    info!("Config file: {}", runtime_paths.config_file.display());
    info!("Assets file: {}", runtime_paths.assets_file.display());
    info!(
        "Media directory (canonical): {}",
        runtime_paths.media_dir.display()
    );

    if let Ok(current_dir) = std::env::current_dir() {
        info!("Working directory: {}", current_dir.display());
    }
}

fn help_text() -> String {
    [
        "Usage: gallery [-C <root>] [help]",
        "",
        "Serves the gallery from the runtime root (default: current directory).",
        "A missing config.yaml is created with defaults on first start.",
        "",
        "Options:",
        "  -C <root>    runtime directory holding config.yaml, state/ and media/",
        "  -h, --help   show this help",
        "",
    ]
    .join("\n")
}

#[derive(Debug)]
enum RunMode {
    Serve,
    Help,
}

struct ParsedArgs {
    runtime_root: PathBuf,
    mode: RunMode,
}

fn parse_args() -> Result<ParsedArgs, String> {
    parse_args_from(std::env::args().skip(1))
}

fn parse_args_from<I>(args: I) -> Result<ParsedArgs, String>
where
    I: IntoIterator<Item = String>,
{
    let args: Vec<String> = args.into_iter().collect();
    if args.iter().any(|arg| is_help_flag(arg)) {
        return Ok(ParsedArgs {
            runtime_root: PathBuf::from("."),
            mode: RunMode::Help,
        });
    }

    let mut args = args.into_iter();
    let mut runtime_root = PathBuf::from(".");
    let mut mode = RunMode::Serve;

    while let Some(arg) = args.next() {
        if arg == "--" {
            continue;
        } else if arg == "-C" {
            let value = args
                .next()
                .ok_or_else(|| "Missing value for -C".to_string())?;
            runtime_root = PathBuf::from(value);
        } else if arg.eq_ignore_ascii_case("help") {
            mode = RunMode::Help;
        } else {
            return Err(format!("Unknown argument: {}", arg));
        }
    }

    let runtime_root = make_runtime_root_absolute(runtime_root)?;
    Ok(ParsedArgs { runtime_root, mode })
}

fn is_help_flag(arg: &str) -> bool {
    arg == "-h" || arg == "--help"
}

fn make_runtime_root_absolute(runtime_root: PathBuf) -> Result<PathBuf, String> {
    if runtime_root.is_absolute() {
        return Ok(runtime_root);
    }

    let current_dir = std::env::current_dir()
        .map_err(|error| format!("Failed to resolve current directory: {}", error))?;
    Ok(current_dir.join(runtime_root))
}
