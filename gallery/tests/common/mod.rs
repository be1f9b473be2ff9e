// This file is part of the product NoPressure Gallery.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

#![allow(dead_code)]

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use chrono::{DateTime, Duration, Utc};
use gallery::app_state::AppState;
use gallery::assets::Asset;
use gallery::config::ValidatedConfig;
use gallery::public;
use gallery::runtime_paths::RuntimePaths;
use gallery::util::TestConfigBuilder;
use gallery::util::test_fixtures::TestFixtureRoot;
use std::sync::Arc;

pub const BOUNDARY: &str = "----gallery-test-boundary";

/// Smallest byte prefix `infer` recognises as PNG.
pub const PNG_BYTES: &[u8] = &[
    0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, b'I', b'H', b'D', b'R',
];

pub struct TestHarness {
    pub fixture: TestFixtureRoot,
    pub config: Arc<ValidatedConfig>,
    pub runtime_paths: RuntimePaths,
    pub app_state: Arc<AppState>,
}

#[derive(Clone)]
pub struct AppBundle {
    pub config: Arc<ValidatedConfig>,
    pub app_state: Arc<AppState>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_assets(&[])
    }

    pub fn with_assets(assets: &[Asset]) -> Self {
        Self::build(TestConfigBuilder::new(), assets)
    }

    pub fn build(config: TestConfigBuilder, assets: &[Asset]) -> Self {
        let fixture = TestFixtureRoot::new_unique("gallery-test-suite").expect("fixture root");
        fixture.write_default_config().expect("config file");
        if !assets.is_empty() {
            fixture.write_assets(assets).expect("seed assets");
        }
        let runtime_paths = fixture.runtime_paths().expect("runtime paths");
        let config = Arc::new(config.build());
        let app_state = Arc::new(
            AppState::open(&config.app.name, runtime_paths.clone()).expect("app state"),
        );

        Self {
            fixture,
            config,
            runtime_paths,
            app_state,
        }
    }

    pub fn app_bundle(&self) -> AppBundle {
        AppBundle {
            config: self.config.clone(),
            app_state: self.app_state.clone(),
        }
    }

    pub fn stored_assets(&self) -> Vec<Asset> {
        self.app_state.assets.all().expect("asset snapshot")
    }
}

pub fn build_test_app(
    bundle: AppBundle,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::from(bundle.config))
        .app_data(web::Data::from(bundle.app_state))
        .configure(public::configure)
        .default_service(web::route().to(public::handlers::not_found))
}

pub fn asset(id: u64, title: &str, created_at: DateTime<Utc>) -> Asset {
    Asset {
        id,
        title: title.to_string(),
        image: format!("assets/{}.png", id),
        created_at,
    }
}

/// `count` assets one minute apart; the highest id is the newest.
pub fn assets_one_minute_apart(count: u64) -> Vec<Asset> {
    let start = Utc::now() - Duration::days(1);
    (1..=count)
        .map(|id| {
            asset(
                id,
                &format!("Asset {:02}", id),
                start + Duration::minutes(id as i64),
            )
        })
        .collect()
}

pub enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        name: &'a str,
        file_name: &'a str,
        content_type: &'a str,
        bytes: &'a [u8],
    },
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name)
                        .as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File {
                name,
                file_name,
                content_type,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                        name, file_name
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={}", BOUNDARY)
}

pub fn body_text(bytes: &[u8]) -> String {
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}
