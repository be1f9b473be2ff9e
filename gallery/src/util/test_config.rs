// This file is part of the product NoPressure Gallery.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

#![allow(dead_code)]

use crate::config::{AppConfig, LoggingConfig, ServerConfig, UploadConfig, ValidatedConfig};

#[derive(Debug, Clone)]
pub struct TestConfigBuilder {
    config: ValidatedConfig,
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: ValidatedConfig {
                server: ServerConfig {
                    host: "127.0.0.1".to_string(),
                    port: 7080,
                    workers: 1,
                },
                logging: LoggingConfig {
                    level: "info".to_string(),
                },
                app: AppConfig {
                    name: "Test Gallery".to_string(),
                    description: "Test Description".to_string(),
                },
                upload: UploadConfig {
                    max_file_size_mb: 10,
                },
            },
        }
    }

    pub fn with_app_name(mut self, name: &str) -> Self {
        self.config.app.name = name.to_string();
        self
    }

    pub fn with_max_file_size_mb(mut self, max_file_size_mb: u64) -> Self {
        self.config.upload.max_file_size_mb = max_file_size_mb;
        self
    }

    pub fn build(self) -> ValidatedConfig {
        self.config
    }
}

pub fn test_config() -> ValidatedConfig {
    TestConfigBuilder::new().build()
}
