// This file is part of the product NoPressure Gallery.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use env_logger::Logger;
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;

/// Targets whose records are logged one level lower than emitted.
/// actix-server announces every worker at info.
const DEMOTED_TARGETS: [(&str, Level, Level); 1] = [("actix_server", Level::Info, Level::Debug)];

struct DemotingLogger {
    inner: Logger,
}

impl DemotingLogger {
    fn effective_level(target: &str, level: Level) -> Level {
        DEMOTED_TARGETS
            .iter()
            .find(|(prefix, from, _)| target.starts_with(prefix) && *from == level)
            .map(|(_, _, to)| *to)
            .unwrap_or(level)
    }
}

impl Log for DemotingLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        let adjusted = Metadata::builder()
            .level(Self::effective_level(metadata.target(), metadata.level()))
            .target(metadata.target())
            .build();
        self.inner.enabled(&adjusted)
    }

    fn log(&self, record: &Record) {
        let adjusted = Record::builder()
            .level(Self::effective_level(record.target(), record.level()))
            .target(record.target())
            .args(*record.args())
            .module_path(record.module_path())
            .file(record.file())
            .line(record.line())
            .build();
        self.inner.log(&adjusted);
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

/// stdout logger. `level` from config.yaml is the default; per-module
/// `RUST_LOG` directives still apply.
pub fn build_logger(level: LevelFilter) -> Logger {
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .target(env_logger::Target::Stdout)
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
        .build()
}

pub fn init_logger(logger: Logger) -> Result<(), SetLoggerError> {
    log::set_boxed_logger(Box::new(DemotingLogger { inner: logger }))?;
    log::set_max_level(LevelFilter::Trace);
    Ok(())
}
