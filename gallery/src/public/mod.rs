// This file is part of the product NoPressure Gallery.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_web::web;

pub mod error;
pub mod flash;
pub mod handlers;
pub mod multipart;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(handlers::index))
        .service(
            web::resource("/upload")
                .route(web::get().to(handlers::upload_form))
                .route(web::post().to(handlers::upload_submit)),
        )
        .route("/about", web::get().to(handlers::about))
        .route("/media/{path:.*}", web::get().to(handlers::media));
}
