// This file is part of the product NoPressure Gallery.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::templates::{ErrorPageContext, TemplateEngine, render_minijinja_template};
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Result};

#[derive(Clone)]
pub struct ErrorRenderer {
    app_name: String,
}

impl ErrorRenderer {
    pub fn new(app_name: String) -> Self {
        Self { app_name }
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }
}

pub fn serve_404(
    renderer: &ErrorRenderer,
    template_engine: Option<&dyn TemplateEngine>,
) -> Result<HttpResponse> {
    serve_error_page(
        renderer.app_name(),
        template_engine,
        StatusCode::NOT_FOUND,
        "error_404.html",
        fallback_404_html,
    )
}

pub fn serve_500(
    renderer: &ErrorRenderer,
    template_engine: Option<&dyn TemplateEngine>,
) -> Result<HttpResponse> {
    serve_error_page(
        renderer.app_name(),
        template_engine,
        StatusCode::INTERNAL_SERVER_ERROR,
        "error_500.html",
        fallback_500_html,
    )
}

fn serve_error_page(
    app_name: &str,
    template_engine: Option<&dyn TemplateEngine>,
    status: StatusCode,
    template_name: &str,
    fallback: fn(&str) -> String,
) -> Result<HttpResponse> {
    let context = ErrorPageContext::new(app_name).to_value();

    let html = match template_engine {
        Some(engine) => match render_minijinja_template(engine, template_name, context) {
            Ok(html) => html,
            Err(e) => {
                log::error!("Failed to render {} template: {}", template_name, e);
                fallback(app_name)
            }
        },
        None => fallback(app_name),
    };

    Ok(HttpResponse::build(status)
        .content_type("text/html; charset=utf-8")
        .insert_header(("Cache-Control", "no-cache, no-store, must-revalidate"))
        .insert_header(("Pragma", "no-cache"))
        .insert_header(("Expires", "0"))
        .body(html))
}

fn fallback_404_html(app_name: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html><head><meta charset="utf-8"><title>404 - Страница не найдена | {}</title></head>
<body><h1>404 - Страница не найдена</h1></body></html>"#,
        app_name
    )
}

fn fallback_500_html(app_name: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html><head><meta charset="utf-8"><title>500 - Внутренняя ошибка сервера | {}</title></head>
<body><h1>500 - Внутренняя ошибка сервера</h1></body></html>"#,
        app_name
    )
}
