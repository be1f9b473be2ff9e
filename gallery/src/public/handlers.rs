// This file is part of the product NoPressure Gallery.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::error;
use super::flash::{self, FlashMessage};
use super::multipart::read_upload_form;
use crate::app_state::AppState;
use crate::config::ValidatedConfig;
use crate::gallery::{
    ListingQuery, QueryParams, UploadForm, build_listing, store_upload, success_message,
};
use crate::templates::{
    AboutContext, GalleryIndexContext, LayoutContext, UploadFormContext,
    render_minijinja_template,
};
use actix_files::NamedFile;
use actix_multipart::Multipart;
use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, Result, web};
use chrono::Utc;
use log::{debug, error, warn};
use minijinja::Value;

pub async fn index(
    req: HttpRequest,
    config: web::Data<ValidatedConfig>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let assets = match app_state.assets.all() {
        Ok(assets) => assets,
        Err(err) => {
            error!("Failed to read assets: {}", err);
            return serve_500(&app_state);
        }
    };

    let raw_query = req.query_string();
    let query = ListingQuery::from_params(&QueryParams::parse(raw_query));
    let page = build_listing(assets, &query, Utc::now());
    debug!(
        "Listing page {}/{} ({} matching assets)",
        page.number, page.total_pages, page.total_items
    );

    let context = GalleryIndexContext::new(layout(&req, &config), page, query, raw_query);
    render_page(&req, &app_state, "gallery/index.html", context.to_value())
}

pub async fn about(
    req: HttpRequest,
    config: web::Data<ValidatedConfig>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let context = AboutContext::new(layout(&req, &config));
    render_page(&req, &app_state, "gallery/about.html", context.to_value())
}

pub async fn upload_form(
    req: HttpRequest,
    config: web::Data<ValidatedConfig>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let context = UploadFormContext::new(layout(&req, &config), config.upload.max_file_size_mb);
    render_page(&req, &app_state, "gallery/upload.html", context.to_value())
}

pub async fn upload_submit(
    req: HttpRequest,
    payload: Multipart,
    config: web::Data<ValidatedConfig>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let form = match read_upload_form(payload, &config.upload).await {
        Ok(form) => form,
        Err(err) => {
            warn!("Rejected malformed upload body: {}", err);
            return Ok(HttpResponse::BadRequest()
                .content_type("text/plain; charset=utf-8")
                .body("Malformed multipart body"));
        }
    };

    let submitted_title = form.title.trim().to_string();
    let upload = match UploadForm::validate(form) {
        Ok(upload) => upload,
        Err(errors) => {
            debug!("Upload form rejected: {:?}", errors);
            let context =
                UploadFormContext::new(layout(&req, &config), config.upload.max_file_size_mb)
                    .with_submission(&submitted_title, errors);
            return render_page(&req, &app_state, "gallery/upload.html", context.to_value());
        }
    };

    let assets = app_state.assets.clone();
    let media = app_state.media.clone();
    let stored = web::block(move || store_upload(upload, assets.as_ref(), media.as_ref())).await;

    let asset = match stored {
        Ok(Ok(asset)) => asset,
        Ok(Err(err)) => {
            error!("Upload failed: {}", err);
            return serve_500(&app_state);
        }
        Err(err) => {
            error!("Upload task failed: {}", err);
            return serve_500(&app_state);
        }
    };

    let mut response = HttpResponse::SeeOther();
    response.insert_header((header::LOCATION, "/"));
    if let Some(cookie) = flash::flash_cookie(&[FlashMessage::success(success_message(
        &asset.title,
    ))]) {
        response.cookie(cookie);
    }
    Ok(response.finish())
}

pub async fn media(req: HttpRequest, app_state: web::Data<AppState>) -> Result<HttpResponse> {
    let reference = req.match_info().get("path").unwrap_or_default();
    let Some(path) = app_state.media.resolve(reference) else {
        return serve_404(&app_state);
    };

    match NamedFile::open_async(&path).await {
        Ok(file) => Ok(file.into_response(&req)),
        Err(err) => {
            warn!("Failed to open media file {}: {}", path.display(), err);
            serve_404(&app_state)
        }
    }
}

pub async fn not_found(app_state: web::Data<AppState>) -> Result<HttpResponse> {
    serve_404(&app_state)
}

fn layout(req: &HttpRequest, config: &ValidatedConfig) -> LayoutContext {
    LayoutContext::new(
        &config.app.name,
        &config.app.description,
        flash::read_flash(req),
    )
}

/// Renders a full page. Pending flash messages were placed in the context
/// by `layout`, so the cookie is cleared here.
fn render_page(
    req: &HttpRequest,
    app_state: &AppState,
    template_name: &str,
    context: Value,
) -> Result<HttpResponse> {
    let html = match render_minijinja_template(app_state.templates.as_ref(), template_name, context)
    {
        Ok(html) => html,
        Err(err) => {
            error!("Failed to render {}: {}", template_name, err);
            return serve_500(app_state);
        }
    };

    let mut response = HttpResponse::Ok();
    response.content_type("text/html; charset=utf-8");
    if flash::has_flash(req) {
        response.cookie(flash::removal_cookie());
    }
    Ok(response.body(html))
}

fn serve_404(app_state: &AppState) -> Result<HttpResponse> {
    error::serve_404(
        &app_state.error_renderer,
        Some(app_state.templates.as_ref()),
    )
}

fn serve_500(app_state: &AppState) -> Result<HttpResponse> {
    error::serve_500(
        &app_state.error_renderer,
        Some(app_state.templates.as_ref()),
    )
}
