// This file is part of the product NoPressure Gallery.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_web::HttpRequest;
use actix_web::cookie::{Cookie, SameSite};
use log::debug;
use serde::{Deserialize, Serialize};

pub const FLASH_COOKIE_NAME: &str = "gallery_messages";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Error,
    Info,
}

/// One-shot notice carried across a redirect and shown on the next page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub text: String,
}

impl FlashMessage {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            text: text.into(),
        }
    }
}

/// Cookie holding `messages` as percent-encoded JSON.
pub fn flash_cookie(messages: &[FlashMessage]) -> Option<Cookie<'static>> {
    let json = match serde_json::to_string(messages) {
        Ok(json) => json,
        Err(err) => {
            log::error!("Failed to encode flash messages: {}", err);
            return None;
        }
    };
    Some(
        Cookie::build(FLASH_COOKIE_NAME, urlencoding::encode(&json).into_owned())
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .finish(),
    )
}

/// Pending messages on the request. A missing or unreadable cookie yields
/// nothing.
pub fn read_flash(req: &HttpRequest) -> Vec<FlashMessage> {
    let Some(cookie) = req.cookie(FLASH_COOKIE_NAME) else {
        return Vec::new();
    };
    decode_messages(cookie.value()).unwrap_or_else(|| {
        debug!("Ignoring malformed flash cookie");
        Vec::new()
    })
}

pub fn has_flash(req: &HttpRequest) -> bool {
    req.cookie(FLASH_COOKIE_NAME).is_some()
}

/// Expires the flash cookie once its messages were rendered.
pub fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(FLASH_COOKIE_NAME, "").path("/").finish();
    cookie.make_removal();
    cookie
}

fn decode_messages(raw: &str) -> Option<Vec<FlashMessage>> {
    let json = urlencoding::decode(raw).ok()?;
    serde_json::from_str(&json).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn cookie_round_trips_messages() {
        let messages = vec![FlashMessage::success("Модель \"Foo\" успешно загружена!")];
        let cookie = flash_cookie(&messages).unwrap();
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert!(!cookie.value().contains(' '));

        let req = TestRequest::default().cookie(cookie).to_http_request();
        assert_eq!(read_flash(&req), messages);
        assert!(has_flash(&req));
    }

    #[test]
    fn malformed_cookie_is_ignored() {
        let req = TestRequest::default()
            .cookie(Cookie::new(FLASH_COOKIE_NAME, "%7Bnot-json"))
            .to_http_request();
        assert!(read_flash(&req).is_empty());
    }

    #[test]
    fn missing_cookie_yields_nothing() {
        let req = TestRequest::default().to_http_request();
        assert!(read_flash(&req).is_empty());
        assert!(!has_flash(&req));
    }

    #[test]
    fn removal_cookie_expires_immediately() {
        let cookie = removal_cookie();
        assert_eq!(cookie.name(), FLASH_COOKIE_NAME);
        assert_eq!(cookie.value(), "");
        assert!(cookie.max_age().is_some());
    }
}
