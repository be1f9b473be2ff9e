// This file is part of the product NoPressure Gallery.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::gallery::QueryParams;
use minijinja::value::Kwargs;
use minijinja::{Environment, Value, default_auto_escape_callback};

pub trait TemplateEngine: Send + Sync {
    fn render(&self, template_name: &str, context: Value) -> Result<String, minijinja::Error>;
}

pub struct MiniJinjaEngine {
    env: Environment<'static>,
}

impl MiniJinjaEngine {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_auto_escape_callback(default_auto_escape_callback);
        env.set_loader(embedded_template_loader);
        env.add_function("param_replace", param_replace);
        Self { env }
    }
}

impl Default for MiniJinjaEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine for MiniJinjaEngine {
    fn render(&self, template_name: &str, context: Value) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template(template_name)?;
        tmpl.render(context)
    }
}

/// `{{ param_replace(query, page=2) }}`: the current query string with the
/// given keys replaced. Keyword values are stringified.
fn param_replace(query: String, overrides: Kwargs) -> Result<String, minijinja::Error> {
    let current = QueryParams::parse(&query);
    let mut pairs = Vec::new();
    for key in overrides.args() {
        let value: Value = overrides.get(key)?;
        pairs.push((key.to_string(), value.to_string()));
    }
    overrides.assert_all_used()?;
    Ok(current.with_overrides(pairs).to_query_string())
}

fn embedded_template_loader(name: &str) -> Result<Option<String>, minijinja::Error> {
    let template_content = match name {
        "base.html" => Some(include_str!("../public/templates/base.html")),

        // Gallery pages
        "gallery/index.html" => Some(include_str!("../public/templates/gallery/index.html")),
        "gallery/upload.html" => Some(include_str!("../public/templates/gallery/upload.html")),
        "gallery/about.html" => Some(include_str!("../public/templates/gallery/about.html")),

        // Error pages
        "error_404.html" => Some(include_str!("../public/templates/error_404.html")),
        "error_500.html" => Some(include_str!("../public/templates/error_500.html")),

        _ => None,
    };

    Ok(template_content.map(|s| s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use minijinja::context;

    fn render_str(source: &str, ctx: Value) -> String {
        let engine = MiniJinjaEngine::new();
        engine.env.render_str(source, ctx).unwrap()
    }

    #[test]
    fn param_replace_overrides_and_keeps_other_keys() {
        let out = render_str(
            "{{ param_replace(query, page=2) }}",
            context! { query => "q=cat&ordering=new&page=1" },
        );
        assert_eq!(out, "q=cat&ordering=new&page=2");
    }

    #[test]
    fn param_replace_adds_missing_key() {
        let out = render_str(
            "{{ param_replace(query, ordering='old') }}",
            context! { query => "q=big+cat" },
        );
        assert_eq!(out, "q=big%20cat&ordering=old");
    }

    #[test]
    fn every_embedded_template_parses() {
        let engine = MiniJinjaEngine::new();
        for name in [
            "base.html",
            "gallery/index.html",
            "gallery/upload.html",
            "gallery/about.html",
            "error_404.html",
            "error_500.html",
        ] {
            assert!(engine.env.get_template(name).is_ok(), "{}", name);
        }
    }
}
