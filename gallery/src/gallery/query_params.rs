// This file is part of the product NoPressure Gallery.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

/// Query string parameters as an ordered mapping from key to every value
/// supplied for it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    entries: Vec<(String, Vec<String>)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `a=1&b=x+y&a=2`. `+` is a space, pairs without `=` get an
    /// empty value, empty segments are skipped.
    pub fn parse(raw: &str) -> Self {
        let mut params = Self::new();
        for segment in raw.trim_start_matches('?').split('&') {
            if segment.is_empty() {
                continue;
            }
            let (key, value) = segment.split_once('=').unwrap_or((segment, ""));
            params.append(&decode_component(key), decode_component(value));
        }
        params
    }

    /// Last value supplied for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.get_all(key).last().map(String::as_str)
    }

    pub fn get_all(&self, key: &str) -> &[String] {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, values)| values.as_slice())
            .unwrap_or(&[])
    }

    pub fn append(&mut self, key: &str, value: String) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((key.to_string(), vec![value])),
        }
    }

    /// Replaces every value of `key` with `value`, keeping the key's position.
    pub fn set(&mut self, key: &str, value: String) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, values)) => *values = vec![value],
            None => self.entries.push((key.to_string(), vec![value])),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn with_overrides<K, V, I>(&self, overrides: I) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut merged = self.clone();
        for (key, value) in overrides {
            merged.set(key.as_ref(), value.into());
        }
        merged
    }

    pub fn to_query_string(&self) -> String {
        let mut pairs = Vec::new();
        for (key, values) in &self.entries {
            let key = urlencoding::encode(key);
            for value in values {
                pairs.push(format!("{}={}", key, urlencoding::encode(value)));
            }
        }
        pairs.join("&")
    }
}

/// Current parameters with each override replacing (or adding) its key;
/// everything else, including repeated keys, is carried over unchanged.
pub fn merge_query(current: &QueryParams, overrides: &[(&str, &str)]) -> String {
    current
        .with_overrides(overrides.iter().map(|(k, v)| (*k, *v)))
        .to_query_string()
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    String::from_utf8_lossy(&urlencoding::decode_binary(spaced.as_bytes())).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_pairs(params: &QueryParams) -> Vec<(String, Vec<String>)> {
        let mut pairs: Vec<_> = params
            .keys()
            .map(|k| (k.to_string(), params.get_all(k).to_vec()))
            .collect();
        pairs.sort();
        pairs
    }

    #[test]
    fn parse_decodes_plus_and_percent() {
        let params = QueryParams::parse("q=big+cat&title=%D0%BA%D0%BE%D1%82&flag");
        assert_eq!(params.get("q"), Some("big cat"));
        assert_eq!(params.get("title"), Some("кот"));
        assert_eq!(params.get("flag"), Some(""));
        assert_eq!(params.get("missing"), None);
    }

    #[test]
    fn parse_keeps_repeated_keys_and_returns_last() {
        let params = QueryParams::parse("tag=a&&tag=b");
        assert_eq!(params.get_all("tag"), ["a".to_string(), "b".to_string()]);
        assert_eq!(params.get("tag"), Some("b"));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn merge_adds_page_and_round_trips() {
        let current = QueryParams::parse("q=cat&ordering=new");
        let merged = merge_query(&current, &[("page", "2")]);

        let decoded = QueryParams::parse(&merged);
        assert_eq!(
            as_pairs(&decoded),
            vec![
                ("ordering".to_string(), vec!["new".to_string()]),
                ("page".to_string(), vec!["2".to_string()]),
                ("q".to_string(), vec!["cat".to_string()]),
            ]
        );
    }

    #[test]
    fn merge_replaces_all_values_of_overridden_key() {
        let current = QueryParams::parse("page=1&page=3&tag=x&tag=y");
        let merged = QueryParams::parse(&merge_query(&current, &[("page", "4")]));
        assert_eq!(merged.get_all("page"), ["4".to_string()]);
        assert_eq!(merged.get_all("tag"), ["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn merge_does_not_touch_the_input() {
        let current = QueryParams::parse("page=1");
        let _ = merge_query(&current, &[("page", "9")]);
        assert_eq!(current.get("page"), Some("1"));
    }

    #[test]
    fn serialization_escapes_reserved_characters() {
        let mut params = QueryParams::new();
        params.set("q", "a&b=c d".to_string());
        let encoded = params.to_query_string();
        assert!(!encoded.contains(' '));
        assert_eq!(QueryParams::parse(&encoded).get("q"), Some("a&b=c d"));
    }

    #[test]
    fn empty_query_serializes_to_empty_string() {
        assert_eq!(QueryParams::parse("").to_query_string(), "");
        assert_eq!(merge_query(&QueryParams::new(), &[("page", "1")]), "page=1");
    }
}
