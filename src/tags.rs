// This file is part of the product LinkPress.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use serde::{Deserialize, Serialize};
use url::Url;

pub const CUSTOM_PREFIX: &str = "custom";
pub const CREATED_BY_PREFIX: &str = "createdBy";
pub const TEAM_PREFIX: &str = "team";
pub const PROJECT_PREFIX: &str = "project";

/// The five standard campaign-tracking query keys, in canonical order.
pub const UTM_PREFIXES: [&str; 5] = [
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
];

/// A tag split into its namespace prefix and value.
///
/// Tags are stored in the remote shortener as flat strings of the form
/// `prefix:value`. Splitting is on the first colon only; the remainder is
/// kept verbatim, so `custom:a:b` parses to prefix `custom`, value `a:b`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTag {
    pub prefix: Option<String>,
    pub value: String,
    pub original: String,
}

pub fn parse_tag(tag: &str) -> ParsedTag {
    match tag.split_once(':') {
        Some((prefix, value)) => ParsedTag {
            prefix: Some(prefix.to_string()),
            value: value.to_string(),
            original: tag.to_string(),
        },
        None => ParsedTag {
            prefix: None,
            value: tag.to_string(),
            original: tag.to_string(),
        },
    }
}

/// Inverse of `parse_tag` for well-formed inputs.
pub fn format_tag(prefix: &str, value: &str) -> String {
    format!("{}:{}", prefix, value)
}

pub fn is_custom_tag(tag: &str) -> bool {
    parse_tag(tag).prefix.as_deref() == Some(CUSTOM_PREFIX)
}

pub fn is_utm_tag(tag: &str) -> bool {
    match parse_tag(tag).prefix {
        Some(prefix) => UTM_PREFIXES.contains(&prefix.as_str()),
        None => false,
    }
}

/// The bare values of `custom:` tags, in their original relative order.
///
/// Only custom tags are surfaced in list and detail views. UTM, createdBy,
/// team and project tags stay in the backing store but are never displayed.
pub fn display_tags(tags: &[String]) -> Vec<String> {
    tags.iter()
        .map(|tag| parse_tag(tag))
        .filter(|parsed| parsed.prefix.as_deref() == Some(CUSTOM_PREFIX))
        .map(|parsed| parsed.value)
        .collect()
}

/// The UTM campaign parameter set carried by a short URL's tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtmParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utm_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utm_medium: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utm_campaign: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utm_term: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utm_content: Option<String>,
}

impl UtmParameters {
    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            "utm_source" => self.utm_source.as_deref(),
            "utm_medium" => self.utm_medium.as_deref(),
            "utm_campaign" => self.utm_campaign.as_deref(),
            "utm_term" => self.utm_term.as_deref(),
            "utm_content" => self.utm_content.as_deref(),
            _ => None,
        }
    }

    /// Assign a field by its wire key. Unknown keys are ignored and reported
    /// as `false` so callers can drop them silently.
    pub fn set(&mut self, key: &str, value: String) -> bool {
        let slot = match key {
            "utm_source" => &mut self.utm_source,
            "utm_medium" => &mut self.utm_medium,
            "utm_campaign" => &mut self.utm_campaign,
            "utm_term" => &mut self.utm_term,
            "utm_content" => &mut self.utm_content,
            _ => return false,
        };
        *slot = Some(value);
        true
    }

    /// Fields in canonical order with their present, non-blank values.
    pub fn filled(&self) -> Vec<(&'static str, &str)> {
        UTM_PREFIXES
            .iter()
            .filter_map(|key| {
                let value = self.get(key)?;
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some((*key, trimmed))
                }
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.filled().is_empty()
    }
}

/// Collect UTM parameters from a short URL's tag list.
///
/// When the same UTM prefix appears more than once the last tag wins. The
/// remote store does not guarantee tag order, so duplicate prefixes are
/// already ambiguous; see DESIGN.md.
pub fn extract_utm_parameters(tags: &[String]) -> UtmParameters {
    let mut params = UtmParameters::default();
    for tag in tags {
        let parsed = parse_tag(tag);
        if let Some(prefix) = parsed.prefix
            && UTM_PREFIXES.contains(&prefix.as_str())
        {
            params.set(&prefix, parsed.value);
        }
    }
    params
}

/// Encode non-empty UTM fields as tags, in canonical field order.
pub fn utm_parameters_to_tags(params: &UtmParameters) -> Vec<String> {
    params
        .filled()
        .into_iter()
        .map(|(key, value)| format_tag(key, value))
        .collect()
}

/// Rejection detail for a UTM value outside the allowed character class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidUtmValue;

impl InvalidUtmValue {
    pub fn message(&self) -> &'static str {
        "Only letters, numbers, hyphens, underscores, periods, and plus signs are allowed"
    }
}

impl std::fmt::Display for InvalidUtmValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for InvalidUtmValue {}

fn is_allowed_utm_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '+')
}

/// Validate a single UTM field value. Empty and whitespace-only values are
/// valid because every field is optional.
pub fn validate_utm_value(value: &str) -> Result<(), InvalidUtmValue> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(());
    }
    if trimmed.chars().all(is_allowed_utm_char) {
        Ok(())
    } else {
        Err(InvalidUtmValue)
    }
}

fn set_query_params(url: &mut Url, params: &[(&str, &str)]) {
    let replaced: Vec<&str> = params.iter().map(|(key, _)| *key).collect();
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !replaced.contains(&key.as_ref()))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let mut editor = url.query_pairs_mut();
    editor.clear();
    for (key, value) in &kept {
        editor.append_pair(key, value);
    }
    for (key, value) in params {
        editor.append_pair(key, value);
    }
    drop(editor);

    if kept.is_empty() && params.is_empty() {
        url.set_query(None);
    }
}

/// Append the non-empty UTM fields to a long URL's query string, overwriting
/// any same-named parameters already present. Existing non-UTM parameters
/// are preserved.
///
/// An unparsable base URL is returned unchanged; the failure is logged
/// without the URL itself, since long URLs can carry sensitive query data.
pub fn build_url_with_utm_params(base_url: &str, params: &UtmParameters) -> String {
    if base_url.is_empty() {
        return String::new();
    }

    let mut url = match Url::parse(base_url) {
        Ok(url) => url,
        Err(error) => {
            log::error!("Cannot apply UTM parameters, base URL failed to parse: {}", error);
            return base_url.to_string();
        }
    };

    let filled = params.filled();
    if !filled.is_empty() {
        set_query_params(&mut url, &filled);
    }
    url.to_string()
}

/// Read the five known UTM keys from a URL's query string. Returns an empty
/// set when the URL does not parse.
pub fn extract_utm_from_url(url: &str) -> UtmParameters {
    let mut params = UtmParameters::default();
    let Ok(parsed) = Url::parse(url) else {
        return params;
    };
    for (key, value) in parsed.query_pairs() {
        if UTM_PREFIXES.contains(&key.as_ref()) && !value.is_empty() {
            params.set(&key, value.into_owned());
        }
    }
    params
}

/// Strip the five known UTM keys from a URL. Returns the input unchanged
/// when it does not parse.
pub fn base_url(url: &str) -> String {
    let Ok(mut parsed) = Url::parse(url) else {
        return url.to_string();
    };

    let kept: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(key, _)| !UTM_PREFIXES.contains(&key.as_ref()))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    if kept.is_empty() {
        parsed.set_query(None);
    } else {
        let mut editor = parsed.query_pairs_mut();
        editor.clear();
        for (key, value) in &kept {
            editor.append_pair(key, value);
        }
    }
    parsed.to_string()
}

/// Assemble a parameter set from submitted tag strings, keeping only tags
/// whose prefix is a recognized UTM key with a non-empty value. Everything
/// else is dropped silently.
pub fn parse_utm_tags_from_form(tags: &[String]) -> UtmParameters {
    let mut params = UtmParameters::default();
    for tag in tags {
        let parsed = parse_tag(tag);
        if let Some(prefix) = parsed.prefix
            && !parsed.value.is_empty()
        {
            params.set(&prefix, parsed.value);
        }
    }
    params
}

/// A UTM key whose tag-derived value disagrees with the long URL's query
/// string. The tag value is authoritative; conflicts are diagnostic only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UtmConflict {
    pub key: &'static str,
    pub tag_value: String,
    pub url_value: String,
}

pub fn utm_conflicts(tags: &[String], long_url: &str) -> Vec<UtmConflict> {
    let from_tags = extract_utm_parameters(tags);
    let from_url = extract_utm_from_url(long_url);

    UTM_PREFIXES
        .iter()
        .filter_map(|key| {
            let tag_value = from_tags.get(key)?;
            let url_value = from_url.get(key)?;
            if tag_value != url_value {
                Some(UtmConflict {
                    key,
                    tag_value: tag_value.to_string(),
                    url_value: url_value.to_string(),
                })
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn parse_tag_without_colon_has_no_prefix() {
        let parsed = parse_tag("plain");
        assert_eq!(parsed.prefix, None);
        assert_eq!(parsed.value, "plain");
        assert_eq!(parsed.original, "plain");
    }

    #[test]
    fn parse_tag_splits_on_first_colon_only() {
        let parsed = parse_tag("custom:a:b:c");
        assert_eq!(parsed.prefix.as_deref(), Some("custom"));
        assert_eq!(parsed.value, "a:b:c");
        assert_eq!(parsed.original, "custom:a:b:c");
    }

    #[test]
    fn parse_tag_keeps_empty_value() {
        let parsed = parse_tag("custom:");
        assert_eq!(parsed.prefix.as_deref(), Some("custom"));
        assert_eq!(parsed.value, "");
    }

    #[test]
    fn format_tag_round_trips_through_parse() {
        let formatted = format_tag("utm_source", "news:letter");
        let parsed = parse_tag(&formatted);
        assert_eq!(parsed.prefix.as_deref(), Some("utm_source"));
        assert_eq!(parsed.value, "news:letter");
        assert_eq!(parsed.original, formatted);
    }

    #[test]
    fn classification_predicates() {
        assert!(is_custom_tag("custom:launch"));
        assert!(!is_custom_tag("createdBy:bob"));
        assert!(!is_custom_tag("launch"));
        assert!(is_utm_tag("utm_medium:email"));
        assert!(!is_utm_tag("utm_unknown:x"));
        assert!(!is_utm_tag("plain"));
    }

    #[test]
    fn display_tags_keeps_only_custom_values_in_order() {
        let input = tags(&["custom:a", "createdBy:bob", "custom:b", "utm_source:google"]);
        assert_eq!(display_tags(&input), vec!["a", "b"]);
    }

    #[test]
    fn extract_utm_parameters_last_tag_wins() {
        let input = tags(&["utm_source:google", "utm_source:newsletter", "team:growth"]);
        let params = extract_utm_parameters(&input);
        assert_eq!(params.utm_source.as_deref(), Some("newsletter"));
        assert_eq!(params.utm_medium, None);
    }

    #[test]
    fn utm_parameters_to_tags_skips_blank_fields_in_canonical_order() {
        let params = UtmParameters {
            utm_medium: Some("  email ".to_string()),
            utm_source: Some("google".to_string()),
            utm_campaign: Some("".to_string()),
            utm_term: Some("   ".to_string()),
            ..UtmParameters::default()
        };
        assert_eq!(
            utm_parameters_to_tags(&params),
            vec!["utm_source:google", "utm_medium:email"]
        );
    }

    #[test]
    fn validate_utm_value_accepts_empty_and_allowed_class() {
        assert!(validate_utm_value("").is_ok());
        assert!(validate_utm_value("   ").is_ok());
        assert!(validate_utm_value("good-value_1.2").is_ok());
        assert!(validate_utm_value("running+shoes").is_ok());
    }

    #[test]
    fn validate_utm_value_rejects_disallowed_characters() {
        let error = validate_utm_value("bad value!").unwrap_err();
        assert!(!error.message().is_empty());
        assert!(validate_utm_value("semi;colon").is_err());
        assert!(validate_utm_value("ümlaut").is_err());
    }

    #[test]
    fn build_url_appends_utm_params_after_existing_query() {
        let params = UtmParameters {
            utm_source: Some("fb".to_string()),
            ..UtmParameters::default()
        };
        assert_eq!(
            build_url_with_utm_params("https://x.com/a?b=1", &params),
            "https://x.com/a?b=1&utm_source=fb"
        );
    }

    #[test]
    fn build_url_overwrites_existing_utm_param() {
        let params = UtmParameters {
            utm_source: Some("email".to_string()),
            ..UtmParameters::default()
        };
        let built =
            build_url_with_utm_params("https://x.com/a?utm_source=google&keep=1", &params);
        assert_eq!(built, "https://x.com/a?keep=1&utm_source=email");
    }

    #[test]
    fn build_url_returns_unparsable_input_unchanged() {
        let params = UtmParameters {
            utm_source: Some("fb".to_string()),
            ..UtmParameters::default()
        };
        assert_eq!(build_url_with_utm_params("not a url", &params), "not a url");
        assert_eq!(build_url_with_utm_params("", &params), "");
    }

    #[test]
    fn extract_utm_from_url_reads_known_keys() {
        let params =
            extract_utm_from_url("https://x.com/?utm_source=google&utm_medium=cpc&other=1");
        assert_eq!(params.utm_source.as_deref(), Some("google"));
        assert_eq!(params.utm_medium.as_deref(), Some("cpc"));
        assert_eq!(params.utm_campaign, None);
    }

    #[test]
    fn extract_utm_from_url_is_empty_on_parse_failure() {
        assert_eq!(extract_utm_from_url("not a url"), UtmParameters::default());
    }

    #[test]
    fn base_url_strips_only_utm_keys() {
        assert_eq!(
            base_url("https://x.com/a?b=1&utm_source=google&utm_term=shoes"),
            "https://x.com/a?b=1"
        );
        assert_eq!(base_url("not a url"), "not a url");
    }

    #[test]
    fn base_url_drops_query_when_only_utm_keys_present() {
        let stripped = base_url("https://x.com/a?utm_source=google");
        assert_eq!(stripped, "https://x.com/a");
    }

    #[test]
    fn base_url_is_idempotent_over_build() {
        let params = UtmParameters {
            utm_source: Some("fb".to_string()),
            utm_campaign: Some("launch".to_string()),
            ..UtmParameters::default()
        };
        let original = "https://x.com/path?b=1&c=2";
        let built = build_url_with_utm_params(original, &params);
        assert_eq!(base_url(&built), base_url(original));
    }

    #[test]
    fn parse_utm_tags_from_form_drops_unknown_prefixes() {
        let input = tags(&[
            "utm_source:google",
            "custom:ignored",
            "utm_medium:",
            "bogus",
            "utm_campaign:launch",
        ]);
        let params = parse_utm_tags_from_form(&input);
        assert_eq!(params.utm_source.as_deref(), Some("google"));
        assert_eq!(params.utm_campaign.as_deref(), Some("launch"));
        assert_eq!(params.utm_medium, None);
    }

    #[test]
    fn utm_conflicts_reports_disagreeing_keys_only() {
        let input = tags(&["utm_source:newsletter", "utm_medium:email"]);
        let conflicts = utm_conflicts(
            &input,
            "https://x.com/?utm_source=google&utm_medium=email&utm_term=shoes",
        );
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].key, "utm_source");
        assert_eq!(conflicts[0].tag_value, "newsletter");
        assert_eq!(conflicts[0].url_value, "google");
    }

    #[test]
    fn utm_conflicts_is_empty_on_unparsable_url() {
        let input = tags(&["utm_source:newsletter"]);
        assert!(utm_conflicts(&input, "not a url").is_empty());
    }
}
