//! Persisted hide rules and the URL-match policy that decides which rules
//! apply to a page.

pub mod store;

pub use store::{JsonFileStore, RuleStore};

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use url::Url;

/// A persisted hide decision for one element on one page. At most one rule
/// exists per `(selector, url)` pair; upserting the same pair replaces the
/// record in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub selector: String,
    /// Originating page address, a full URL rather than a pattern.
    pub url: String,
    pub is_hidden: bool,
    /// Disabled rules are kept but skipped at apply time.
    pub is_enabled: bool,
    /// Unix-millis creation time, informational only.
    pub created_at: i64,
}

impl Rule {
    /// A freshly created hide rule, enabled and stamped with the current time.
    pub fn hide(selector: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            url: url.into(),
            is_hidden: true,
            is_enabled: true,
            created_at: now_millis(),
        }
    }

    pub fn key_matches(&self, selector: &str, url: &str) -> bool {
        self.selector == selector && self.url == url
    }
}

pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Flip a stored rule's enabled flag, returning the new state. The pair
/// must exist; a missing pair is an error rather than an implicit insert.
pub async fn toggle_stored_rule<S: RuleStore + ?Sized>(
    store: &S,
    selector: &str,
    url: &str,
) -> crate::error::Result<bool> {
    let rules = store.get_all().await?;
    let Some(mut rule) = rules.into_iter().find(|r| r.key_matches(selector, url)) else {
        return Err(crate::error::HiderError::RuleNotFound {
            selector: selector.to_string(),
            url: url.to_string(),
        });
    };

    rule.is_enabled = !rule.is_enabled;
    let enabled = rule.is_enabled;
    store.upsert(rule).await?;
    Ok(enabled)
}

/// Decide whether a rule recorded against `rule_url` applies to the current
/// page.
///
/// The policy is deliberately loose: the rule's hostname equal to the
/// current hostname counts, and so does the rule URL being a string prefix
/// of the current URL, so query-string and path variation still match. When
/// the rule URL does not parse at all, fall back to a substring check
/// against the hostname. Known consequence: prefix matching without a
/// hostname check can match unrelated pages; kept as-is.
pub fn rule_matches_page(rule_url: &str, current_url: &str, current_hostname: &str) -> bool {
    match Url::parse(rule_url) {
        Ok(parsed) => {
            if parsed.host_str() == Some(current_hostname) {
                return true;
            }
            current_url.starts_with(rule_url)
        }
        Err(_) => !current_hostname.is_empty() && rule_url.contains(current_hostname),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hostname_equality_matches_any_path() {
        assert!(rule_matches_page(
            "https://a.com/settings",
            "https://a.com/profile?tab=2",
            "a.com"
        ));
    }

    #[test]
    fn prefix_match_tolerates_query_strings() {
        assert!(rule_matches_page(
            "https://a.com/x",
            "https://a.com/x?utm=1",
            "b.org"
        ));
    }

    #[test]
    fn unrelated_host_and_url_do_not_match() {
        assert!(!rule_matches_page(
            "https://a.com/x",
            "https://b.org/x",
            "b.org"
        ));
    }

    #[test]
    fn unparsable_rule_url_falls_back_to_hostname_substring() {
        assert!(rule_matches_page("stale a.com bookmark", "https://a.com/", "a.com"));
        assert!(!rule_matches_page("stale bookmark", "https://a.com/", "a.com"));
    }

    #[test]
    fn empty_hostname_never_matches_via_fallback() {
        assert!(!rule_matches_page("not a url", "file:///tmp/x.html", ""));
    }

    #[test]
    fn rule_serde_uses_camel_case() {
        let rule = Rule {
            selector: "#x".to_string(),
            url: "https://a.com/".to_string(),
            is_hidden: true,
            is_enabled: false,
            created_at: 42,
        };

        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(json["isHidden"], true);
        assert_eq!(json["isEnabled"], false);
        assert_eq!(json["createdAt"], 42);

        let back: Rule = serde_json::from_value(json).unwrap();
        assert_eq!(back, rule);
    }

    #[test]
    fn hide_constructor_defaults() {
        let rule = Rule::hide("#x", "https://a.com/");
        assert!(rule.is_hidden);
        assert!(rule.is_enabled);
        assert!(rule.created_at > 0);
    }
}
