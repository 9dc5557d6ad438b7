//! Pinned pattern sets for attribute stability classification
//!
//! These regex heuristics are approximate and are treated as a pinned
//! specification: changing a pattern or its precedence is a policy change
//! with test fallout, not a bug fix.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Attributes classified into the priority tier, in trust order
pub const PRIORITY_ATTRS: &[&str] = &["id", "name", "title", "alt", "role", "type"];

/// Test-oriented data attribute names that are stable by convention
pub const TEST_DATA_ATTRS: &[&str] = &[
    "data-testid",
    "data-test-id",
    "data-test",
    "data-cy",
    "data-qa",
    "data-automation-id",
    "data-e2e",
];

static UUID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .expect("uuid pattern")
});

static LONG_HEX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9a-fA-F]{12,}$").expect("hex pattern"));

static DIGIT_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{10,}").expect("digit pattern"));

static TOKEN_SHAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{16,}$").expect("token pattern"));

/// Machine-generated class shapes injected by styling toolchains
static MACHINE_CLASS_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"^css-[a-z0-9]{4,}$",                      // emotion
        r"^jsx-[0-9]+$",                            // styled-jsx
        r"^sc-[a-zA-Z0-9]{4,}$",                    // styled-components
        r"^svelte-[a-z0-9]{4,}$",                   // svelte scoped
        r"^[a-zA-Z0-9]+_[a-zA-Z0-9-]+__[a-zA-Z0-9_-]{5,}$", // css-modules
    ]
    .iter()
    .map(|p| Regex::new(p).expect("class pattern"))
    .collect()
});

/// Framework-injected attribute names (scoped-style and content-projection
/// markers); always excluded from stable candidates
static FRAMEWORK_ATTR_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"^data-v-[0-9a-f]{6,}$", // vue scoped styles
        r"^_ngcontent-",          // angular content projection
        r"^_nghost-",             // angular host marker
        r"^ng-",                  // angularjs
        r"^data-react",           // react roots/ids
        r"^data-emotion",
        r"^data-styled",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("framework pattern"))
    .collect()
});

/// UI framework fingerprint detected from attribute shapes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameworkKind {
    React,
    Vue,
    Angular,
    Svelte,
    #[default]
    Unknown,
}

/// Value matches a hash/UUID/random-token shape
pub fn is_random_token(value: &str) -> bool {
    if value.is_empty() {
        return false;
    }
    if UUID_RE.is_match(value) || LONG_HEX_RE.is_match(value) || DIGIT_RUN_RE.is_match(value) {
        return true;
    }
    // Long mixed tokens with a meaningful digit share read as generated
    if TOKEN_SHAPE_RE.is_match(value) {
        let digits = value.chars().filter(|c| c.is_ascii_digit()).count();
        return digits >= 4;
    }
    false
}

/// Single class token injected by a styling toolchain
pub fn is_machine_class(token: &str) -> bool {
    MACHINE_CLASS_RES.iter().any(|re| re.is_match(token)) || is_random_token(token)
}

/// Whole class list looks machine-generated (any token matches)
pub fn class_list_is_machine_generated(class_attr: &str) -> bool {
    class_attr.split_whitespace().any(is_machine_class)
}

/// Class tokens safe to build candidates on
pub fn filtered_class_tokens(class_attr: &str) -> Vec<String> {
    class_attr
        .split_whitespace()
        .filter(|token| token.len() > 1 && !is_machine_class(token))
        .map(|token| token.to_string())
        .collect()
}

/// Attribute name matches a framework-injection marker
pub fn is_framework_attr_name(name: &str) -> bool {
    FRAMEWORK_ATTR_RES.iter().any(|re| re.is_match(name))
}

/// Data attribute stable enough to locate on: a known test-oriented name,
/// or any data attribute whose value is not hash-like
pub fn is_stable_data_attr(name: &str, value: &str) -> bool {
    if TEST_DATA_ATTRS.contains(&name) {
        return true;
    }
    name.starts_with("data-") && !is_framework_attr_name(name) && !is_random_token(value)
}

/// Fingerprint the injecting framework from the full attribute set
pub fn detect_framework(attrs: &[(String, String)]) -> (FrameworkKind, Vec<String>) {
    let mut matched = Vec::new();
    let mut kind = FrameworkKind::Unknown;
    for (name, value) in attrs {
        let hit = if name.starts_with("data-v-") {
            Some(FrameworkKind::Vue)
        } else if name.starts_with("_ngcontent-") || name.starts_with("_nghost-") || name.starts_with("ng-") {
            Some(FrameworkKind::Angular)
        } else if name.starts_with("data-react") {
            Some(FrameworkKind::React)
        } else if name == "class" {
            let tokens: Vec<&str> = value.split_whitespace().collect();
            if tokens.iter().any(|t| t.starts_with("svelte-") && is_machine_class(t)) {
                Some(FrameworkKind::Svelte)
            } else if tokens.iter().any(|t| t.starts_with("jsx-") && is_machine_class(t)) {
                Some(FrameworkKind::React)
            } else {
                None
            }
        } else {
            None
        };
        if let Some(found) = hit {
            matched.push(name.clone());
            if kind == FrameworkKind::Unknown {
                kind = found;
            }
        }
    }
    (kind, matched)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_tokens() {
        assert!(is_random_token("550e8400-e29b-41d4-a716-446655440000"));
        assert!(is_random_token("a3f9c02b71d44e08"));
        assert!(is_random_token("user-1736452891234"));
        assert!(!is_random_token("submit-button"));
        assert!(!is_random_token("main"));
        assert!(!is_random_token(""));
    }

    #[test]
    fn test_machine_classes() {
        assert!(is_machine_class("css-1q2w3e"));
        assert!(is_machine_class("jsx-392817"));
        assert!(is_machine_class("sc-bdVaJa"));
        assert!(is_machine_class("svelte-1x8r9z"));
        assert!(is_machine_class("Button_root__x7Gh2k"));
        assert!(!is_machine_class("btn-primary"));
        assert!(!is_machine_class("nav"));
    }

    #[test]
    fn test_class_list_detection() {
        assert!(class_list_is_machine_generated("css-1q2w3e active"));
        assert!(!class_list_is_machine_generated("btn btn-primary"));
        assert_eq!(
            filtered_class_tokens("css-1q2w3e btn primary"),
            vec!["btn".to_string(), "primary".to_string()]
        );
    }

    #[test]
    fn test_framework_attrs() {
        assert!(is_framework_attr_name("data-v-7ba5bd90"));
        assert!(is_framework_attr_name("_ngcontent-c12"));
        assert!(is_framework_attr_name("data-reactroot"));
        assert!(!is_framework_attr_name("data-testid"));
    }

    #[test]
    fn test_stable_data_attrs() {
        assert!(is_stable_data_attr("data-testid", "a3f9c02b71d44e08"));
        assert!(is_stable_data_attr("data-section", "pricing"));
        assert!(!is_stable_data_attr("data-key", "550e8400-e29b-41d4-a716-446655440000"));
        assert!(!is_stable_data_attr("title", "pricing"));
    }

    #[test]
    fn test_detect_framework() {
        let attrs = vec![
            ("data-v-7ba5bd90".to_string(), String::new()),
            ("class".to_string(), "card".to_string()),
        ];
        let (kind, matched) = detect_framework(&attrs);
        assert_eq!(kind, FrameworkKind::Vue);
        assert_eq!(matched, vec!["data-v-7ba5bd90".to_string()]);

        let (kind, _) = detect_framework(&[("class".to_string(), "svelte-1x8r9z wrap".to_string())]);
        assert_eq!(kind, FrameworkKind::Svelte);

        let (kind, matched) = detect_framework(&[("class".to_string(), "plain".to_string())]);
        assert_eq!(kind, FrameworkKind::Unknown);
        assert!(matched.is_empty());
    }
}
