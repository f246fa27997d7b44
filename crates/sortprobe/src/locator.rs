//! Locator abstraction for table headers and cells.
//!
//! A [`Locator`] is an opaque, declarative reference that the browser
//! collaborator resolves against the live DOM. The engine never inspects the
//! selector text itself; it only hands locators to a [`crate::TableDriver`].
//!
//! # Design Philosophy
//!
//! - **Declarative**: selectors are data, so suites can be loaded from YAML
//! - **Multi-match**: value locators resolve to every matching cell, in
//!   document order
//! - **First-match actions**: clicks and scrolls target the first match

use serde::{Deserialize, Serialize};
use std::fmt;

/// Selector type for locating elements
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Selector {
    /// CSS selector (e.g., "tbody td.last-name")
    Css(String),
    /// XPath selector (e.g., "//tbody/tr/td[@class='dues']")
    XPath(String),
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create an XPath selector
    #[must_use]
    pub fn xpath(selector: impl Into<String>) -> Self {
        Self::XPath(selector.into())
    }

    /// Raw selector text
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Css(s) | Self::XPath(s) => s,
        }
    }

    /// JavaScript expression evaluating to an array of all matching elements,
    /// in document order
    #[must_use]
    pub fn to_all_query(&self) -> String {
        match self {
            Self::Css(s) => format!("Array.from(document.querySelectorAll({s:?}))"),
            Self::XPath(s) => format!(
                "(() => {{ const r = document.evaluate({s:?}, document, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null); \
                 const out = []; for (let i = 0; i < r.snapshotLength; i++) {{ out.push(r.snapshotItem(i)); }} return out; }})()"
            ),
        }
    }

    /// JavaScript expression evaluating to the first matching element or `null`
    #[must_use]
    pub fn to_first_query(&self) -> String {
        match self {
            Self::Css(s) => format!("document.querySelector({s:?})"),
            Self::XPath(s) => format!(
                "document.evaluate({s:?}, document, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue"
            ),
        }
    }

    /// JavaScript expression evaluating to the visible text of every match
    #[must_use]
    pub fn to_texts_query(&self) -> String {
        format!(
            "{}.map(el => (el.innerText ?? el.textContent ?? ''))",
            self.to_all_query()
        )
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(s) => write!(f, "css={s}"),
            Self::XPath(s) => write!(f, "xpath={s}"),
        }
    }
}

/// A locator for a header control or a column of cells
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Locator {
    #[serde(with = "serde_yaml_ng::with::singleton_map")]
    selector: Selector,
}

impl Locator {
    /// Create a locator with a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::from_selector(Selector::css(selector))
    }

    /// Create a locator with an XPath selector
    #[must_use]
    pub fn xpath(selector: impl Into<String>) -> Self {
        Self::from_selector(Selector::xpath(selector))
    }

    /// Create a locator from a selector
    #[must_use]
    pub const fn from_selector(selector: Selector) -> Self {
        Self { selector }
    }

    /// Get the selector
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.selector.fmt(f)
    }
}

impl From<Selector> for Locator {
    fn from(selector: Selector) -> Self {
        Self::from_selector(selector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod selector_tests {
        use super::*;

        #[test]
        fn test_css_all_query() {
            let sel = Selector::css("td.email");
            assert_eq!(
                sel.to_all_query(),
                r#"Array.from(document.querySelectorAll("td.email"))"#
            );
        }

        #[test]
        fn test_xpath_all_query_uses_snapshot() {
            let sel = Selector::xpath("//tbody/tr/td[@class='dues']");
            let q = sel.to_all_query();
            assert!(q.contains("ORDERED_NODE_SNAPSHOT_TYPE"));
            assert!(q.contains(r#""//tbody/tr/td[@class='dues']""#));
        }

        #[test]
        fn test_first_query() {
            assert_eq!(
                Selector::css("th span.dues").to_first_query(),
                r#"document.querySelector("th span.dues")"#
            );
            assert!(Selector::xpath("//th")
                .to_first_query()
                .contains("FIRST_ORDERED_NODE_TYPE"));
        }

        #[test]
        fn test_texts_query_maps_inner_text() {
            let q = Selector::css("td").to_texts_query();
            assert!(q.ends_with(".map(el => (el.innerText ?? el.textContent ?? ''))"));
        }

        #[test]
        fn test_selector_escapes_quotes() {
            let q = Selector::css(r#"td[data-col="a"]"#).to_first_query();
            assert_eq!(q, r#"document.querySelector("td[data-col=\"a\"]")"#);
        }

        #[test]
        fn test_display() {
            assert_eq!(Selector::css("td").to_string(), "css=td");
            assert_eq!(Selector::xpath("//td").to_string(), "xpath=//td");
        }
    }

    mod locator_tests {
        use super::*;

        #[test]
        fn test_locator_constructors() {
            assert_eq!(Locator::css("td").selector(), &Selector::Css("td".into()));
            assert_eq!(
                Locator::xpath("//td").selector(),
                &Selector::XPath("//td".into())
            );
            assert_eq!(Locator::from(Selector::css("a")), Locator::css("a"));
        }

        #[test]
        fn test_locator_yaml_shape() {
            let loc: Locator = serde_yaml_ng::from_str("xpath: \"//th//span[@class='email']\"")
                .unwrap();
            assert_eq!(loc, Locator::xpath("//th//span[@class='email']"));
            let loc: Locator = serde_yaml_ng::from_str("css: td.email").unwrap();
            assert_eq!(loc.to_string(), "css=td.email");
        }

        #[test]
        fn test_locator_yaml_writes_single_key_map() {
            let yaml = serde_yaml_ng::to_string(&Locator::css("th.dues")).unwrap();
            assert_eq!(yaml.trim(), "css: th.dues");
            let back: Locator = serde_yaml_ng::from_str(&yaml).unwrap();
            assert_eq!(back, Locator::css("th.dues"));
        }

        #[test]
        fn test_locator_yaml_rejects_unknown_kind() {
            assert!(serde_yaml_ng::from_str::<Locator>("id: dues").is_err());
        }
    }
}
