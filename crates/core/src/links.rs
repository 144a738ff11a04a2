//! `Link` response header parsing

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

static LINK_PATTERN: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r#"<([^>]*)>\s*;\s*rel="([^"]+)""#).expect("link pattern is valid")
});

/// Pagination links keyed by `rel`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Links(HashMap<String, String>);

impl Links {
    /// Parse a header such as
    /// `<https://x/api/v1/a?page=2>; rel="current", <https://x/api/v1/a?page=3>; rel="next"`.
    /// Entries with an empty target or no `rel` are skipped.
    pub fn parse(header: &str) -> Self {
        let links = LINK_PATTERN
            .captures_iter(header)
            .filter(|caps| !caps[1].trim().is_empty())
            .map(|caps| (caps[2].to_string(), caps[1].trim().to_string()))
            .collect();
        Self(links)
    }

    pub fn get(&self, rel: &str) -> Option<&str> {
        self.0.get(rel).map(String::as_str)
    }

    pub fn next(&self) -> Option<&str> {
        self.get("next")
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_next_among_noise() {
        let prev = "https://canvas.test/api/v1/date";
        let curr = "https://canvas.test/api/v1/date?page=2";
        let next = "https://canvas.test/api/v1/date?page=3";
        let header = format!(
            r#"<{curr}>; rel="current",<>;, <{prev}>; rel="prev", <{next}>; rel="next"; count=1"#
        );

        let links = Links::parse(&header);
        assert_eq!(links.next(), Some(next));
        assert_eq!(links.get("prev"), Some(prev));
        assert_eq!(links.get("current"), Some(curr));
    }

    #[test]
    fn no_next_when_absent() {
        let links = Links::parse(r#"<https://canvas.test/api/v1/date>; rel="current""#);
        assert_eq!(links.next(), None);
        assert!(Links::parse("").is_empty());
    }
}
