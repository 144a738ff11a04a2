//! Query items attached to a request
//!
//! Each item renders to zero or more `(name, value)` pairs. A `None` value
//! means a key-only item (`?query`).

/// One logical query parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryItem {
    /// Key without a value
    Name(String),
    Value(String, String),
    /// `name[]=a&name[]=b`
    Array(String, Vec<String>),
    /// Shorthand for `Array("include", ..)`
    Include(Vec<String>),
    /// `per_page`, omitted when `None`
    PerPage(Option<u32>),
    /// Rendered as `1`/`0`
    Bool(String, bool),
    OptionalValue(String, Option<String>),
    OptionalBool(String, Option<bool>),
}

/// Rendered query pair
pub type QueryPair = (String, Option<String>);

impl QueryItem {
    pub fn value(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Value(name.into(), value.into())
    }

    pub fn include<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Include(values.into_iter().map(Into::into).collect())
    }

    /// Plain pairs; the URL layer applies form encoding.
    pub fn to_pairs(&self) -> Vec<QueryPair> {
        match self {
            Self::Name(name) => vec![(name.clone(), None)],
            Self::Value(name, value) => vec![(name.clone(), Some(value.clone()))],
            Self::OptionalValue(name, value) => {
                value.iter().map(|v| (name.clone(), Some(v.clone()))).collect()
            }
            Self::Array(name, values) => {
                values.iter().map(|v| (format!("{name}[]"), Some(v.clone()))).collect()
            }
            Self::Include(values) => Self::Array("include".to_string(), values.clone()).to_pairs(),
            Self::PerPage(per_page) => {
                per_page.iter().map(|n| ("per_page".to_string(), Some(n.to_string()))).collect()
            }
            Self::Bool(name, value) => vec![(name.clone(), Some(bool_value(*value)))],
            Self::OptionalBool(name, value) => {
                value.iter().map(|v| (name.clone(), Some(bool_value(*v)))).collect()
            }
        }
    }

    /// Pairs with every name and value strictly percent-encoded, `+`
    /// included. For endpoints taking offset timestamps such as
    /// `2024-01-01T12:00:00+01:00`.
    pub fn to_percent_encoded_pairs(&self) -> Vec<QueryPair> {
        self.to_pairs()
            .into_iter()
            .map(|(name, value)| {
                (
                    urlencoding::encode(&name).into_owned(),
                    value.map(|v| urlencoding::encode(&v).into_owned()),
                )
            })
            .collect()
    }
}

fn bool_value(value: bool) -> String {
    if value { "1" } else { "0" }.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(name: &str, value: &str) -> QueryPair {
        (name.to_string(), Some(value.to_string()))
    }

    #[test]
    fn renders_plain_pairs() {
        assert_eq!(QueryItem::Name("param".into()).to_pairs(), vec![("param".to_string(), None)]);
        assert_eq!(QueryItem::value("a", "b").to_pairs(), vec![pair("a", "b")]);
        assert_eq!(
            QueryItem::Array("include".into(), vec!["a".into(), "b".into()]).to_pairs(),
            vec![pair("include[]", "a"), pair("include[]", "b")]
        );
        assert_eq!(
            QueryItem::include(["a", "b"]).to_pairs(),
            vec![pair("include[]", "a"), pair("include[]", "b")]
        );
        assert_eq!(QueryItem::PerPage(Some(10)).to_pairs(), vec![pair("per_page", "10")]);
        assert_eq!(QueryItem::Bool("do_it".into(), true).to_pairs(), vec![pair("do_it", "1")]);
        assert_eq!(QueryItem::Bool("do_it".into(), false).to_pairs(), vec![pair("do_it", "0")]);
        assert_eq!(
            QueryItem::OptionalBool("do_it".into(), Some(false)).to_pairs(),
            vec![pair("do_it", "0")]
        );
    }

    #[test]
    fn optional_items_disappear_when_empty() {
        assert!(QueryItem::OptionalBool("do_it".into(), None).to_pairs().is_empty());
        assert!(QueryItem::OptionalValue("date".into(), None).to_pairs().is_empty());
        assert!(QueryItem::PerPage(None).to_pairs().is_empty());
    }

    #[test]
    fn percent_encodes_brackets_and_offsets() {
        assert_eq!(
            QueryItem::include(["a", "b"]).to_percent_encoded_pairs(),
            vec![pair("include%5B%5D", "a"), pair("include%5B%5D", "b")]
        );
        assert_eq!(
            QueryItem::OptionalValue("date".into(), Some("2024-01-01T12:00:00+01:00".into()))
                .to_percent_encoded_pairs(),
            vec![pair("date", "2024-01-01T12%3A00%3A00%2B01%3A00")]
        );
        assert_eq!(
            QueryItem::PerPage(Some(10)).to_percent_encoded_pairs(),
            vec![pair("per_page", "10")]
        );
    }
}
