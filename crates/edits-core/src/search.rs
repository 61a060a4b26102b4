//! Keyword search over the dimensions or measures of descriptions.

use std::fmt;
use std::str::FromStr;

use crate::error::AppError;
use crate::models::{Description, Descriptor, Facets};

/// Which facet of a description a query looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Dimension,
    Measure,
}

impl QueryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::Dimension => "dimension",
            QueryKind::Measure => "measure",
        }
    }

    fn facets<'a>(&self, description: &'a Description) -> &'a Facets {
        match self {
            QueryKind::Dimension => &description.dimension,
            QueryKind::Measure => &description.measure,
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dimension" => Ok(QueryKind::Dimension),
            "measure" => Ok(QueryKind::Measure),
            other => Err(AppError::UnsupportedQuery(format!("{:?}", other))),
        }
    }
}

/// A parsed `KIND=KEY` expression.
///
/// ```
/// use edits_core::search::{Query, QueryKind};
///
/// let query: Query = "dimension=foo".parse().unwrap();
/// assert_eq!(query.kind, QueryKind::Dimension);
/// assert_eq!(query.key, "foo");
///
/// assert!("region=eu".parse::<Query>().is_err());
/// assert!("measure".parse::<Query>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub kind: QueryKind,
    pub key: String,
}

impl FromStr for Query {
    type Err = AppError;

    fn from_str(expression: &str) -> Result<Self, Self::Err> {
        let (kind, key) = expression.split_once('=').ok_or_else(|| {
            AppError::UnsupportedQuery(format!("{:?} (expected KIND=KEY)", expression))
        })?;
        Ok(Query {
            kind: kind.parse()?,
            key: key.to_string(),
        })
    }
}

/// One matching code.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchHit<'a> {
    pub description: &'a Description,
    pub code: &'a str,
    pub descriptor: &'a Descriptor,
}

/// Returns every code of the `kind` facet that contains `key`.
///
/// Matching is a case-sensitive substring test, so `foo` matches `foo`, `food`
/// and `other_foo`. Hits come in collection order, then in the order codes appear
/// in each document. No hits is not an error.
pub fn search<'a>(
    descriptions: &'a [Description],
    kind: QueryKind,
    key: &str,
) -> Vec<SearchHit<'a>> {
    descriptions
        .iter()
        .flat_map(|description| {
            kind.facets(description)
                .iter()
                .filter(move |(code, _)| code.contains(key))
                .map(move |(code, descriptor)| SearchHit {
                    description,
                    code,
                    descriptor,
                })
        })
        .collect()
}

/// [`search`] with the kind given by name.
///
/// # Errors
///
/// Returns `AppError::UnsupportedQuery` unless `kind` is `dimension` or `measure`.
pub fn search_by_name<'a>(
    descriptions: &'a [Description],
    kind: &str,
    key: &str,
) -> Result<Vec<SearchHit<'a>>, AppError> {
    Ok(search(descriptions, kind.parse()?, key))
}

/// Runs a parsed [`Query`].
pub fn run_query<'a>(descriptions: &'a [Description], query: &Query) -> Vec<SearchHit<'a>> {
    search(descriptions, query.kind, &query.key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facets(codes: &[&str]) -> Facets {
        codes
            .iter()
            .map(|c| (c.to_string(), Descriptor::default()))
            .collect()
    }

    fn description(id: &str, dimensions: &[&str], measures: &[&str]) -> Description {
        Description {
            id: id.to_string(),
            provider_id: Some("acme".to_string()),
            title: id.to_string(),
            description: String::new(),
            classifiers: vec![],
            measure: facets(measures),
            dimension: facets(dimensions),
            quantity: Facets::new(),
        }
    }

    fn collection() -> Vec<Description> {
        vec![
            description("one", &["foo", "bar"], &["GDP"]),
            description("two", &["other_foo", "food", "Foo"], &["foo_price"]),
            description("three", &["zz_foo", "aa_foo"], &[]),
        ]
    }

    #[test]
    fn test_substring_matches() {
        let descriptions = collection();
        let hits = search(&descriptions, QueryKind::Dimension, "foo");

        let found: Vec<_> = hits
            .iter()
            .map(|h| (h.description.id.as_str(), h.code))
            .collect();
        assert_eq!(
            found,
            [
                ("one", "foo"),
                ("two", "other_foo"),
                ("two", "food"),
                ("three", "zz_foo"),
                ("three", "aa_foo"),
            ]
        );
    }

    #[test]
    fn test_measure_search() {
        let descriptions = collection();
        let hits = search(&descriptions, QueryKind::Measure, "foo");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].code, "foo_price");
    }

    #[test]
    fn test_no_matches_is_empty() {
        let descriptions = collection();
        assert!(search(&descriptions, QueryKind::Dimension, "baz").is_empty());
    }

    #[test]
    fn test_search_by_name_rejects_unknown_kind() {
        let descriptions = collection();
        let result = search_by_name(&descriptions, "quantity", "x");
        assert!(matches!(result, Err(AppError::UnsupportedQuery(_))));
        assert_eq!(
            search_by_name(&descriptions, "dimension", "bar").unwrap().len(),
            1
        );
    }

    #[test]
    fn test_query_key_may_contain_equals() {
        let query: Query = "measure=a=b".parse().unwrap();
        assert_eq!(query.key, "a=b");
    }

    #[test]
    fn test_run_query() {
        let descriptions = collection();
        let query: Query = "dimension=bar".parse().unwrap();
        let hits = run_query(&descriptions, &query);
        assert_eq!(hits[0].description.full_id(), "acme/one");
    }
}
