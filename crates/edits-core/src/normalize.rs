//! Normalization of raw YAML documents into [`Description`] entities.
//!
//! Raw documents are loosely typed. [`RawFields`] holds one parsed document and is
//! consumed only by [`normalize`], which applies the legacy field renames, checks the
//! required fields and builds a strictly typed [`Description`].

use std::fmt;

use serde_yaml::{Mapping, Value};

use crate::error::{AppError, YamlLocation};
use crate::models::{Description, Descriptor, Facets};

/// Legacy field names and their canonical replacements.
pub const LEGACY_ALIASES: [(&str, &str); 3] = [
    ("measures", "measure"),
    ("dimensions", "dimension"),
    ("data", "quantity"),
];

/// Fields every description must carry after renaming.
pub const REQUIRED_FIELDS: [&str; 5] = [
    "title",
    "description",
    "measure",
    "dimension",
    "quantity",
];

/// Top-level fields of one YAML document, before validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFields(Mapping);

impl RawFields {
    /// Parses one YAML document. `origin` names the document in errors.
    ///
    /// # Errors
    ///
    /// Returns `AppError::MalformedYaml` on a syntax error, with the line and column
    /// when the parser reports them, or when the top level is not a mapping.
    pub fn from_yaml(bytes: &[u8], origin: &str) -> Result<Self, AppError> {
        let value: Value = serde_yaml::from_slice(bytes).map_err(|e| AppError::MalformedYaml {
            origin: origin.to_string(),
            message: e.to_string(),
            location: e.location().map(|loc| YamlLocation {
                line: loc.line(),
                column: loc.column(),
            }),
        })?;

        match value {
            Value::Mapping(mapping) => Ok(Self(mapping)),
            _ => Err(AppError::MalformedYaml {
                origin: origin.to_string(),
                message: "top level is not a mapping".to_string(),
                location: None,
            }),
        }
    }

    fn take(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }
}

/// Non-fatal observation made while normalizing a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoticeKind {
    /// A legacy key was renamed to its canonical name.
    Renamed { from: &'static str, to: &'static str },
    /// Both a legacy key and its canonical key were present; the legacy one was dropped.
    LegacyIgnored { from: &'static str, to: &'static str },
    /// The document has no classifiers.
    MissingClassifiers,
}

/// A notice attached to the document it concerns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Id of the document, as given to [`normalize`].
    pub document: String,
    pub kind: NoticeKind,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            NoticeKind::Renamed { from, to } => {
                write!(f, "{}: renamed '{}' to '{}'", self.document, from, to)
            }
            NoticeKind::LegacyIgnored { from, to } => write!(
                f,
                "{}: ignored legacy '{}' because '{}' is present",
                self.document, from, to
            ),
            NoticeKind::MissingClassifiers => write!(f, "{}: no classifiers", self.document),
        }
    }
}

/// A description together with the notices raised while building it.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub description: Description,
    pub notices: Vec<Notice>,
}

/// Builds a [`Description`] from the fields of one document.
///
/// `id` always comes from the caller. `provider_id` comes from the caller when given,
/// otherwise from the document's own `provider_id` field if it holds a string.
///
/// # Errors
///
/// Returns `AppError::SchemaError` naming the field and `id` if a required field is
/// missing after the legacy renames, or if a field has the wrong structure. A facet
/// written as `null` is an empty mapping, while a `null` title or description is
/// missing. No description is produced on error.
///
/// # Examples
///
/// ```
/// use edits_core::normalize::{normalize, RawFields};
///
/// let raw = RawFields::from_yaml(
///     b"title: T\ndescription: D\nmeasures: {GDP: GDP}\ndimensions: {}\ndata: {}\n",
///     "example.yaml",
/// )
/// .unwrap();
///
/// let normalized = normalize(raw, "example", Some("acme")).unwrap();
/// assert!(normalized.description.measure.contains_key("GDP"));
/// assert_eq!(normalized.description.full_id(), "acme/example");
/// ```
pub fn normalize(
    mut raw: RawFields,
    id: &str,
    provider_id: Option<&str>,
) -> Result<Normalized, AppError> {
    let mut notices = Vec::new();
    let mut notice = |kind| {
        notices.push(Notice {
            document: id.to_string(),
            kind,
        })
    };

    for (from, to) in LEGACY_ALIASES {
        if let Some(value) = raw.take(from) {
            if raw.0.contains_key(to) {
                notice(NoticeKind::LegacyIgnored { from, to });
            } else {
                raw.0.insert(Value::from(to), value);
                notice(NoticeKind::Renamed { from, to });
            }
        }
    }

    for field in REQUIRED_FIELDS {
        if !raw.0.contains_key(field) {
            return Err(AppError::missing_field(id, field));
        }
    }

    let title = required_text(&mut raw, id, "title")?;
    let description = required_text(&mut raw, id, "description")?;
    let measure = facets(&mut raw, id, "measure")?;
    let dimension = facets(&mut raw, id, "dimension")?;
    let quantity = facets(&mut raw, id, "quantity")?;

    let classifiers = classifiers(raw.take("classifiers"), id)?;
    if classifiers.is_empty() {
        notice(NoticeKind::MissingClassifiers);
    }

    let provider_id = match provider_id {
        Some(p) => Some(p.to_string()),
        None => raw
            .take("provider_id")
            .and_then(|v| v.as_str().map(str::to_string)),
    };

    Ok(Normalized {
        description: Description {
            id: id.to_string(),
            provider_id,
            title,
            description,
            classifiers,
            measure,
            dimension,
            quantity,
        },
        notices,
    })
}

/// Parses and normalizes one document.
pub fn load_document(
    bytes: &[u8],
    origin: &str,
    id: &str,
    provider_id: Option<&str>,
) -> Result<Normalized, AppError> {
    let raw = RawFields::from_yaml(bytes, origin)?;
    normalize(raw, id, provider_id)
}

/// Renders a scalar as text; `None` for null, sequences and mappings.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

fn required_text(raw: &mut RawFields, id: &str, field: &str) -> Result<String, AppError> {
    match raw.take(field) {
        None | Some(Value::Null) => Err(AppError::missing_field(id, field)),
        Some(value) => {
            scalar_text(&value).ok_or_else(|| AppError::invalid_field(id, field, "must be text"))
        }
    }
}

/// Reads one facet mapping.
///
/// Unlike `title` and `description`, a facet present as `null` counts as an empty
/// mapping: a provider with no dimensions writes `dimension:` with nothing after it.
/// Only a missing key is an error. Codes that render to the same text are rejected.
fn facets(raw: &mut RawFields, id: &str, field: &str) -> Result<Facets, AppError> {
    let mapping = match raw.take(field) {
        Some(Value::Mapping(mapping)) => mapping,
        Some(Value::Null) => return Ok(Facets::new()),
        None => return Err(AppError::missing_field(id, field)),
        Some(_) => return Err(AppError::invalid_field(id, field, "must be a mapping")),
    };

    let mut result = Facets::new();
    for (code, value) in mapping {
        let code = scalar_text(&code).ok_or_else(|| {
            AppError::invalid_field(id, field, format!("has a non-scalar code: {:?}", code))
        })?;
        if result.contains_key(&code) {
            return Err(AppError::invalid_field(
                id,
                field,
                format!("has duplicate code '{}'", code),
            ));
        }
        result.insert(code, descriptor(value));
    }
    Ok(result)
}

fn descriptor(value: Value) -> Descriptor {
    match value {
        Value::Mapping(mapping) => {
            let mut descriptor = Descriptor::default();
            for (key, value) in mapping {
                let Some(key) = scalar_text(&key) else {
                    continue;
                };
                if key == "name" {
                    if let Some(name) = scalar_text(&value) {
                        descriptor.name = Some(name);
                        continue;
                    }
                }
                descriptor.attributes.insert(key, value);
            }
            descriptor
        }
        Value::Null => Descriptor::default(),
        other => match scalar_text(&other) {
            Some(name) => Descriptor {
                name: Some(name),
                ..Descriptor::default()
            },
            None => {
                let mut descriptor = Descriptor::default();
                descriptor.attributes.insert("value".to_string(), other);
                descriptor
            }
        },
    }
}

fn classifiers(value: Option<Value>, id: &str) -> Result<Vec<String>, AppError> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Sequence(items)) => items
            .iter()
            .map(|item| {
                scalar_text(item).ok_or_else(|| {
                    AppError::invalid_field(id, "classifiers", "must be a list of strings")
                })
            })
            .collect(),
        Some(other) => scalar_text(&other)
            .map(|single| vec![single])
            .ok_or_else(|| AppError::invalid_field(id, "classifiers", "must be a list of strings")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANONICAL: &str = r#"
title: Passenger transport
description: Passenger-km by mode
classifiers: [transport, passenger]
measure:
  PKM: {name: Passenger-km, unit: Gp km / a}
dimension:
  n: Node
  t: {name: Technology}
quantity:
  pkm_by_mode: {dims: [n, t]}
"#;

    const LEGACY: &str = r#"
title: Passenger transport
description: Passenger-km by mode
classifiers: [transport, passenger]
measures:
  PKM: {name: Passenger-km, unit: Gp km / a}
dimensions:
  n: Node
  t: {name: Technology}
data:
  pkm_by_mode: {dims: [n, t]}
"#;

    fn load(yaml: &str) -> Result<Normalized, AppError> {
        load_document(yaml.as_bytes(), "test.yaml", "doc", Some("acme"))
    }

    #[test]
    fn test_canonical_document() {
        let normalized = load(CANONICAL).unwrap();
        let desc = normalized.description;
        assert_eq!(desc.full_id(), "acme/doc");
        assert_eq!(desc.title, "Passenger transport");
        assert_eq!(desc.classifiers, ["transport", "passenger"]);
        assert_eq!(desc.measure["PKM"].name.as_deref(), Some("Passenger-km"));
        assert_eq!(
            desc.measure["PKM"].attributes["unit"],
            Value::from("Gp km / a")
        );
        assert_eq!(desc.dimension["n"].name.as_deref(), Some("Node"));
        assert!(normalized.notices.is_empty());
    }

    #[test]
    fn test_legacy_aliases_match_canonical() {
        let canonical = load(CANONICAL).unwrap().description;
        let legacy = load(LEGACY).unwrap();

        assert_eq!(legacy.description.measure, canonical.measure);
        assert_eq!(legacy.description.dimension, canonical.dimension);
        assert_eq!(legacy.description.quantity, canonical.quantity);
        assert_eq!(legacy.description, canonical);
    }

    #[test]
    fn test_renames_are_reported() {
        let notices = load(LEGACY).unwrap().notices;
        let kinds: Vec<_> = notices.into_iter().map(|n| n.kind).collect();
        assert_eq!(
            kinds,
            [
                NoticeKind::Renamed { from: "measures", to: "measure" },
                NoticeKind::Renamed { from: "dimensions", to: "dimension" },
                NoticeKind::Renamed { from: "data", to: "quantity" },
            ]
        );
    }

    #[test]
    fn test_canonical_key_wins_over_legacy() {
        let yaml = format!("{}measures:\n  OTHER: x\n", CANONICAL);
        let normalized = load(&yaml).unwrap();
        assert!(!normalized.description.measure.contains_key("OTHER"));
        assert_eq!(
            normalized.notices[0].kind,
            NoticeKind::LegacyIgnored { from: "measures", to: "measure" }
        );
    }

    #[test]
    fn test_renames_are_case_sensitive() {
        let yaml = CANONICAL.replace("measure:", "Measures:");
        match load(&yaml) {
            Err(AppError::SchemaError { field, .. }) => assert_eq!(field, "measure"),
            other => panic!("Expected SchemaError, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_title() {
        let yaml = CANONICAL.replace("title: Passenger transport\n", "");
        match load(&yaml) {
            Err(AppError::SchemaError { id, field, .. }) => {
                assert_eq!(id, "doc");
                assert_eq!(field, "title");
            }
            other => panic!("Expected SchemaError, got {:?}", other),
        }
    }

    #[test]
    fn test_each_required_field() {
        for field in ["description", "measure", "dimension", "quantity"] {
            let mut raw = RawFields::from_yaml(CANONICAL.as_bytes(), "test.yaml").unwrap();
            raw.take(field);
            match normalize(raw, "doc", None) {
                Err(AppError::SchemaError { field: f, .. }) => assert_eq!(f, field),
                other => panic!("Expected SchemaError for {field}, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_facet_must_be_mapping() {
        let yaml = CANONICAL.replace("quantity:\n  pkm_by_mode: {dims: [n, t]}", "quantity: [a, b]");
        assert!(matches!(
            load(&yaml),
            Err(AppError::SchemaError { field, .. }) if field == "quantity"
        ));
    }

    #[test]
    fn test_missing_classifiers_is_a_notice() {
        let yaml = CANONICAL.replace("classifiers: [transport, passenger]\n", "");
        let normalized = load(&yaml).unwrap();
        assert!(normalized.description.classifiers.is_empty());
        assert_eq!(normalized.notices[0].kind, NoticeKind::MissingClassifiers);
    }

    #[test]
    fn test_numeric_codes_and_scalars() {
        let yaml = "title: 2020\ndescription: D\nmeasure: {1: x}\ndimension: ~\nquantity: {}\n";
        let desc = load(yaml).unwrap().description;
        assert_eq!(desc.title, "2020");
        assert!(desc.measure.contains_key("1"));
        assert!(desc.dimension.is_empty());
    }

    #[test]
    fn test_colliding_codes_are_rejected() {
        let yaml = "title: T\ndescription: D\nmeasure: {1: int one, '1': str one}\n\
                    dimension: {}\nquantity: {}\n";
        match load(yaml) {
            Err(AppError::SchemaError { field, reason, .. }) => {
                assert_eq!(field, "measure");
                assert!(reason.contains("duplicate code '1'"), "{reason}");
            }
            other => panic!("Expected SchemaError, got {:?}", other),
        }
    }

    #[test]
    fn test_null_title_is_missing_but_null_facet_is_empty() {
        let yaml = "title: ~\ndescription: D\nmeasure: {}\ndimension: {}\nquantity: {}\n";
        assert!(matches!(
            load(yaml),
            Err(AppError::SchemaError { field, .. }) if field == "title"
        ));

        let yaml = "title: T\ndescription: D\nmeasure: ~\ndimension: {}\nquantity: {}\n";
        assert!(load(yaml).unwrap().description.measure.is_empty());
    }

    #[test]
    fn test_codes_keep_document_order() {
        let yaml = "title: T\ndescription: D\nmeasure: {}\n\
                    dimension: {zz_foo: Z, aa_foo: A, mm: M}\nquantity: {}\n";
        let desc = load(yaml).unwrap().description;
        let codes: Vec<_> = desc.dimension.keys().map(String::as_str).collect();
        assert_eq!(codes, ["zz_foo", "aa_foo", "mm"]);
    }

    #[test]
    fn test_provider_id_from_document() {
        let yaml = format!("{}provider_id: from-doc\n", CANONICAL);
        let raw = RawFields::from_yaml(yaml.as_bytes(), "t.yaml").unwrap();
        let desc = normalize(raw.clone(), "doc", None).unwrap().description;
        assert_eq!(desc.full_id(), "from-doc/doc");

        let desc = normalize(raw, "doc", Some("caller")).unwrap().description;
        assert_eq!(desc.full_id(), "caller/doc");
    }

    #[test]
    fn test_syntax_error_has_location() {
        match RawFields::from_yaml(b"title: x\nmeasure: [a, b\ndimension: {}\n", "bad.yaml") {
            Err(AppError::MalformedYaml {
                origin, location, ..
            }) => {
                assert_eq!(origin, "bad.yaml");
                assert!(location.is_some());
            }
            other => panic!("Expected MalformedYaml, got {:?}", other),
        }
    }

    #[test]
    fn test_top_level_must_be_mapping() {
        assert!(matches!(
            RawFields::from_yaml(b"- a\n- b\n", "list.yaml"),
            Err(AppError::MalformedYaml { location: None, .. })
        ));
    }
}
