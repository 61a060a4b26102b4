//! Domain models: providers and the data descriptions they publish.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;
use serde_yaml::Value;

/// Contact details of a provider.
///
/// Only the presence of a contact is required; name and email are not validated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Contact {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl fmt::Display for Contact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.name.as_deref().unwrap_or("(no name)");
        match &self.email {
            Some(email) => write!(f, "{} <{}>", name, email),
            None => f.write_str(name),
        }
    }
}

/// An organization publishing one or more metadata files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Provider {
    pub id: String,
    pub contact: Contact,
    /// URLs of `.yaml` documents or `.zip` archives, in declared order.
    pub files: Vec<String>,
}

impl Provider {
    /// Prefix used for ids of descriptions found inside this provider's archives:
    /// the provider id lowercased, with spaces replaced by hyphens.
    ///
    /// ```
    /// use edits_core::models::{Contact, Provider};
    ///
    /// let provider = Provider {
    ///     id: "Energy Lab".to_string(),
    ///     contact: Contact::default(),
    ///     files: vec![],
    /// };
    /// assert_eq!(provider.slug(), "energy-lab");
    /// ```
    pub fn slug(&self) -> String {
        self.id.to_lowercase().replace(' ', "-")
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Provider: {}", self.id)?;
        writeln!(f, "Contact: {}", self.contact)?;
        writeln!(f, "\n{} file(s):", self.files.len())?;
        for file in &self.files {
            writeln!(f, "{}", file)?;
        }
        Ok(())
    }
}

/// Descriptor of a single measure, dimension or quantity code.
///
/// `name` is taken from the `name:` key when the YAML value is a mapping, or from
/// the value itself when it is a plain string. Every other key is kept verbatim, in
/// document order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Descriptor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub attributes: IndexMap<String, Value>,
}

/// Mapping from a code to its descriptor, iterated in document order.
pub type Facets = IndexMap<String, Descriptor>;

/// A single dataset's metadata record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Description {
    /// Id unique within the provider, derived from the source file name.
    pub id: String,
    pub provider_id: Option<String>,
    pub title: String,
    pub description: String,
    pub classifiers: Vec<String>,
    pub measure: Facets,
    pub dimension: Facets,
    pub quantity: Facets,
}

impl Description {
    /// Globally unique key: `provider_id/id`, or just `id` without a provider.
    pub fn full_id(&self) -> String {
        match &self.provider_id {
            Some(provider) => format!("{}/{}", provider, self.id),
            None => self.id.clone(),
        }
    }
}

impl fmt::Display for Description {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Description {}: {}>", self.full_id(), self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn description(provider_id: Option<&str>) -> Description {
        Description {
            id: "energy".to_string(),
            provider_id: provider_id.map(str::to_string),
            title: "Energy use".to_string(),
            description: "Final energy".to_string(),
            classifiers: vec![],
            measure: Facets::new(),
            dimension: Facets::new(),
            quantity: Facets::new(),
        }
    }

    #[test]
    fn test_full_id_with_provider() {
        assert_eq!(description(Some("acme")).full_id(), "acme/energy");
    }

    #[test]
    fn test_full_id_without_provider() {
        assert_eq!(description(None).full_id(), "energy");
    }

    #[test]
    fn test_description_display() {
        assert_eq!(
            description(Some("acme")).to_string(),
            "<Description acme/energy: Energy use>"
        );
    }

    #[test]
    fn test_contact_display() {
        let contact = Contact {
            name: Some("Jo".to_string()),
            email: Some("jo@example.org".to_string()),
        };
        assert_eq!(contact.to_string(), "Jo <jo@example.org>");
    }

    #[test]
    fn test_provider_slug() {
        let provider = Provider {
            id: "My Org".to_string(),
            contact: Contact::default(),
            files: vec![],
        };
        assert_eq!(provider.slug(), "my-org");
    }
}
