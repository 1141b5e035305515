// Structured document codec - template text <-> (metadata, body)

pub mod interactive;

pub use interactive::{Field, FieldType, InteractiveSpec, SelectOption};

use serde_yaml::{Mapping, Value};

/// Ordered template metadata: a YAML mapping of scalars, sequences, and
/// nested mappings. Unrecognized keys pass through parse/serialize untouched;
/// the keys the rest of the system understands get typed accessors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata(Mapping);

impl Metadata {
    pub fn new() -> Self {
        Self(Mapping::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(Value::String(key.to_string()))
    }

    pub fn set(&mut self, key: &str, value: Value) {
        self.0.insert(Value::String(key.to_string()), value);
    }

    /// Display title, when the header declares one.
    pub fn title(&self) -> Option<&str> {
        self.get("title").and_then(Value::as_str)
    }

    /// Locked templates are read-only in the presentation layer.
    pub fn locked(&self) -> bool {
        self.get("locked").and_then(Value::as_bool).unwrap_or(false)
    }

    /// The interactive form specification, when present and well-formed.
    /// A malformed `interactive` object is treated the same as an absent one.
    pub fn interactive(&self) -> Option<InteractiveSpec> {
        let value = self.get("interactive")?.clone();
        serde_yaml::from_value(value).ok()
    }

    pub fn as_mapping(&self) -> &Mapping {
        &self.0
    }
}

impl From<Mapping> for Metadata {
    fn from(mapping: Mapping) -> Self {
        Self(mapping)
    }
}

/// A template's raw text split into its two halves.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructuredDocument {
    pub metadata: Metadata,
    pub body: String,
}

impl StructuredDocument {
    pub fn new(metadata: Metadata, body: impl Into<String>) -> Self {
        Self {
            metadata,
            body: body.into(),
        }
    }

    /// Split raw template text into (metadata, body).
    ///
    /// Fail-soft by contract: text without a frontmatter fence, or with a
    /// header that is not valid YAML, comes back as an empty metadata mapping
    /// with the entire input as the body. A template must always display
    /// something, so this never returns an error.
    pub fn parse(text: &str) -> Self {
        let Some(rest) = text.strip_prefix("---\n") else {
            return Self::body_only(text);
        };

        // Empty header: the closing fence immediately follows the opening one.
        if let Some(body) = rest.strip_prefix("---\n") {
            return Self::body_only_with(Metadata::new(), body);
        }
        if rest == "---" {
            return Self::body_only_with(Metadata::new(), "");
        }

        let (yaml, body) = if let Some(pos) = rest.find("\n---\n") {
            (&rest[..pos + 1], &rest[pos + 5..])
        } else if let Some(yaml) = rest.strip_suffix("\n---") {
            (&rest[..yaml.len() + 1], "")
        } else {
            // No closing fence
            return Self::body_only(text);
        };

        match serde_yaml::from_str::<Value>(yaml) {
            Ok(Value::Mapping(mapping)) => Self::body_only_with(mapping.into(), body),
            Ok(Value::Null) => Self::body_only_with(Metadata::new(), body),
            // Header parsed to a scalar/sequence, or did not parse at all
            _ => Self::body_only(text),
        }
    }

    /// Serialize back to raw template text.
    ///
    /// `parse(serialize(body, metadata))` reproduces the pair for metadata
    /// built from scalars, sequences, and nested mappings. Formatting of the
    /// header is whatever serde_yaml emits; only the semantic round-trip is
    /// guaranteed.
    pub fn to_text(&self) -> String {
        if self.metadata.is_empty() && !self.body.starts_with("---") {
            return self.body.clone();
        }

        let yaml = if self.metadata.is_empty() {
            String::new()
        } else {
            // A plain mapping of YAML values always serializes.
            serde_yaml::to_string(self.metadata.as_mapping())
                .unwrap_or_default()
        };

        format!("---\n{yaml}---\n{body}", body = self.body)
    }

    /// The minimal document a freshly created template starts with.
    pub fn minimal(title: &str) -> Self {
        let mut metadata = Metadata::new();
        metadata.set("title", Value::String(title.to_string()));
        Self::new(metadata, "Your new template content goes here.")
    }

    fn body_only(text: &str) -> Self {
        Self::body_only_with(Metadata::new(), text)
    }

    fn body_only_with(metadata: Metadata, body: &str) -> Self {
        Self {
            metadata,
            body: body.to_string(),
        }
    }
}
