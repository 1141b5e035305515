// Core value types: Template, Collection, selection state, settings, and the
// Root State that persists as one JSON value. Serde names stay camelCase so
// the persisted shape matches the original editor's stored state.

use crate::document::{InteractiveSpec, StructuredDocument};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Filename convention for ordered templates: `01-some-name.md`.
/// Anything that doesn't match carries no derivable order and sorts last.
fn filename_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^(\d+)[-_ ]?(.*)\.md$").unwrap())
}

/// One reusable document. `content` is the single source of truth; `title`,
/// `order`, and `interactive` are caches recomputed from it and the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// Ordering key; `None` sorts last (the original encodes this as
    /// `Infinity`, which serializes to JSON `null`).
    #[serde(default)]
    pub order: Option<u32>,
    #[serde(default)]
    pub content: String,
    #[serde(
        default,
        rename = "interactiveConfig",
        skip_serializing_if = "Option::is_none"
    )]
    pub interactive: Option<InteractiveSpec>,
}

impl Template {
    /// Build a template from an id and raw content, deriving the cached
    /// fields: order and fallback title from the filename-style id, display
    /// title from metadata, interactive config from the header.
    pub fn from_content(id: &str, content: &str) -> Self {
        let (order, filename_title) = match filename_pattern().captures(id) {
            Some(caps) => {
                let order = caps[1].parse::<u32>().ok();
                let title = title_case(&caps[2].replace('-', " "));
                (order, title)
            }
            None => (None, id.trim_end_matches(".md").to_string()),
        };

        let doc = StructuredDocument::parse(content);
        let interactive = doc.metadata.interactive();
        let title = doc
            .metadata
            .title()
            .map(str::to_string)
            .or_else(|| interactive.as_ref().map(|spec| spec.title.clone()))
            .unwrap_or(filename_title);

        Self {
            id: id.to_string(),
            title,
            order,
            content: content.to_string(),
            interactive,
        }
    }

    /// Key used everywhere templates get sorted: ascending order, unordered
    /// templates last, ties resolved by the stable sort's insertion order.
    pub fn order_key(&self) -> u32 {
        self.order.unwrap_or(u32::MAX)
    }

    /// Whether the header marks this template read-only.
    pub fn is_locked(&self) -> bool {
        StructuredDocument::parse(&self.content).metadata.locked()
    }
}

/// A named group of templates with unique template ids. May be empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub templates: Vec<Template>,
}

/// Fallback ambient context when a collection has no order-1 template.
pub const DEFAULT_SYSTEM_CONTEXT: &str = "You are a helpful AI assistant.";

impl Collection {
    /// A fresh empty collection with a timestamp-derived id.
    pub fn new(name: &str) -> Self {
        Self {
            id: format!("collection-{}", chrono::Utc::now().timestamp_millis()),
            name: name.to_string(),
            templates: Vec::new(),
        }
    }

    /// Stable ascending sort by order; unordered templates sink to the end.
    pub fn sort_templates(&mut self) {
        self.templates.sort_by_key(Template::order_key);
    }

    /// The id of the first template by order, if any.
    pub fn first_template_id(&self) -> Option<String> {
        self.templates
            .iter()
            .min_by_key(|t| t.order_key())
            .map(|t| t.id.clone())
    }

    pub fn template(&self, id: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.id == id)
    }

    /// Body of the conventional order-1 system/context template; other
    /// templates read this as ambient context during generation.
    pub fn system_context(&self) -> String {
        self.templates
            .iter()
            .find(|t| t.order == Some(1))
            .map(|t| StructuredDocument::parse(&t.content).body)
            .unwrap_or_else(|| DEFAULT_SYSTEM_CONTEXT.to_string())
    }

    /// Next order for a created template: 1 + max numeric order, ignoring
    /// unordered templates; 1 when the collection is empty.
    pub fn next_order(&self) -> u32 {
        self.templates
            .iter()
            .filter_map(|t| t.order)
            .max()
            .unwrap_or(0)
            + 1
    }
}

/// Collections plus the active-selection pointers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CollectionsState {
    pub collections: Vec<Collection>,
    pub active_collection_id: Option<String>,
    pub active_template_id: Option<String>,
}

impl CollectionsState {
    pub fn collection(&self, id: &str) -> Option<&Collection> {
        self.collections.iter().find(|c| c.id == id)
    }

    pub fn active_collection(&self) -> Option<&Collection> {
        self.active_collection_id
            .as_deref()
            .and_then(|id| self.collection(id))
    }

    pub fn active_template(&self) -> Option<&Template> {
        let collection = self.active_collection()?;
        collection.template(self.active_template_id.as_deref()?)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Slate,
    Sky,
    Rose,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub theme: Theme,
}

/// Partial settings payload for UpdateSettings; absent fields keep their
/// current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsPatch {
    pub theme: Option<Theme>,
}

/// The unit of persistence: everything the editor stores, as one value.
/// Missing fields in stored JSON fall back to defaults; there is no
/// migration mechanism.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RootState {
    pub collections_state: CollectionsState,
    pub settings: Settings,
    pub editor_is_dirty: bool,
}

/// Uppercase the first letter of every word, as the original editor does for
/// filename-derived titles and prompt section labels.
pub(crate) fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut boundary = true;
    for c in s.chars() {
        if boundary && c.is_alphanumeric() {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        boundary = !c.is_alphanumeric();
    }
    out
}
