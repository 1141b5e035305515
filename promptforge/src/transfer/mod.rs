// Import/export boundary - collections travel as JSON, templates as raw
// markdown. Imported documents are validated before the store ever sees them.

use crate::error::{PromptForgeError, Result};
use crate::model::{Collection, Template};

/// Serialize a collection for sharing.
pub fn export_collection(collection: &Collection) -> Result<String> {
    Ok(serde_json::to_string_pretty(collection)?)
}

/// Download filename for an exported collection.
pub fn collection_file_name(collection: &Collection) -> String {
    format!("{}_collection.json", join_words(&collection.name, "_"))
}

/// A template exports as its raw content, nothing more.
pub fn export_template(template: &Template) -> &str {
    &template.content
}

/// Download filename for an exported template.
pub fn template_file_name(template: &Template) -> String {
    format!("{}.md", join_words(&template.title, "_"))
}

/// Parse and validate externally supplied bytes as a collection.
///
/// Rejections are descriptive: not JSON, or JSON without a `name` and a
/// `templates` array, never reach the store. Templates come back re-sorted
/// by order; a missing collection id is synthesized; derived caches that the
/// source file left out are recomputed from each template's content.
pub fn import_collection(bytes: &[u8]) -> Result<Collection> {
    let value: serde_json::Value = serde_json::from_slice(bytes)
        .map_err(|e| PromptForgeError::InvalidImport(format!("Error parsing JSON file: {e}")))?;

    let has_name = value.get("name").and_then(|n| n.as_str()).is_some();
    let has_templates = value.get("templates").map_or(false, |t| t.is_array());
    if !has_name || !has_templates {
        return Err(PromptForgeError::InvalidImport(
            "Invalid collection file format. Expected a single collection object.".to_string(),
        ));
    }

    let id = match value.get("id").and_then(|v| v.as_str()) {
        Some(id) => id.to_string(),
        None => format!("{}-imported", chrono::Utc::now().timestamp_millis()),
    };
    let name = value["name"].as_str().unwrap_or_default().to_string();

    let templates: Vec<Template> = serde_json::from_value(value["templates"].clone())
        .map_err(|e| PromptForgeError::InvalidImport(format!("Invalid template entry: {e}")))?;

    let mut collection = Collection {
        id,
        name,
        templates: templates.into_iter().map(rederive_missing).collect(),
    };
    collection.sort_templates();
    Ok(collection)
}

/// Fill in derived caches a hand-edited or older export may lack; fields the
/// file does carry are trusted as the caller-supplied whole entity.
fn rederive_missing(mut template: Template) -> Template {
    let derived = Template::from_content(&template.id, &template.content);
    if template.title.is_empty() {
        template.title = derived.title;
    }
    if template.interactive.is_none() {
        template.interactive = derived.interactive;
    }
    template
}

fn join_words(s: &str, sep: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(sep)
}
