// Prompt assembly engine - pure functions from (generator name, form input,
// system context) to final prompt text. Generators live in a registration
// table built once; frontmatter references them by name.

use crate::document::InteractiveSpec;
use crate::error::{PromptForgeError, Result};
use crate::model::title_case;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A file handed in through a form's file field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileAttachment {
    pub name: String,
    pub mime_type: String,
    /// Base64-encoded file contents.
    pub data: String,
}

/// One submitted form value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormValue {
    Bool(bool),
    File(FileAttachment),
    Text(String),
}

impl FormValue {
    /// Empty values are omitted from assembled prompts; booleans and files
    /// are never considered empty.
    fn is_empty(&self) -> bool {
        matches!(self, FormValue::Text(text) if text.is_empty())
    }

    fn as_text(&self) -> &str {
        match self {
            FormValue::Text(text) => text,
            _ => "",
        }
    }
}

/// Submitted form input, keyed by field id, in field input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormData(Vec<(String, FormValue)>);

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value, keeping first-insertion order.
    pub fn insert(&mut self, id: &str, value: FormValue) {
        match self.0.iter_mut().find(|(k, _)| k == id) {
            Some((_, slot)) => *slot = value,
            None => self.0.push((id.to_string(), value)),
        }
    }

    pub fn get(&self, id: &str) -> Option<&FormValue> {
        self.0.iter().find(|(k, _)| k == id).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FormValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn text(&self, id: &str) -> &str {
        self.get(id).map(FormValue::as_text).unwrap_or("")
    }
}

/// A generator is a pure function of the form input and the ambient system
/// context; no I/O, no mutation.
pub type GeneratorFn = fn(&FormData, &str) -> String;

/// Name-to-generator table, built once at startup. Frontmatter `onSubmit`
/// values resolve against it at generation time.
pub struct GeneratorRegistry {
    generators: HashMap<String, GeneratorFn>,
}

impl GeneratorRegistry {
    /// Registry preloaded with the builtin generators. The names are data
    /// referenced from template frontmatter, so they keep their original
    /// spelling.
    pub fn with_builtins() -> Self {
        let mut registry = Self {
            generators: HashMap::new(),
        };
        registry.register("genericPromptGenerator", generic_prompt);
        registry.register("howToPromptGenerator", how_to_prompt);
        registry.register("diagramPromptGenerator", diagram_prompt);
        registry.register("smeNarrativePromptGenerator", sme_narrative_prompt);
        registry
    }

    pub fn register(&mut self, name: &str, generator: GeneratorFn) {
        self.generators.insert(name.to_string(), generator);
    }

    pub fn resolve(&self, name: &str) -> Result<GeneratorFn> {
        self.generators
            .get(name)
            .copied()
            .ok_or_else(|| PromptForgeError::GeneratorNotFound(name.to_string()))
    }

    /// Validate the submission against the form spec, resolve the generator,
    /// and assemble the prompt. No generator runs when validation fails.
    pub fn generate(
        &self,
        spec: &InteractiveSpec,
        form: &FormData,
        system_context: &str,
    ) -> Result<String> {
        validate_submission(spec, form)?;
        let generator = self.resolve(&spec.on_submit)?;
        Ok(generator(form, system_context))
    }
}

/// Every field other than a checkbox must carry a non-empty value.
pub fn validate_submission(spec: &InteractiveSpec, form: &FormData) -> Result<()> {
    let missing: Vec<String> = spec
        .fields
        .iter()
        .filter(|field| field.is_required())
        .filter(|field| form.get(&field.id).map_or(true, FormValue::is_empty))
        .map(|field| field.id.clone())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(PromptForgeError::MissingFields(missing))
    }
}

/// System block, separator, user block.
fn full_prompt(system_context: &str, user_prompt: &str) -> String {
    format!(
        "# [SYSTEM INSTRUCTIONS]\n\n{}\n\n---\n\n# [USER REQUEST]\n\n{}",
        system_context.trim(),
        user_prompt.trim()
    )
}

/// Render each non-empty field as a `### Label` section, in input order.
/// Booleans always render as Enabled/Disabled; files embed name, MIME type,
/// and base64 data; empty text is omitted.
fn format_inputs(form: &FormData) -> String {
    form.iter()
        .filter_map(|(id, value)| {
            let label = title_case(&id.replace('_', " "));
            match value {
                FormValue::Text(_) if value.is_empty() => None,
                FormValue::Text(text) => Some(format!("### {label}\n{}", text.trim())),
                FormValue::Bool(enabled) => Some(format!(
                    "### {label}\n{}",
                    if *enabled { "Enabled" } else { "Disabled" }
                )),
                FormValue::File(file) => Some(format!(
                    "### {label}\n- **File Name:** {}\n- **MIME Type:** {}\n- **Content (Base64):**\n```\n{}\n```",
                    file.name, file.mime_type, file.data
                )),
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// The default generator: labeled sections for whatever the form contains.
fn generic_prompt(form: &FormData, system_context: &str) -> String {
    let user_prompt = format!(
        "Based on the following inputs, generate the requested output.\n\n{}",
        format_inputs(form)
    );
    full_prompt(system_context, &user_prompt)
}

/// Step-by-step modeling-tool instructions around four fixed fields.
fn how_to_prompt(form: &FormData, system_context: &str) -> String {
    let user_prompt = format!(
        "I need to perform the following action in Cameo 2022x:\n### Action\n{}\n\n### Element Type\n{}\n\n### Target Diagram\n{}\n\n### Ultimate Goal\n{}\n\nPlease provide clear, step-by-step instructions.",
        form.text("action"),
        form.text("element"),
        form.text("diagram"),
        form.text("goal")
    );
    full_prompt(system_context, &user_prompt)
}

/// PlantUML sequence diagram from a scenario description and entity list.
fn diagram_prompt(form: &FormData, system_context: &str) -> String {
    let user_prompt = format!(
        "Generate a UML Sequence Diagram in PlantUML syntax based on the following specifications:\n### Scenario Description\n{}\n\n### Key Entities (Actors/Blocks)\n{}",
        form.text("description"),
        form.text("entities")
    );
    full_prompt(system_context, &user_prompt)
}

/// Wraps a subject-matter-expert narrative as a blockquote for translation
/// into a sequence diagram.
fn sme_narrative_prompt(form: &FormData, system_context: &str) -> String {
    let narrative = form.text("narrative").replace('\n', "\n> ");
    let user_prompt = format!(
        "Analyze the following SME narrative and translate it into a UML Sequence Diagram in PlantUML syntax. Identify the actors and systems from the narrative to use as participants.\n### SME Narrative\n> {narrative}"
    );
    full_prompt(system_context, &user_prompt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Field, FieldType};
    use pretty_assertions::assert_eq;

    fn field(id: &str, field_type: FieldType) -> Field {
        Field {
            id: id.to_string(),
            label: format!("{id}:"),
            field_type,
            placeholder: None,
            rows: None,
            options: None,
            accept: None,
        }
    }

    fn spec(on_submit: &str, fields: Vec<Field>) -> InteractiveSpec {
        InteractiveSpec {
            kind: "InteractivePrompt".into(),
            title: "T".into(),
            description: "D".into(),
            fields,
            button_text: "Go".into(),
            on_submit: on_submit.into(),
            is_diagram: None,
        }
    }

    #[test]
    fn test_generic_prompt_sections_in_input_order() {
        let mut form = FormData::new();
        form.insert("key_points", FormValue::Text("be brief".into()));
        form.insert("recipient", FormValue::Text("Dr. Evans".into()));

        let out = generic_prompt(&form, "Be helpful.");
        let key_pos = out.find("### Key Points").unwrap();
        let recipient_pos = out.find("### Recipient").unwrap();
        assert!(key_pos < recipient_pos);
        assert!(out.starts_with("# [SYSTEM INSTRUCTIONS]\n\nBe helpful.\n\n---\n\n# [USER REQUEST]"));
    }

    #[test]
    fn test_generic_prompt_omits_empty_renders_booleans() {
        let mut form = FormData::new();
        form.insert("topic", FormValue::Text("".into()));
        form.insert("verbose", FormValue::Bool(false));

        let out = generic_prompt(&form, "ctx");
        assert!(!out.contains("### Topic"));
        assert!(out.contains("### Verbose\nDisabled"));
    }

    #[test]
    fn test_generic_prompt_embeds_file() {
        let mut form = FormData::new();
        form.insert(
            "source_file",
            FormValue::File(FileAttachment {
                name: "data.json".into(),
                mime_type: "application/json".into(),
                data: "eyJhIjoxfQ==".into(),
            }),
        );

        let out = generic_prompt(&form, "ctx");
        assert!(out.contains("### Source File"));
        assert!(out.contains("- **File Name:** data.json"));
        assert!(out.contains("- **MIME Type:** application/json"));
        assert!(out.contains("```\neyJhIjoxfQ==\n```"));
    }

    #[test]
    fn test_validation_rejects_empty_required_field() {
        let spec = spec("genericPromptGenerator", vec![field("a", FieldType::Input)]);
        let mut form = FormData::new();
        form.insert("a", FormValue::Text("".into()));

        let registry = GeneratorRegistry::with_builtins();
        let err = registry.generate(&spec, &form, "ctx").unwrap_err();
        match err {
            PromptForgeError::MissingFields(ids) => assert_eq!(ids, vec!["a".to_string()]),
            other => panic!("expected MissingFields, got {other:?}"),
        }
    }

    #[test]
    fn test_validation_allows_unchecked_checkbox() {
        let spec = spec(
            "genericPromptGenerator",
            vec![field("agree", FieldType::Checkbox)],
        );
        let form = FormData::new();
        assert!(validate_submission(&spec, &form).is_ok());
    }

    #[test]
    fn test_unknown_generator_name() {
        let spec = spec("nope", vec![]);
        let registry = GeneratorRegistry::with_builtins();
        let err = registry.generate(&spec, &FormData::new(), "ctx").unwrap_err();
        assert!(matches!(err, PromptForgeError::GeneratorNotFound(name) if name == "nope"));
    }

    #[test]
    fn test_sme_narrative_blockquotes_every_line() {
        let mut form = FormData::new();
        form.insert(
            "narrative",
            FormValue::Text("first line\nsecond line".into()),
        );
        let out = sme_narrative_prompt(&form, "ctx");
        assert!(out.contains("> first line\n> second line"));
    }

    #[test]
    fn test_how_to_prompt_uses_named_fields() {
        let mut form = FormData::new();
        form.insert("action", FormValue::Text("create a block".into()));
        form.insert("element", FormValue::Text("Block".into()));
        form.insert("diagram", FormValue::Text("BDD".into()));
        form.insert("goal", FormValue::Text("model the system".into()));

        let out = how_to_prompt(&form, "ctx");
        assert!(out.contains("### Action\ncreate a block"));
        assert!(out.contains("### Ultimate Goal\nmodel the system"));
    }

    #[test]
    fn test_custom_generator_registration() {
        fn shout(form: &FormData, _ctx: &str) -> String {
            form.text("word").to_uppercase()
        }

        let mut registry = GeneratorRegistry::with_builtins();
        registry.register("shoutGenerator", shout);

        let mut form = FormData::new();
        form.insert("word", FormValue::Text("quiet".into()));
        let spec = spec("shoutGenerator", vec![field("word", FieldType::Input)]);
        assert_eq!(registry.generate(&spec, &form, "").unwrap(), "QUIET");
    }

    #[test]
    fn test_form_value_untagged_deserialization() {
        let value: FormValue = serde_json::from_str("true").unwrap();
        assert_eq!(value, FormValue::Bool(true));

        let value: FormValue = serde_json::from_str("\"text\"").unwrap();
        assert_eq!(value, FormValue::Text("text".into()));

        let value: FormValue = serde_json::from_str(
            r#"{"name": "a.txt", "mimeType": "text/plain", "data": "YQ=="}"#,
        )
        .unwrap();
        assert!(matches!(value, FormValue::File(f) if f.name == "a.txt"));
    }
}
