// Built-in starter collections, embedded at compile time and parsed through
// the document codec the same way imported content is.

use crate::model::{Collection, Template};

const EVERYDAY: &[(&str, &str)] = &[
    (
        "01-system-prompt.md",
        include_str!("../../content/everyday/01-system-prompt.md"),
    ),
    (
        "02-email-writer.md",
        include_str!("../../content/everyday/02-email-writer.md"),
    ),
    (
        "03-meeting-summarizer.md",
        include_str!("../../content/everyday/03-meeting-summarizer.md"),
    ),
];

const SOFTWARE: &[(&str, &str)] = &[
    (
        "01-system-prompt.md",
        include_str!("../../content/software/01-system-prompt.md"),
    ),
    (
        "02-code-refactor.md",
        include_str!("../../content/software/02-code-refactor.md"),
    ),
    (
        "03-unit-test-generator.md",
        include_str!("../../content/software/03-unit-test-generator.md"),
    ),
];

/// The starter sets offered to a fresh session. Ids are unique per call so
/// re-seeding never collides with an already-added starter.
pub fn collections() -> Vec<Collection> {
    let millis = chrono::Utc::now().timestamp_millis();
    vec![
        starter_collection(millis, "everyday", "Everyday Prompts", EVERYDAY),
        starter_collection(millis, "software", "Software Engineering", SOFTWARE),
    ]
}

fn starter_collection(
    millis: i64,
    slug: &str,
    name: &str,
    entries: &[(&str, &str)],
) -> Collection {
    let mut collection = Collection {
        id: format!("starter-{millis}-{slug}"),
        name: name.to_string(),
        templates: parse_templates(entries),
    };
    collection.sort_templates();
    collection
}

/// Parse (filename-like id, raw content) pairs into templates. Numeric-prefix
/// filenames drive ordering; anything unparseable sorts last.
pub fn parse_templates(entries: &[(&str, &str)]) -> Vec<Template> {
    entries
        .iter()
        .map(|(id, content)| Template::from_content(id, content))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starter_collections_parse() {
        let collections = collections();
        assert_eq!(collections.len(), 2);
        for c in &collections {
            assert!(c.id.starts_with("starter-"));
            assert_eq!(c.templates.len(), 3);
            assert_eq!(c.templates[0].order, Some(1));
        }
    }

    #[test]
    fn test_starter_interactive_templates_classified() {
        let everyday = &collections()[0];
        assert!(everyday.template("01-system-prompt.md").unwrap().interactive.is_none());
        let email = everyday.template("02-email-writer.md").unwrap();
        let spec = email.interactive.as_ref().expect("interactive form");
        assert_eq!(spec.on_submit, "genericPromptGenerator");
        assert_eq!(email.title, "Quick Email Writer");
    }

    #[test]
    fn test_starter_system_context_available() {
        for c in collections() {
            assert!(c.system_context().contains("# ROLE AND GOAL"));
        }
    }

    #[test]
    fn test_unparseable_filename_sorts_last() {
        let templates = parse_templates(&[
            ("notes.md", "no order"),
            ("01-first.md", "first"),
        ]);
        let mut collection = Collection {
            id: "c".into(),
            name: "C".into(),
            templates,
        };
        collection.sort_templates();
        assert_eq!(collection.templates.last().unwrap().id, "notes.md");
    }
}
