// AI generation boundary. The backing model call is an opaque collaborator
// behind the `TextGenerator` trait; this module only builds the instructions
// and maps failures into the crate error type.

use crate::error::Result;
use crate::model::Collection;

/// The one asynchronous-in-spirit boundary of the system. Implementations
/// call whatever backend they like; a missing credential or a failed call
/// surfaces as `PromptForgeError::Generation`.
pub trait TextGenerator {
    fn generate(&self, user_prompt: &str, system_instruction: &str) -> Result<String>;
}

/// Ask the backend to author a complete interactive template from a plain
/// description, thematically grounded in the target collection.
///
/// The returned text is full raw template content (frontmatter + body),
/// ready for a CreateTemplate dispatch. Nothing touches the store here;
/// the caller dispatches on success.
pub fn generate_template(
    generator: &dyn TextGenerator,
    description: &str,
    collection: &Collection,
) -> Result<String> {
    let instruction = wizard_instruction(&collection.name, &collection.system_context());
    generator.generate(description, &instruction)
}

/// System instruction for the template wizard. Mandates the generic
/// generator and the exact output structure so the result parses as an
/// interactive template.
pub fn wizard_instruction(collection_name: &str, collection_context: &str) -> String {
    format!(
        r#"You are an expert in creating AI prompt templates. Your task is to generate a complete Markdown file content based on a user's description. The output must be a single block of text containing valid YAML frontmatter and Markdown body.

The user is working in a collection named "{collection_name}". This collection has a specific context and purpose, defined by the following system prompt:
---
{collection_context}
---
Use the context from this system prompt to inform the generated content. The new template should be thematically consistent with the collection.

The frontmatter should define an interactive form. It must include:
- type: 'InteractivePrompt'
- title: A suitable title for the template.
- description: A brief, user-friendly description of what the template does.
- fields: An array of input fields. Each field needs an id, label, type ('input' or 'textarea'), and a placeholder.
- buttonText: Action-oriented text for the button, like "Generate Prompt" or "Create Snippet".
- onSubmit: 'genericPromptGenerator' (You must always use this value).

The body of the Markdown should provide simple instructions or context for the user.

Example Output Structure:
---
interactive:
    type: 'InteractivePrompt'
    title: 'Example Title'
    description: 'This is an example description.'
    fields:
        - id: 'example_id'
          label: 'Example Label'
          type: 'input'
          placeholder: 'e.g., Enter some text'
    buttonText: 'Generate Example'
    onSubmit: 'genericPromptGenerator'
---

This is the markdown body with instructions for the user.

---
Now, generate the complete markdown file content for the following user request. Return ONLY the markdown content, with no other explanation."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PromptForgeError;
    use crate::model::Template;

    struct CannedGenerator(&'static str);

    impl TextGenerator for CannedGenerator {
        fn generate(&self, _user_prompt: &str, _system_instruction: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct FailingGenerator;

    impl TextGenerator for FailingGenerator {
        fn generate(&self, _user_prompt: &str, _system_instruction: &str) -> Result<String> {
            Err(PromptForgeError::Generation(
                "API key environment variable not set".into(),
            ))
        }
    }

    fn collection_with_context() -> Collection {
        Collection {
            id: "c1".into(),
            name: "Everyday Prompts".into(),
            templates: vec![Template::from_content(
                "01-system.md",
                "---\ntitle: System\n---\nYou help with everyday tasks.",
            )],
        }
    }

    #[test]
    fn test_wizard_instruction_embeds_collection() {
        let instruction = wizard_instruction("Everyday Prompts", "You help with everyday tasks.");
        assert!(instruction.contains("a collection named \"Everyday Prompts\""));
        assert!(instruction.contains("You help with everyday tasks."));
        assert!(instruction.contains("onSubmit: 'genericPromptGenerator'"));
    }

    #[test]
    fn test_generate_template_passes_through_backend_output() {
        let canned = "---\ntitle: Generated\n---\nbody";
        let out = generate_template(&CannedGenerator(canned), "make one", &collection_with_context())
            .unwrap();
        assert_eq!(out, canned);
    }

    #[test]
    fn test_generation_failure_surfaces() {
        let err = generate_template(&FailingGenerator, "make one", &collection_with_context())
            .unwrap_err();
        assert!(matches!(err, PromptForgeError::Generation(_)));
    }
}
