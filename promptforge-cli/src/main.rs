use clap::{Parser, Subcommand};
use promptforge::generate::wizard_instruction;
use promptforge::persist::FileStore;
use promptforge::prompt::{FormData, FormValue, GeneratorRegistry};
use promptforge::{transfer, Operation, PromptForgeError, Store};
use std::fs;
use std::path::PathBuf;
use std::process;

/// PromptForge CLI — manage prompt-template collections from the command line
#[derive(Parser)]
#[command(name = "promptforge", version, about)]
struct Cli {
    /// Data directory holding the persisted state (default: current directory)
    #[arg(long, default_value = ".")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Seed the store with the built-in starter collections
    Seed,

    /// List collections and the active selection
    List,

    /// Show the templates of a collection (default: the active one)
    Show {
        /// Collection id
        #[arg(long)]
        collection: Option<String>,
    },

    /// Print a template's raw content
    Cat {
        /// Template id within the active collection
        id: String,
    },

    /// Add a new empty collection and make it active
    AddCollection {
        /// Display name
        name: String,
    },

    /// Remove a collection
    RemoveCollection {
        /// Collection id
        id: String,
    },

    /// Rename a collection
    RenameCollection {
        /// Collection id
        id: String,
        /// New display name
        name: String,
    },

    /// Make a collection active
    Select {
        /// Collection id
        id: String,
    },

    /// Make a template active within the active collection
    SelectTemplate {
        /// Template id; omit to clear the selection
        id: Option<String>,
    },

    /// Create a template in the active collection
    CreateTemplate {
        /// Display name
        name: String,
        /// Read initial content from a file instead of the default document
        #[arg(long)]
        content_file: Option<PathBuf>,
    },

    /// Replace a template's content
    UpdateTemplate {
        /// Template id within the active collection
        id: String,
        /// File with the full replacement content
        content_file: PathBuf,
    },

    /// Delete a template from the active collection
    DeleteTemplate {
        /// Template id
        id: String,
    },

    /// Change the color theme (slate, sky, rose)
    Theme {
        theme: String,
    },

    /// Export a collection to a JSON file
    Export {
        /// Collection id
        id: String,
        /// Output directory (default: current directory)
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },

    /// Export a single template as markdown
    ExportTemplate {
        /// Template id within the active collection
        id: String,
        /// Output directory (default: current directory)
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },

    /// Import a collection from a JSON file
    Import {
        /// Path to the collection file
        file: PathBuf,
    },

    /// Assemble a prompt from an interactive template and a form-data file
    Render {
        /// Template id within the active collection
        id: String,
        /// JSON file mapping field ids to values
        #[arg(long)]
        data: PathBuf,
    },

    /// Print the template-wizard system instruction for the active collection
    Wizard,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("ERROR:{e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> promptforge::Result<()> {
    let mut store = Store::open(Box::new(FileStore::new(&cli.data_dir)));

    match cli.command {
        Command::Seed => {
            for collection in promptforge::starter::collections() {
                println!("Added '{}' ({})", collection.name, collection.id);
                store.dispatch(Operation::AddCollection(collection));
            }
        }

        Command::List => {
            let cs = &store.state().collections_state;
            if cs.collections.is_empty() {
                println!("No collections. Try `promptforge seed`.");
            }
            for c in &cs.collections {
                let marker = if cs.active_collection_id.as_deref() == Some(c.id.as_str()) {
                    "*"
                } else {
                    " "
                };
                println!("{marker} {} ({}, {} templates)", c.name, c.id, c.templates.len());
            }
        }

        Command::Show { collection } => {
            let cs = &store.state().collections_state;
            let target = match &collection {
                Some(id) => cs.collection(id),
                None => cs.active_collection(),
            };
            let Some(target) = target else {
                return Err(PromptForgeError::Other("No such collection".into()));
            };
            for t in &target.templates {
                let marker = if cs.active_template_id.as_deref() == Some(t.id.as_str()) {
                    "*"
                } else {
                    " "
                };
                let kind = if t.interactive.is_some() {
                    "interactive"
                } else {
                    "plain"
                };
                let order = t
                    .order
                    .map(|o| o.to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!("{marker} [{order}] {} ({}, {kind})", t.title, t.id);
            }
        }

        Command::Cat { id } => {
            let template = active_template(&store, &id)?;
            println!("{}", template.content);
        }

        Command::AddCollection { name } => {
            let collection = promptforge::Collection::new(&name);
            println!("Added '{}' ({})", collection.name, collection.id);
            store.dispatch(Operation::AddCollection(collection));
        }

        Command::RemoveCollection { id } => {
            store.dispatch(Operation::RemoveCollection(id));
        }

        Command::RenameCollection { id, name } => {
            store.dispatch(Operation::RenameCollection { id, name });
        }

        Command::Select { id } => {
            store.dispatch(Operation::SelectCollection(id.clone()));
            let cs = &store.state().collections_state;
            if cs.active_collection_id.as_deref() != Some(id.as_str()) {
                return Err(PromptForgeError::Other(format!("No such collection: {id}")));
            }
        }

        Command::SelectTemplate { id } => {
            store.dispatch(Operation::SelectTemplate(id));
        }

        Command::CreateTemplate { name, content_file } => {
            let content = match content_file {
                Some(path) => Some(fs::read_to_string(path)?),
                None => None,
            };
            store.dispatch(Operation::CreateTemplate { name, content });
            let cs = &store.state().collections_state;
            if let Some(id) = &cs.active_template_id {
                println!("Created {id}");
            }
        }

        Command::UpdateTemplate { id, content_file } => {
            let content = fs::read_to_string(content_file)?;
            let mut template = active_template(&store, &id)?.clone();
            let derived = promptforge::Template::from_content(&id, &content);
            template.content = content;
            template.title = derived.title;
            template.interactive = derived.interactive;
            store.dispatch(Operation::UpdateTemplate(template));
        }

        Command::DeleteTemplate { id } => {
            store.dispatch(Operation::DeleteTemplate(id));
        }

        Command::Theme { theme } => {
            let theme = serde_json::from_value(serde_json::Value::String(theme.clone()))
                .map_err(|_| PromptForgeError::Other(format!("Unknown theme: {theme}")))?;
            store.dispatch(Operation::UpdateSettings(promptforge::model::SettingsPatch {
                theme: Some(theme),
            }));
        }

        Command::Export { id, out } => {
            let cs = &store.state().collections_state;
            let Some(collection) = cs.collection(&id) else {
                return Err(PromptForgeError::Other(format!("No such collection: {id}")));
            };
            let path = out.join(transfer::collection_file_name(collection));
            fs::write(&path, transfer::export_collection(collection)?)?;
            println!("Wrote {}", path.display());
        }

        Command::ExportTemplate { id, out } => {
            let template = active_template(&store, &id)?;
            let path = out.join(transfer::template_file_name(template));
            fs::write(&path, transfer::export_template(template))?;
            println!("Wrote {}", path.display());
        }

        Command::Import { file } => {
            let bytes = fs::read(file)?;
            let collection = transfer::import_collection(&bytes)?;
            println!("Imported '{}' ({})", collection.name, collection.id);
            store.dispatch(Operation::AddCollection(collection));
        }

        Command::Render { id, data } => {
            let template = active_template(&store, &id)?;
            let Some(spec) = template.interactive.clone() else {
                return Err(PromptForgeError::Other(format!(
                    "Template {id} has no interactive form"
                )));
            };
            let cs = &store.state().collections_state;
            let context = cs
                .active_collection()
                .map(|c| c.system_context())
                .unwrap_or_default();

            let raw: serde_json::Map<String, serde_json::Value> =
                serde_json::from_str(&fs::read_to_string(data)?)?;
            let mut form = FormData::new();
            for field in &spec.fields {
                if let Some(value) = raw.get(&field.id) {
                    let value: FormValue = serde_json::from_value(value.clone())?;
                    form.insert(&field.id, value);
                }
            }

            let registry = GeneratorRegistry::with_builtins();
            println!("{}", registry.generate(&spec, &form, &context)?);
        }

        Command::Wizard => {
            let cs = &store.state().collections_state;
            let Some(collection) = cs.active_collection() else {
                return Err(PromptForgeError::Other("No active collection".into()));
            };
            println!(
                "{}",
                wizard_instruction(&collection.name, &collection.system_context())
            );
        }
    }

    Ok(())
}

fn active_template<'a>(
    store: &'a Store,
    id: &str,
) -> promptforge::Result<&'a promptforge::Template> {
    store
        .state()
        .collections_state
        .active_collection()
        .and_then(|c| c.template(id))
        .ok_or_else(|| {
            PromptForgeError::Other(format!("No template '{id}' in the active collection"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_render_subcommand_shape() {
        let cli = Cli::parse_from([
            "promptforge",
            "--data-dir",
            "/tmp/pf",
            "render",
            "02-email-writer.md",
            "--data",
            "form.json",
        ]);
        assert!(matches!(cli.command, Command::Render { .. }));
    }

    #[test]
    fn test_seed_then_create_persists_across_runs() {
        let tmp = tempfile::TempDir::new().unwrap();
        let dir = tmp.path().to_str().unwrap();

        run(Cli::parse_from(["promptforge", "--data-dir", dir, "seed"])).unwrap();
        run(Cli::parse_from([
            "promptforge",
            "--data-dir",
            dir,
            "create-template",
            "release notes",
        ]))
        .unwrap();

        let store = Store::open(Box::new(FileStore::new(tmp.path())));
        let cs = &store.state().collections_state;
        assert_eq!(cs.collections.len(), 2);
        assert_eq!(cs.active_template_id.as_deref(), Some("04-release-notes.md"));
    }
}
