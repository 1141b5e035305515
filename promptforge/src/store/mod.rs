// Collection store - the sole mutator of the Root State. All mutation goes
// through `dispatch` with a closed set of operations; each application is a
// pure function from the previous state to the next, the new state persists
// before the next dispatch, and subscribers observe every transition.

use crate::model::{Collection, RootState, SettingsPatch, Template};
use crate::persist::StateStore;

/// The closed set of state operations.
///
/// Every operation that replaces an entity takes a complete replacement
/// value; there are no field-level mutations. An operation whose
/// precondition fails (an id that is not in the store, no active collection)
/// leaves the state untouched rather than erroring, so stale callers can
/// never crash the store.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    AddCollection(Collection),
    RemoveCollection(String),
    RenameCollection { id: String, name: String },
    SelectCollection(String),
    SelectTemplate(Option<String>),
    CreateTemplate { name: String, content: Option<String> },
    UpdateTemplate(Template),
    DeleteTemplate(String),
    UpdateSettings(SettingsPatch),
    SetEditorDirty(bool),
}

/// Apply one operation, producing the next Root State. Pure: no I/O, no
/// observable effect beyond the returned value.
pub fn apply(state: RootState, op: &Operation) -> RootState {
    match op {
        Operation::AddCollection(collection) => add_collection(state, collection),
        Operation::RemoveCollection(id) => remove_collection(state, id),
        Operation::RenameCollection { id, name } => rename_collection(state, id, name),
        Operation::SelectCollection(id) => select_collection(state, id),
        Operation::SelectTemplate(id) => select_template(state, id.as_deref()),
        Operation::CreateTemplate { name, content } => {
            create_template(state, name, content.as_deref())
        }
        Operation::UpdateTemplate(template) => update_template(state, template),
        Operation::DeleteTemplate(id) => delete_template(state, id),
        Operation::UpdateSettings(patch) => update_settings(state, patch),
        Operation::SetEditorDirty(dirty) => {
            let mut state = state;
            state.editor_is_dirty = *dirty;
            state
        }
    }
}

fn add_collection(mut state: RootState, collection: &Collection) -> RootState {
    let cs = &mut state.collections_state;
    if cs.collection(&collection.id).is_some() {
        return state;
    }

    let mut collection = collection.clone();
    collection.sort_templates();

    cs.active_collection_id = Some(collection.id.clone());
    cs.active_template_id = collection.first_template_id();
    cs.collections.push(collection);
    state.editor_is_dirty = false;
    state
}

fn remove_collection(mut state: RootState, id: &str) -> RootState {
    let cs = &mut state.collections_state;
    if cs.collection(id).is_none() {
        return state;
    }

    cs.collections.retain(|c| c.id != id);
    if cs.active_collection_id.as_deref() == Some(id) {
        cs.active_collection_id = cs.collections.first().map(|c| c.id.clone());
    }
    cs.active_template_id = cs
        .active_collection()
        .and_then(Collection::first_template_id);
    state.editor_is_dirty = false;
    state
}

fn rename_collection(mut state: RootState, id: &str, name: &str) -> RootState {
    let cs = &mut state.collections_state;
    match cs.collections.iter_mut().find(|c| c.id == id) {
        Some(collection) => collection.name = name.to_string(),
        None => return state,
    }
    state
}

fn select_collection(mut state: RootState, id: &str) -> RootState {
    let cs = &mut state.collections_state;
    let Some(collection) = cs.collection(id) else {
        return state;
    };

    cs.active_template_id = collection.first_template_id();
    cs.active_collection_id = Some(id.to_string());
    state.editor_is_dirty = false;
    state
}

fn select_template(mut state: RootState, id: Option<&str>) -> RootState {
    let cs = &mut state.collections_state;
    if let Some(id) = id {
        let in_active = cs
            .active_collection()
            .is_some_and(|c| c.template(id).is_some());
        if !in_active {
            return state;
        }
    }

    cs.active_template_id = id.map(str::to_string);
    state.editor_is_dirty = false;
    state
}

fn create_template(mut state: RootState, name: &str, content: Option<&str>) -> RootState {
    let cs = &mut state.collections_state;
    let Some(active_id) = cs.active_collection_id.clone() else {
        return state;
    };
    let Some(collection) = cs.collections.iter_mut().find(|c| c.id == active_id) else {
        return state;
    };

    let order = collection.next_order();
    let id = format!(
        "{order:02}-{}.md",
        name.split_whitespace().collect::<Vec<_>>().join("-")
    );
    if collection.template(&id).is_some() {
        return state;
    }

    let content = match content {
        Some(content) => content.to_string(),
        None => crate::document::StructuredDocument::minimal(name).to_text(),
    };

    collection.templates.push(Template::from_content(&id, &content));
    collection.sort_templates();

    cs.active_template_id = Some(id);
    state.editor_is_dirty = false;
    state
}

fn update_template(mut state: RootState, template: &Template) -> RootState {
    let cs = &mut state.collections_state;
    let Some(active_id) = cs.active_collection_id.clone() else {
        return state;
    };
    let Some(collection) = cs.collections.iter_mut().find(|c| c.id == active_id) else {
        return state;
    };
    let Some(slot) = collection.templates.iter_mut().find(|t| t.id == template.id) else {
        return state;
    };

    *slot = template.clone();
    collection.sort_templates();
    state.editor_is_dirty = false;
    state
}

fn delete_template(mut state: RootState, id: &str) -> RootState {
    let cs = &mut state.collections_state;
    let Some(active_id) = cs.active_collection_id.clone() else {
        return state;
    };
    let Some(collection) = cs.collections.iter_mut().find(|c| c.id == active_id) else {
        return state;
    };
    if collection.template(id).is_none() {
        return state;
    }

    // Position within the sorted list drives the fallback selection below.
    collection.sort_templates();
    let index = collection
        .templates
        .iter()
        .position(|t| t.id == id)
        .unwrap_or(0);
    collection.templates.remove(index);

    let was_active = cs.active_template_id.as_deref() == Some(id);
    if was_active {
        let next = collection
            .templates
            .get(index.saturating_sub(1))
            .or_else(|| collection.templates.first())
            .map(|t| t.id.clone());
        cs.active_template_id = next;
    }
    state.editor_is_dirty = false;
    state
}

fn update_settings(mut state: RootState, patch: &SettingsPatch) -> RootState {
    if let Some(theme) = patch.theme {
        state.settings.theme = theme;
    }
    state
}

type Subscriber = Box<dyn Fn(&RootState)>;

/// The one store instance a session owns. Constructed with an explicit
/// persistence backend and handed by reference to whatever needs it;
/// interested components register subscriber callbacks instead of reading
/// ambient context.
pub struct Store {
    state: RootState,
    storage: Box<dyn StateStore>,
    subscribers: Vec<Subscriber>,
}

impl Store {
    /// Open the store, restoring the persisted Root State or starting from
    /// the empty initial state when nothing usable is stored.
    pub fn open(storage: Box<dyn StateStore>) -> Self {
        let state = storage.load().unwrap_or_default();
        Self {
            state,
            storage,
            subscribers: Vec::new(),
        }
    }

    /// Read model. Always the fully-applied result of the last dispatch.
    pub fn state(&self) -> &RootState {
        &self.state
    }

    /// Register a callback invoked after every dispatch with the new state.
    pub fn subscribe(&mut self, subscriber: impl Fn(&RootState) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    /// Apply an operation, persist the result, and notify subscribers.
    ///
    /// A persistence write failure is logged and swallowed; the in-memory
    /// state remains authoritative for the session.
    pub fn dispatch(&mut self, op: Operation) -> &RootState {
        self.state = apply(std::mem::take(&mut self.state), &op);

        if let Err(e) = self.storage.save(&self.state) {
            log::warn!("Failed to persist state after {op:?}: {e}");
        }
        for subscriber in &self.subscribers {
            subscriber(&self.state);
        }
        &self.state
    }
}
