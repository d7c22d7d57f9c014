use leptos::prelude::*;
use strum::{AsRefStr, Display};

use crate::components::hooks::use_composed::ElementSlot;
use crate::components::hooks::use_random::use_random_id_for;

/// One registered option, in presentation order. The index of an item is
/// implicit in its position within the store's item list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComboboxItem {
    pub id: String,
    pub value: String,
}

/// How the input completes what the user is typing.
///
/// The serialized forms double as `aria-autocomplete` tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum CompletionMode {
    /// Ghost-text completion in the input; the suggested completion is
    /// also exposed on item text via `data-autocomplete-value`.
    #[default]
    Inline,
    None,
}

/// External state wiring for a controlled store. Any field left `None` is
/// owned by the store itself.
///
/// Handing in signals puts the caller in charge of the canonical state:
/// the store reads and writes those exact cells, so a caller holding the
/// same signals can never observe a different value than the store does.
#[derive(Clone, Copy, Default)]
pub struct ComboboxStoreOptions {
    pub open: Option<RwSignal<bool>>,
    pub active_id: Option<RwSignal<Option<String>>>,
    pub items: Option<RwSignal<Vec<ComboboxItem>>>,
}

/// Reactive state shared by every combobox primitive under one provider.
///
/// The store is a bundle of signal handles and is cheap to copy. All
/// mutation goes through its setters; rendering code treats the getters as
/// read-only inputs for the current render pass.
#[derive(Clone, Copy)]
pub struct ComboboxStore {
    open: RwSignal<bool>,
    active_id: RwSignal<Option<String>>,
    items: RwSignal<Vec<ComboboxItem>>,
    /// Text currently shown in the input.
    value: RwSignal<String>,
    /// Text the user actually typed; drives suggestion derivation even
    /// while the shown value carries an inline completion.
    typed_value: RwSignal<String>,
    completion: RwSignal<CompletionMode>,
    base_element: ElementSlot,
    popover_id: StoredValue<String>,
}

impl ComboboxStore {
    pub fn new(options: ComboboxStoreOptions) -> Self {
        Self {
            open: options.open.unwrap_or_else(|| RwSignal::new(false)),
            active_id: options.active_id.unwrap_or_else(|| RwSignal::new(None)),
            items: options.items.unwrap_or_else(|| RwSignal::new(Vec::new())),
            value: RwSignal::new(String::new()),
            typed_value: RwSignal::new(String::new()),
            completion: RwSignal::new(CompletionMode::default()),
            base_element: ElementSlot::new(),
            popover_id: StoredValue::new(use_random_id_for("listbox")),
        }
    }

    pub fn is_open(&self) -> bool {
        self.open.get()
    }

    pub fn is_open_untracked(&self) -> bool {
        self.open.get_untracked()
    }

    pub fn set_open(&self, open: bool) {
        self.open.set(open);
    }

    pub fn active_id(&self) -> Option<String> {
        self.active_id.get()
    }

    pub fn active_id_untracked(&self) -> Option<String> {
        self.active_id.get_untracked()
    }

    pub fn set_active_id(&self, id: Option<String>) {
        self.active_id.set(id);
    }

    pub fn items(&self) -> Vec<ComboboxItem> {
        self.items.get()
    }

    pub fn value(&self) -> String {
        self.value.get()
    }

    pub fn typed_value(&self) -> String {
        self.typed_value.get()
    }

    /// Sets both the shown and the typed text, as if the user had typed
    /// `value` in full.
    pub fn set_value(&self, value: impl Into<String>) {
        let value = value.into();
        self.typed_value.set(value.clone());
        self.value.set(value);
    }

    /// Replaces only the shown text (inline ghost completion); the typed
    /// text keeps driving the suggestion.
    pub(crate) fn complete_value(&self, value: String) {
        self.value.set(value);
    }

    pub fn completion(&self) -> CompletionMode {
        self.completion.get()
    }

    pub fn set_completion(&self, mode: CompletionMode) {
        self.completion.set(mode);
    }

    /// The combobox input element; the popover returns focus here on close.
    pub fn base_element(&self) -> ElementSlot {
        self.base_element
    }

    /// Element id shared by the popover and the input's `aria-controls`.
    pub fn popover_id(&self) -> String {
        self.popover_id.get_value()
    }

    /// Called by item primitives on mount. Items arrive in presentation
    /// order; remounting an id in place updates its value.
    pub fn register_item(&self, item: ComboboxItem) {
        self.items.update(|items| {
            match items.iter_mut().find(|existing| existing.id == item.id) {
                Some(existing) => *existing = item,
                None => items.push(item),
            }
        });
    }

    /// Called by item primitives on unmount.
    pub fn unregister_item(&self, id: &str) {
        self.items.update(|items| items.retain(|item| item.id != id));
    }

    /// Selects the item carrying `id`: its value becomes the input text,
    /// it becomes the active item, and the popover closes.
    pub fn select_item(&self, id: &str) {
        let selected = self
            .items
            .get_untracked()
            .into_iter()
            .find(|item| item.id == id);
        let Some(item) = selected else {
            return;
        };
        self.active_id.set(Some(item.id.clone()));
        self.set_value(item.value);
        self.open.set(false);
    }

    /// Steps the active item by `step`, wrapping at either end. With no
    /// current active item, a forward step lands on the first item and a
    /// backward step on the last.
    pub fn move_active(&self, step: isize) {
        let items = self.items.get_untracked();
        if items.is_empty() {
            return;
        }
        let current = self
            .active_id
            .get_untracked()
            .and_then(|id| items.iter().position(|item| item.id == id));
        let len = items.len() as isize;
        let next = match current {
            Some(index) => (index as isize + step).rem_euclid(len),
            None if step >= 0 => 0,
            None => len - 1,
        };
        self.active_id.set(Some(items[next as usize].id.clone()));
    }

    pub fn activate_first(&self) {
        if let Some(item) = self.items.get_untracked().first() {
            self.active_id.set(Some(item.id.clone()));
        }
    }

    pub fn activate_last(&self) {
        if let Some(item) = self.items.get_untracked().last() {
            self.active_id.set(Some(item.id.clone()));
        }
    }

    /// The suggested completion for the typed text: the first item whose
    /// value extends it (case-insensitive proper prefix). Only meaningful
    /// in [`CompletionMode::Inline`].
    pub fn suggestion(&self) -> Option<ComboboxItem> {
        derive_suggestion(
            &self.items.get(),
            &self.typed_value.get(),
            self.completion.get(),
        )
    }

    pub fn suggestion_untracked(&self) -> Option<ComboboxItem> {
        derive_suggestion(
            &self.items.get_untracked(),
            &self.typed_value.get_untracked(),
            self.completion.get_untracked(),
        )
    }
}

fn derive_suggestion(
    items: &[ComboboxItem],
    typed: &str,
    completion: CompletionMode,
) -> Option<ComboboxItem> {
    if completion != CompletionMode::Inline || typed.is_empty() {
        return None;
    }
    let needle = typed.to_lowercase();
    items
        .iter()
        .find(|item| {
            let hay = item.value.to_lowercase();
            hay.starts_with(&needle) && hay != needle
        })
        .cloned()
}

/// Position of the first item carrying `value`. Duplicate values are not
/// deduplicated; the first occurrence wins.
pub fn index_of_value(items: &[ComboboxItem], value: &str) -> Option<usize> {
    items.iter().position(|item| item.value == value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, value: &str) -> ComboboxItem {
        ComboboxItem {
            id: id.to_string(),
            value: value.to_string(),
        }
    }

    fn store_with(items: &[ComboboxItem]) -> ComboboxStore {
        let store = ComboboxStore::new(ComboboxStoreOptions::default());
        for entry in items {
            store.register_item(entry.clone());
        }
        store
    }

    #[test]
    fn test_items_follow_registration_order() {
        let store = store_with(&[item("a", "Apple"), item("b", "Banana"), item("o", "Orange")]);
        let values: Vec<String> = store.items().into_iter().map(|i| i.value).collect();
        assert_eq!(values, vec!["Apple", "Banana", "Orange"]);
    }

    #[test]
    fn test_unregister_removes_only_that_item() {
        let store = store_with(&[item("a", "Apple"), item("b", "Banana")]);
        store.unregister_item("a");
        let ids: Vec<String> = store.items().into_iter().map(|i| i.id).collect();
        assert_eq!(ids, vec!["b"]);
    }

    #[test]
    fn test_reregistering_an_id_updates_in_place() {
        let store = store_with(&[item("a", "Apple"), item("b", "Banana")]);
        store.register_item(item("a", "Apricot"));
        let values: Vec<String> = store.items().into_iter().map(|i| i.value).collect();
        assert_eq!(values, vec!["Apricot", "Banana"]);
    }

    #[test]
    fn test_index_of_value_returns_first_occurrence() {
        let items = [item("x", "Apple"), item("y", "Banana"), item("z", "Apple")];
        assert_eq!(index_of_value(&items, "Apple"), Some(0));
        assert_eq!(index_of_value(&items, "Banana"), Some(1));
        assert_eq!(index_of_value(&items, "Kiwi"), None);
    }

    #[test]
    fn test_select_item_sets_value_and_closes() {
        let store = store_with(&[item("a", "Apple"), item("o", "Orange")]);
        store.set_open(true);
        store.select_item("o");
        assert_eq!(store.value(), "Orange");
        assert_eq!(store.active_id_untracked().as_deref(), Some("o"));
        assert!(!store.is_open_untracked());
    }

    #[test]
    fn test_select_item_with_unknown_id_is_a_no_op() {
        let store = store_with(&[item("a", "Apple")]);
        store.set_open(true);
        store.select_item("missing");
        assert_eq!(store.value(), "");
        assert!(store.is_open_untracked());
    }

    #[test]
    fn test_move_active_steps_and_wraps() {
        let store = store_with(&[item("a", "Apple"), item("b", "Banana"), item("c", "Cherry")]);

        store.move_active(1);
        assert_eq!(store.active_id_untracked().as_deref(), Some("a"));
        store.move_active(1);
        assert_eq!(store.active_id_untracked().as_deref(), Some("b"));
        store.move_active(-1);
        assert_eq!(store.active_id_untracked().as_deref(), Some("a"));
        store.move_active(-1);
        assert_eq!(store.active_id_untracked().as_deref(), Some("c"));
        store.move_active(1);
        assert_eq!(store.active_id_untracked().as_deref(), Some("a"));
    }

    #[test]
    fn test_move_active_backward_from_none_lands_on_last() {
        let store = store_with(&[item("a", "Apple"), item("b", "Banana")]);
        store.move_active(-1);
        assert_eq!(store.active_id_untracked().as_deref(), Some("b"));
    }

    #[test]
    fn test_activate_edges() {
        let store = store_with(&[item("a", "Apple"), item("b", "Banana"), item("c", "Cherry")]);
        store.activate_last();
        assert_eq!(store.active_id_untracked().as_deref(), Some("c"));
        store.activate_first();
        assert_eq!(store.active_id_untracked().as_deref(), Some("a"));
    }

    #[test]
    fn test_suggestion_matches_first_prefix_candidate() {
        let store = store_with(&[
            item("b", "Banana"),
            item("p", "Pineapple"),
            item("a", "Pine"),
        ]);
        store.set_value("pin");
        let suggested = store.suggestion_untracked().expect("should suggest");
        assert_eq!(suggested.value, "Pineapple");
    }

    #[test]
    fn test_exact_match_produces_no_suggestion() {
        let store = store_with(&[item("a", "Apple")]);
        store.set_value("apple");
        assert!(store.suggestion_untracked().is_none());
    }

    #[test]
    fn test_no_suggestion_when_completion_disabled() {
        let store = store_with(&[item("a", "Apple")]);
        store.set_completion(CompletionMode::None);
        store.set_value("ap");
        assert!(store.suggestion_untracked().is_none());
    }

    #[test]
    fn test_no_suggestion_for_empty_input() {
        let store = store_with(&[item("a", "Apple")]);
        assert!(store.suggestion_untracked().is_none());
    }

    #[test]
    fn test_complete_value_keeps_typed_text() {
        let store = store_with(&[item("a", "Apple")]);
        store.set_value("Ap");
        store.complete_value("Apple".to_string());
        assert_eq!(store.value(), "Apple");
        assert_eq!(store.typed_value(), "Ap");
        // the suggestion is still derived from what was typed
        assert!(store.suggestion_untracked().is_some());
    }

    #[test]
    fn test_controlled_signals_stay_in_sync() {
        let open = RwSignal::new(false);
        let active_id = RwSignal::new(None::<String>);
        let items = RwSignal::new(Vec::new());
        let store = ComboboxStore::new(ComboboxStoreOptions {
            open: Some(open),
            active_id: Some(active_id),
            items: Some(items),
        });

        store.register_item(item("a", "Apple"));
        store.set_open(true);
        store.set_active_id(Some("a".to_string()));

        assert!(open.get_untracked());
        assert_eq!(active_id.get_untracked().as_deref(), Some("a"));
        assert_eq!(items.get_untracked().len(), 1);
    }
}
