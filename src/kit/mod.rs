//! The combobox engine: a controlled reactive store plus the rendering
//! primitives the compatibility widgets delegate to.
//!
//! Primitives are deliberately unopinionated about markup semantics beyond
//! accessibility wiring; the legacy-facing attribute vocabulary lives in
//! `components::ui::combobox`, not here.

pub mod store;

pub use store::{index_of_value, ComboboxItem, ComboboxStore, ComboboxStoreOptions, CompletionMode};

use leptos::html;
use leptos::portal::Portal;
use leptos::prelude::*;
use tw_merge::tw_merge;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

use crate::components::hooks::use_composed::use_composed_event_handlers;

/// Item state handed down to [`ItemValue`].
#[derive(Clone)]
struct ItemContext {
    id: String,
    value: String,
}

/// Reads the store provided by the nearest [`Provider`].
///
/// Panics outside of a provider subtree; that is a usage error at the call
/// site, not a runtime condition to recover from.
pub fn use_store() -> ComboboxStore {
    use_context::<ComboboxStore>()
        .expect("combobox primitives can only be used under a combobox Provider")
}

#[component]
pub fn Provider(store: ComboboxStore, children: Children) -> impl IntoView {
    view! { <leptos::context::Provider value=store>{children()}</leptos::context::Provider> }
}

/// The combobox text input. Keyboard navigation runs against the store;
/// `completion` controls inline ghost-text suggestions.
#[component]
pub fn Input(
    #[prop(optional, into)] class: String,
    #[prop(optional, into)] placeholder: String,
    #[prop(default = CompletionMode::default())] completion: CompletionMode,
    /// Open the popover when the pointer goes down on the input.
    #[prop(default = true)]
    show_on_mouse_down: bool,
    #[prop(optional)] on_focus: Option<Callback<web_sys::FocusEvent>>,
    #[prop(optional)] on_click: Option<Callback<web_sys::MouseEvent>>,
    #[prop(optional)] node_ref: NodeRef<html::Input>,
) -> impl IntoView {
    let store = use_store();
    store.set_completion(completion);

    Effect::new(move |_| {
        if let Some(el) = node_ref.get() {
            let el: web_sys::Element = el.into();
            store.base_element().set(Some(el));
        }
    });

    let handle_input = move |ev: web_sys::Event| {
        let typed = event_target_value(&ev);
        store.set_value(typed.clone());
        store.set_open(true);
        store.set_active_id(None);

        // Ghost completion only while the user is inserting characters;
        // deletions must not re-complete what was just removed.
        let inserting = ev
            .dyn_ref::<web_sys::InputEvent>()
            .map(|ev| ev.input_type().starts_with("insert"))
            .unwrap_or(false);
        if inserting {
            if let Some(suggested) = store.suggestion_untracked() {
                let input = event_target::<web_sys::HtmlInputElement>(&ev);
                let caret = typed.encode_utf16().count() as u32;
                let end = suggested.value.encode_utf16().count() as u32;
                input.set_value(&suggested.value);
                let _ = input.set_selection_range(caret, end);
                store.complete_value(suggested.value);
            }
        }
    };

    let handle_keydown = move |ev: web_sys::KeyboardEvent| match ev.key().as_str() {
        "ArrowDown" => {
            ev.prevent_default();
            if store.is_open_untracked() {
                store.move_active(1);
            } else {
                store.set_open(true);
                store.set_active_id(None);
            }
        }
        "ArrowUp" => {
            ev.prevent_default();
            if store.is_open_untracked() {
                store.move_active(-1);
            } else {
                store.set_open(true);
                store.set_active_id(None);
            }
        }
        "Home" => {
            if store.is_open_untracked() {
                ev.prevent_default();
                store.activate_first();
            }
        }
        "End" => {
            if store.is_open_untracked() {
                ev.prevent_default();
                store.activate_last();
            }
        }
        "Enter" => {
            if store.is_open_untracked() {
                if let Some(id) = store.active_id_untracked() {
                    ev.prevent_default();
                    // Route through the item's own click handler so caller
                    // handlers and selection compose the same way as a
                    // pointer click.
                    if let Some(el) = document().get_element_by_id(&id) {
                        if let Some(el) = el.dyn_ref::<web_sys::HtmlElement>() {
                            el.click();
                        }
                    }
                }
            }
        }
        "Escape" => {
            if store.is_open_untracked() {
                store.set_open(false);
            }
        }
        _ => {}
    };

    let handle_mousedown = move |_ev: web_sys::MouseEvent| {
        if show_on_mouse_down && !store.is_open_untracked() {
            store.set_open(true);
        }
    };

    let handle_focus = move |ev: web_sys::FocusEvent| {
        if let Some(callback) = &on_focus {
            callback.run(ev);
        }
    };

    let handle_click = move |ev: web_sys::MouseEvent| {
        if let Some(callback) = &on_click {
            callback.run(ev);
        }
    };

    let merged_class = tw_merge!(
        "flex h-9 w-full rounded-md border border-input bg-transparent px-3 py-1 text-sm outline-none placeholder:text-muted-foreground",
        class
    );
    let completion_token = completion.to_string();

    view! {
        <input
            node_ref=node_ref
            type="text"
            role="combobox"
            class=merged_class
            placeholder=placeholder
            autocomplete="off"
            spellcheck="false"
            data-autocomplete=completion_token.clone()
            aria-autocomplete=completion_token
            aria-controls=store.popover_id()
            aria-expanded=move || store.is_open().to_string()
            aria-activedescendant=move || store.active_id()
            prop:value=move || store.value()
            on:input=handle_input
            on:keydown=handle_keydown
            on:mousedown=handle_mousedown
            on:focus=handle_focus
            on:click=handle_click
        />
    }
}

/// The floating container below the input.
///
/// Visibility is attribute-driven (the subtree stays mounted so items keep
/// their registrations), dismissal is interaction-outside, and focus
/// returns to the input on close. Positioning is plain CSS relative to the
/// nearest positioned ancestor.
#[component]
pub fn Popover(
    children: ChildrenFn,
    #[prop(optional, into)] class: String,
    #[prop(default = false)] portal: bool,
    #[prop(optional)] node_ref: NodeRef<html::Div>,
) -> impl IntoView {
    let store = use_store();

    let outside_listener: StoredValue<Option<Closure<dyn FnMut(web_sys::Event)>>, LocalStorage> =
        StoredValue::new_local(None);

    let remove_outside_listener = move || {
        if let Some(listener) = outside_listener.try_update_value(|slot| slot.take()).flatten() {
            let _ = document()
                .remove_event_listener_with_callback("pointerdown", listener.as_ref().unchecked_ref());
        }
    };

    Effect::new(move |was_open: Option<bool>| {
        let open = store.is_open();
        if open {
            let listener = Closure::<dyn FnMut(web_sys::Event)>::new(move |ev: web_sys::Event| {
                let target = ev.target().and_then(|t| t.dyn_into::<web_sys::Element>().ok());
                let Some(target) = target else {
                    return;
                };
                let target_node: &web_sys::Node = target.unchecked_ref();
                let inside_popover = node_ref
                    .get_untracked()
                    .map(|el| el.contains(Some(target_node)))
                    .unwrap_or(false);
                let inside_base = store
                    .base_element()
                    .get_untracked()
                    .map(|el| el.contains(Some(target_node)))
                    .unwrap_or(false);
                if !inside_popover && !inside_base {
                    store.set_open(false);
                }
            });
            let _ = document()
                .add_event_listener_with_callback("pointerdown", listener.as_ref().unchecked_ref());
            outside_listener.set_value(Some(listener));
        } else {
            remove_outside_listener();
            if was_open == Some(true) {
                // non-modal: hand focus straight back to the input
                if let Some(base) = store.base_element().get_untracked() {
                    if let Some(base) = base.dyn_ref::<web_sys::HtmlElement>() {
                        let _ = base.focus();
                    }
                }
            }
        }
        open
    });

    on_cleanup(remove_outside_listener);

    let merged_class = tw_merge!(
        "absolute left-0 top-[calc(100%+4px)] z-50 min-w-full rounded-md border bg-card shadow-md",
        class
    );

    let content = move || {
        let merged_class = merged_class.clone();
        view! {
            <div
                node_ref=node_ref
                id=store.popover_id()
                class=merged_class
                data-state=move || if store.is_open() { "open" } else { "closed" }
                hidden=move || !store.is_open()
            >
                {children()}
            </div>
        }
    };

    if portal {
        view! { <Portal>{content()}</Portal> }.into_any()
    } else {
        content().into_any()
    }
}

/// Structural list container for item primitives.
#[component]
pub fn List(
    children: Children,
    #[prop(optional, into)] class: String,
    #[prop(default = "Suggestions".into(), into)] aria_label: String,
) -> impl IntoView {
    let merged_class = tw_merge!("max-h-[300px] overflow-y-auto p-1 scroll-py-1", class);

    view! {
        <div role="listbox" aria-label=aria_label class=merged_class>
            {children()}
        </div>
    }
}

/// One selectable option. Registers itself with the store while mounted.
#[component]
pub fn Item(
    #[prop(into)] id: String,
    #[prop(into)] value: String,
    children: Children,
    #[prop(optional, into)] class: String,
    #[prop(optional)] on_click: Option<Callback<web_sys::MouseEvent>>,
    #[prop(optional)] node_ref: NodeRef<html::Div>,
) -> impl IntoView {
    let store = use_store();

    store.register_item(ComboboxItem {
        id: id.clone(),
        value: value.clone(),
    });
    on_cleanup({
        let id = id.clone();
        move || store.unregister_item(&id)
    });

    let id_for_active = id.clone();
    let is_active = Memo::new(move |_| store.active_id() == Some(id_for_active.clone()));

    let id_for_select = id.clone();
    let handle_click = use_composed_event_handlers(vec![
        on_click,
        Some(Callback::new(move |_ev: web_sys::MouseEvent| {
            store.select_item(&id_for_select);
        })),
    ]);

    let id_for_hover = id.clone();
    let item_ctx = ItemContext {
        id: id.clone(),
        value: value.clone(),
    };

    let merged_class = tw_merge!(
        "relative flex cursor-default select-none items-center rounded-sm px-2 py-1.5 text-sm outline-none",
        class
    );

    view! {
        <div
            node_ref=node_ref
            id=id
            role="option"
            class=merged_class
            aria-selected=move || is_active.get().to_string()
            data-active-item=move || is_active.get().then_some("")
            on:pointerenter=move |_| store.set_active_id(Some(id_for_hover.clone()))
            on:click=handle_click
        >
            <leptos::context::Provider value=item_ctx>{children()}</leptos::context::Provider>
        </div>
    }
}

/// Renders the owning item's value.
///
/// When the item is the current suggestion for the typed text, the text is
/// split into the already-typed prefix (`data-user-value`) and the
/// completion remainder, which carries `data-autocomplete-value` set to the
/// full suggested value. The split re-renders as the user types, so the
/// span's child list changes on every keystroke; consumers that mirror the
/// attribute can watch for exactly those mutations.
#[component]
pub fn ItemValue(
    #[prop(optional, into)] class: String,
    #[prop(optional)] node_ref: NodeRef<html::Span>,
) -> impl IntoView {
    let store = use_store();
    let item = use_context::<ItemContext>()
        .expect("an item value primitive can only be used inside a combobox Item");

    let item_id = StoredValue::new(item.id);
    let is_suggested = Memo::new(move |_| {
        store
            .suggestion()
            .is_some_and(|suggested| suggested.id == item_id.get_value())
    });

    view! {
        <span node_ref=node_ref class=class>
            {move || {
                let shown = item.value.clone();
                if is_suggested.get() {
                    let split = store.typed_value().chars().count();
                    let prefix: String = shown.chars().take(split).collect();
                    let rest: String = shown.chars().skip(split).collect();
                    view! {
                        <span data-user-value="">{prefix}</span>
                        <span data-autocomplete-value=shown.clone()>{rest}</span>
                    }
                    .into_any()
                } else {
                    shown.into_any()
                }
            }}
        </span>
    }
}
