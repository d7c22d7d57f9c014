//! The legacy autocomplete widget surface.
//!
//! Consumers keep writing against the old component names and prop shapes;
//! every widget here translates its contract onto the engine primitives in
//! [`crate::kit`] and projects the engine's reactive state back into the
//! attribute vocabulary the legacy API promised.

use leptos::html;
use leptos::prelude::*;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

use crate::components::hooks::use_composed::{
    use_composed_event_handlers, use_composed_refs, AssignableRef, ElementSlot,
};
use crate::components::hooks::use_random::use_random_id_for;
use crate::kit::{self, ComboboxItem, ComboboxStoreOptions, CompletionMode};
use crate::util::{Booleanish, RenderChildren};

/// Attribute the engine writes on the completion remainder of item text.
const AUTOCOMPLETE_VALUE_ATTR: &str = "data-autocomplete-value";
/// Legacy attribute styling hooks expect on the suggested completion.
const SUGGESTED_VALUE_ATTR: &str = "data-suggested-value";

const POPOVER_MARKER_ATTR: &str = "data-combobox-popover";
const EXPANDED_ATTR: &str = "data-expanded";

/// Legacy-shaped state, republished by the root widget for every
/// descendant. All fields are read-only; state changes go through the
/// engine store, never through this bridge.
#[derive(Clone)]
pub struct ComboboxContext {
    pub combobox_id: String,
    pub open_on_focus: bool,
    pub on_select: Option<Callback<String>>,
    pub active_id: ReadSignal<Option<String>>,
    pub open: ReadSignal<bool>,
    pub items: ReadSignal<Vec<ComboboxItem>>,
}

/// Reads the legacy bridge published by [`Combobox`].
///
/// Panics outside of a `Combobox` subtree; that is a usage error at the
/// call site, not a runtime condition to recover from.
pub fn use_combobox_context() -> ComboboxContext {
    use_context::<ComboboxContext>()
        .expect("combobox widgets can only be used inside a <Combobox>")
}

/// Published by each option to its own subtree so [`ComboboxOptionText`]
/// can locate the option's root node.
#[derive(Clone, Copy)]
pub struct ComboboxOptionContext {
    pub node: ElementSlot,
}

/// State handed to a root render-function child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComboboxRenderState {
    pub id: String,
    pub is_expanded: bool,
    /// Value of the option the keyboard navigation currently points at.
    pub navigation_value: Option<String>,
}

/// State handed to an option render-function child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionRenderState {
    pub value: String,
    /// Position of the option's value among the mounted options; the first
    /// occurrence wins for duplicate values. `None` while the item list is
    /// still settling.
    pub index: Option<usize>,
}

pub type ComboboxChildren = RenderChildren<ComboboxRenderState>;
pub type OptionChildren = RenderChildren<OptionRenderState>;

/// Value of the item the active id points at, if it resolves. A transient
/// mismatch between the active id and the item list reads as `None`.
fn navigation_value(items: &[ComboboxItem], active_id: Option<&str>) -> Option<String> {
    let id = active_id?;
    items
        .iter()
        .find(|item| item.id == id)
        .map(|item| item.value.clone())
}

/// Reopening from a focus resets any stale active option first.
fn open_from_focus(store: &kit::ComboboxStore) {
    if !store.is_open_untracked() {
        store.set_open(true);
        store.set_active_id(None);
    }
}

/// The root widget. Owns `open`, `active_id` and `items`, hands those
/// exact cells to the engine store (controlled mode), and publishes the
/// legacy bridge.
#[component]
pub fn Combobox(
    #[prop(optional, into)] id: Option<String>,
    /// Open the popover as soon as the input receives focus.
    #[prop(default = false)]
    open_on_focus: bool,
    /// Called with the option's value when the user selects an option.
    #[prop(optional)]
    on_select: Option<Callback<String>>,
    #[prop(optional, into)] class: String,
    #[prop(optional)] children: ComboboxChildren,
    #[prop(optional)] node_ref: NodeRef<html::Div>,
) -> impl IntoView {
    let combobox_id = StoredValue::new(id.unwrap_or_else(|| use_random_id_for("combobox")));

    // The adapter is the state owner; the engine is told to use these
    // cells, so the bridge and the store can never disagree.
    let open = RwSignal::new(false);
    let active_id = RwSignal::new(None::<String>);
    let items = RwSignal::new(Vec::<ComboboxItem>::new());
    let store = kit::ComboboxStore::new(ComboboxStoreOptions {
        open: Some(open),
        active_id: Some(active_id),
        items: Some(items),
    });

    let ctx = ComboboxContext {
        combobox_id: combobox_id.get_value(),
        open_on_focus,
        on_select,
        active_id: active_id.read_only(),
        open: open.read_only(),
        items: items.read_only(),
    };

    let child_view = match children {
        RenderChildren::Unset => ().into_any(),
        RenderChildren::Static(content) => content.run(),
        RenderChildren::Render(render) => (move || {
            render(ComboboxRenderState {
                id: combobox_id.get_value(),
                is_expanded: open.get(),
                navigation_value: navigation_value(&items.get(), active_id.get().as_deref()),
            })
        })
        .into_any(),
    };

    view! {
        <div
            node_ref=node_ref
            id=combobox_id.get_value()
            class=class
            data-combobox=""
            data-expanded=move || open.get().then_some("")
        >
            <kit::Provider store=store>
                <leptos::context::Provider value=ctx>{child_view}</leptos::context::Provider>
            </kit::Provider>
        </div>
    }
}

/// The text input. Composes caller handlers with the legacy focus/click
/// behavior and maps the boolean-ish autocomplete props onto the engine's
/// completion mode.
#[component]
pub fn ComboboxInput(
    /// Enable inline completion. Boolean-ish; unset means enabled.
    #[prop(optional, into)]
    auto_complete: Booleanish,
    /// Deprecated spelling of `auto_complete`; honored only when the
    /// canonical prop is unset.
    #[prop(optional, into)]
    autocomplete: Booleanish,
    /// Select the input's entire text on click.
    #[prop(default = false)]
    select_on_click: bool,
    #[prop(optional)] on_focus: Option<Callback<web_sys::FocusEvent>>,
    #[prop(optional)] on_click: Option<Callback<web_sys::MouseEvent>>,
    #[prop(optional, into)] class: String,
    #[prop(optional, into)] placeholder: String,
    #[prop(optional)] node_ref: NodeRef<html::Input>,
) -> impl IntoView {
    let ctx = use_combobox_context();
    let store = kit::use_store();

    let auto_complete = auto_complete.or_alias(autocomplete).unwrap_or(true);
    let completion = if auto_complete {
        CompletionMode::Inline
    } else {
        CompletionMode::None
    };

    let open_on_focus = ctx.open_on_focus;
    let handle_focus = use_composed_event_handlers(vec![
        on_focus,
        Some(Callback::new(move |_ev: web_sys::FocusEvent| {
            if open_on_focus {
                open_from_focus(&store);
            }
        })),
    ]);

    let handle_click = use_composed_event_handlers(vec![
        on_click,
        Some(Callback::new(move |ev: web_sys::MouseEvent| {
            if select_on_click {
                // only nodes that support text selection
                let input = ev
                    .current_target()
                    .and_then(|target| target.dyn_into::<web_sys::HtmlInputElement>().ok());
                if let Some(input) = input {
                    input.select();
                }
            }
        })),
    ]);

    // The adapter owns when the popover opens (focus and typing), so the
    // engine's open-on-pointer-down is always off.
    view! {
        <kit::Input
            attr:data-combobox-input=""
            class=class
            placeholder=placeholder
            completion=completion
            show_on_mouse_down=false
            on_focus=Callback::new(handle_focus)
            on_click=Callback::new(handle_click)
            node_ref=node_ref
        />
    }
}

/// The floating list container. Expansion is mirrored as a data attribute;
/// actual visibility, dismissal and focus handling belong to the engine.
#[component]
pub fn ComboboxPopover(
    children: ChildrenFn,
    /// Render into a detached subtree at the document body.
    #[prop(default = false)]
    portal: bool,
    #[prop(optional, into)] class: String,
    #[prop(optional)] node_ref: NodeRef<html::Div>,
) -> impl IntoView {
    let ctx = use_combobox_context();
    let is_expanded = ctx.open;

    // The marker and the expanded flag are written straight onto the
    // rendered node so they survive portal relocation.
    Effect::new(move |_| {
        let Some(el) = node_ref.get() else {
            return;
        };
        let _ = el.set_attribute(POPOVER_MARKER_ATTR, "");
        if is_expanded.get() {
            let _ = el.set_attribute(EXPANDED_ATTR, "");
        } else {
            let _ = el.remove_attribute(EXPANDED_ATTR);
        }
    });

    view! {
        <kit::Popover portal=portal class=class node_ref=node_ref>
            {children()}
        </kit::Popover>
    }
}

/// Structural delegate around the engine's list primitive.
#[component]
pub fn ComboboxList(
    children: Children,
    /// Accepted for API compatibility. Selection persistence has no engine
    /// behavior mapped yet; the flag is currently inert.
    #[prop(default = false)]
    persist_selection: bool,
    #[prop(optional, into)] class: String,
) -> impl IntoView {
    let _ = persist_selection;

    view! {
        <kit::List attr:data-combobox-list="" class=class>
            {children()}
        </kit::List>
    }
}

/// One selectable option.
#[component]
pub fn ComboboxOption(
    /// The option's comparison and display key.
    #[prop(into)]
    value: String,
    #[prop(optional, into)] id: Option<String>,
    #[prop(optional)] children: OptionChildren,
    #[prop(optional)] on_click: Option<Callback<web_sys::MouseEvent>>,
    /// Caller-supplied handle to the option's root node.
    #[prop(optional)]
    node_ref: Option<AssignableRef>,
    #[prop(optional, into)] class: String,
) -> impl IntoView {
    let ctx = use_combobox_context();
    let id = StoredValue::new(id.unwrap_or_else(|| use_random_id_for("option")));

    // One node, two owners: our own slot (for the option text observer)
    // and whatever handle the caller passed in.
    let own_slot = ElementSlot::new();
    let dom_ref: NodeRef<html::Div> = NodeRef::new();
    let assign = use_composed_refs(vec![Some(AssignableRef::Slot(own_slot)), node_ref]);
    Effect::new(move |_| {
        if let Some(el) = dom_ref.get() {
            let el: web_sys::Element = el.into();
            assign(&el);
        }
    });

    let items = ctx.items;
    let value_for_index = value.clone();
    let index = Memo::new(move |_| kit::index_of_value(&items.get(), &value_for_index));

    let on_select = ctx.on_select;
    let value_for_select = value.clone();
    let handle_click = use_composed_event_handlers(vec![
        on_click,
        Some(Callback::new(move |_ev: web_sys::MouseEvent| {
            if let Some(on_select) = on_select {
                on_select.run(value_for_select.clone());
            }
        })),
    ]);

    let active_id = ctx.active_id;
    let is_active = Memo::new(move |_| active_id.get().as_deref() == Some(id.get_value().as_str()));

    let option_ctx = ComboboxOptionContext { node: own_slot };

    let child_view = match children {
        RenderChildren::Unset => view! { <ComboboxOptionText /> }.into_any(),
        RenderChildren::Static(content) => content.run(),
        RenderChildren::Render(render) => {
            let value = value.clone();
            (move || {
                render(OptionRenderState {
                    value: value.clone(),
                    index: index.get(),
                })
            })
            .into_any()
        }
    };

    view! {
        <kit::Item
            attr:data-combobox-option=""
            attr:data-highlighted=move || is_active.get().then_some("")
            id=id.get_value()
            value=value
            class=class
            on_click=Callback::new(handle_click)
            node_ref=dom_ref
        >
            <leptos::context::Provider value=option_ctx>{child_view}</leptos::context::Provider>
        </kit::Item>
    }
}

struct ProjectorHandle {
    observer: web_sys::MutationObserver,
    // kept alive for as long as the observer is connected
    _callback: Closure<dyn FnMut(js_sys::Array, web_sys::MutationObserver)>,
}

/// Copies the engine's suggestion attribute into the legacy vocabulary for
/// every element under `root`, and drops stale legacy attributes.
fn project_suggested_value(root: &web_sys::Element) {
    let Ok(descendants) = root.query_selector_all("*") else {
        return;
    };
    for index in 0..descendants.length() {
        let Some(node) = descendants.item(index) else {
            continue;
        };
        let Ok(el) = node.dyn_into::<web_sys::Element>() else {
            continue;
        };
        match el.get_attribute(AUTOCOMPLETE_VALUE_ATTR) {
            Some(value) => {
                let _ = el.set_attribute(SUGGESTED_VALUE_ATTR, &value);
            }
            None => {
                if el.has_attribute(SUGGESTED_VALUE_ATTR) {
                    let _ = el.remove_attribute(SUGGESTED_VALUE_ATTR);
                }
            }
        }
    }
}

/// The option's text, with the legacy suggested-completion attribute
/// restored.
///
/// The engine exposes the inline suggestion only as its own data attribute
/// on nodes it re-renders, so this widget watches the option subtree for
/// structural mutations and re-derives the legacy attribute on every
/// delivered batch. The projection is one-directional and eventually
/// consistent: it converges after the next batch, never feeds back into
/// the store, and is torn down before any rebind or unmount.
#[component]
pub fn ComboboxOptionText(#[prop(optional)] node_ref: Option<AssignableRef>) -> impl IntoView {
    let binding = use_context::<ComboboxOptionContext>()
        .expect("<ComboboxOptionText> can only be used inside a <ComboboxOption>");

    let own_ref: NodeRef<html::Span> = NodeRef::new();
    let assign = use_composed_refs(vec![node_ref]);
    Effect::new(move |_| {
        if let Some(el) = own_ref.get() {
            let el: web_sys::Element = el.into();
            assign(&el);
        }
    });

    let projector: StoredValue<Option<ProjectorHandle>, LocalStorage> = StoredValue::new_local(None);
    let disconnect = move || {
        if let Some(handle) = projector.try_update_value(|slot| slot.take()).flatten() {
            handle.observer.disconnect();
        }
    };

    Effect::new(move |_| {
        let bound = binding.node.get();
        // unconditional teardown before any rebind
        disconnect();
        let Some(root) = bound else {
            return;
        };

        // settle the current state, then follow mutation batches
        project_suggested_value(&root);

        let target = root.clone();
        let callback = Closure::<dyn FnMut(js_sys::Array, web_sys::MutationObserver)>::new(
            move |_records: js_sys::Array, _observer: web_sys::MutationObserver| {
                project_suggested_value(&target);
            },
        );
        let Ok(observer) = web_sys::MutationObserver::new(callback.as_ref().unchecked_ref()) else {
            return;
        };
        let init = web_sys::MutationObserverInit::new();
        init.set_child_list(true);
        init.set_subtree(true);
        if observer.observe_with_options(&root, &init).is_ok() {
            projector.set_value(Some(ProjectorHandle {
                observer,
                _callback: callback,
            }));
        }
    });

    on_cleanup(disconnect);

    view! { <kit::ItemValue node_ref=own_ref /> }
}
