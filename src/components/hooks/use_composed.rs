use leptos::logging;
use leptos::prelude::*;
use web_sys::Element;

/// Holds a rendered DOM node.
///
/// `web_sys` handles are not `Send`, so the cell uses thread-local signal
/// storage; the slot itself is `Copy` and can travel through context. An
/// effect reading [`ElementSlot::get`] re-runs when the node rebinds.
#[derive(Clone, Copy)]
pub struct ElementSlot(RwSignal<Option<Element>, LocalStorage>);

impl ElementSlot {
    pub fn new() -> Self {
        Self(RwSignal::new_local(None))
    }

    /// Reactive read.
    pub fn get(&self) -> Option<Element> {
        self.0.get()
    }

    pub fn get_untracked(&self) -> Option<Element> {
        self.0.get_untracked()
    }

    pub fn set(&self, node: Option<Element>) {
        self.0.set(node);
    }
}

impl Default for ElementSlot {
    fn default() -> Self {
        Self::new()
    }
}

/// A handle that can receive a rendered node: a slot to store it in, or a
/// caller-supplied callback ref.
#[derive(Clone)]
pub enum AssignableRef {
    Slot(ElementSlot),
    Func(Callback<Element>),
}

impl From<ElementSlot> for AssignableRef {
    fn from(slot: ElementSlot) -> Self {
        Self::Slot(slot)
    }
}

impl From<Callback<Element>> for AssignableRef {
    fn from(callback: Callback<Element>) -> Self {
        Self::Func(callback)
    }
}

/// Assigns a node to a single handle.
///
/// A handle that can no longer accept the node (disposed slot, dropped
/// callback) is reported as a warning and skipped, so sibling handles in a
/// composition still receive the value.
pub fn assign_ref(target: &AssignableRef, node: &Element) {
    match target {
        AssignableRef::Slot(slot) => {
            if slot.0.try_set(Some(node.clone())).is_some() {
                logging::warn!("combobox: cannot assign node to a disposed element slot");
            }
        }
        AssignableRef::Func(callback) => {
            if callback.try_run(node.clone()).is_none() {
                logging::warn!("combobox: cannot assign node to a dropped ref callback");
            }
        }
    }
}

/// Fans one rendered node out to several ownership handles, so a widget's
/// internal slot and a caller-supplied ref both see the same element.
pub fn use_composed_refs(refs: Vec<Option<AssignableRef>>) -> impl Fn(&Element) + Clone {
    move |node: &Element| {
        for target in refs.iter().flatten() {
            assign_ref(target, node);
        }
    }
}

/// Composes caller-supplied and internal handlers for one event.
///
/// Handlers run in order; the first one that calls `prevent_default`
/// suppresses every handler after it.
pub fn use_composed_event_handlers<E>(handlers: Vec<Option<Callback<E>>>) -> impl Fn(E) + Clone
where
    E: AsRef<web_sys::Event> + Clone + 'static,
{
    move |event: E| {
        for handler in handlers.iter().flatten() {
            if event.as_ref().default_prevented() {
                break;
            }
            handler.run(event.clone());
        }
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    fn element() -> Element {
        document().create_element("div").expect("should create element")
    }

    #[wasm_bindgen_test]
    fn test_composed_refs_fan_out_to_every_handle() {
        let first = ElementSlot::new();
        let second = ElementSlot::new();
        let calls = RwSignal::new(0);
        let func = Callback::new(move |_node: Element| calls.update(|count| *count += 1));

        let assign = use_composed_refs(vec![
            Some(AssignableRef::Slot(first)),
            None,
            Some(AssignableRef::Slot(second)),
            Some(AssignableRef::Func(func)),
        ]);

        let node = element();
        assign(&node);

        assert_eq!(first.get_untracked(), Some(node.clone()));
        assert_eq!(second.get_untracked(), Some(node));
        assert_eq!(calls.get_untracked(), 1);
    }

    #[wasm_bindgen_test]
    fn test_composed_handlers_run_in_order() {
        let order: RwSignal<Vec<&'static str>> = RwSignal::new(vec![]);
        let theirs = Callback::new(move |_ev: web_sys::MouseEvent| {
            order.update(|seen| seen.push("theirs"));
        });
        let ours = Callback::new(move |_ev: web_sys::MouseEvent| {
            order.update(|seen| seen.push("ours"));
        });

        let composed = use_composed_event_handlers(vec![Some(theirs), Some(ours)]);
        let event = web_sys::MouseEvent::new("click").expect("should create event");
        composed(event);

        assert_eq!(order.get_untracked(), vec!["theirs", "ours"]);
    }

    #[wasm_bindgen_test]
    fn test_prevented_event_suppresses_later_handlers() {
        let order: RwSignal<Vec<&'static str>> = RwSignal::new(vec![]);
        let theirs = Callback::new(move |ev: web_sys::MouseEvent| {
            ev.prevent_default();
            order.update(|seen| seen.push("theirs"));
        });
        let ours = Callback::new(move |_ev: web_sys::MouseEvent| {
            order.update(|seen| seen.push("ours"));
        });

        let composed = use_composed_event_handlers(vec![Some(theirs), Some(ours)]);
        let init = web_sys::MouseEventInit::new();
        init.set_cancelable(true);
        let event = web_sys::MouseEvent::new_with_mouse_event_init_dict("click", &init)
            .expect("should create event");
        composed(event);

        assert_eq!(order.get_untracked(), vec!["theirs"]);
    }

    #[wasm_bindgen_test]
    fn test_missing_handlers_are_skipped() {
        let calls = RwSignal::new(0);
        let ours = Callback::new(move |_ev: web_sys::MouseEvent| calls.update(|count| *count += 1));

        let composed = use_composed_event_handlers(vec![None, Some(ours)]);
        let event = web_sys::MouseEvent::new("click").expect("should create event");
        composed(event);

        assert_eq!(calls.get_untracked(), 1);
    }
}
