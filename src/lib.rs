//! Legacy combobox (autocomplete) widgets on top of a store-driven Leptos
//! combobox engine.
//!
//! The crate has two layers:
//!
//! - [`kit`]: the engine, a controlled reactive store (`open`,
//!   `active_id`, `items`) plus input/popover/list/item primitives that own
//!   keyboard navigation, inline-suggestion computation and popover
//!   dismissal.
//! - [`components::ui::combobox`]: the compatibility surface, the old
//!   widget names and prop shapes (`Combobox`, `ComboboxInput`,
//!   `ComboboxPopover`, `ComboboxList`, `ComboboxOption`,
//!   `ComboboxOptionText`), translated call by call onto the engine and
//!   projected back into the legacy attribute vocabulary (`data-expanded`,
//!   `data-highlighted`, `data-suggested-value`).
//!
//! ```ignore
//! use combobox_compat::{Combobox, ComboboxInput, ComboboxList, ComboboxOption, ComboboxPopover};
//! use leptos::prelude::*;
//!
//! view! {
//!     <Combobox open_on_focus=true on_select=Some(Callback::new(|value: String| { /* ... */ }))>
//!         <ComboboxInput />
//!         <ComboboxPopover>
//!             <ComboboxList>
//!                 <ComboboxOption value="Apple" />
//!                 <ComboboxOption value="Banana" />
//!             </ComboboxList>
//!         </ComboboxPopover>
//!     </Combobox>
//! }
//! ```

pub mod components;
pub mod kit;
pub mod util;

// Browser-based unit tests live next to the modules they cover; the shared
// suite is configured once, here.
#[cfg(all(test, target_arch = "wasm32"))]
wasm_bindgen_test::wasm_bindgen_test_configure!(run_in_browser);

pub use components::hooks::use_composed::{
    assign_ref, use_composed_event_handlers, use_composed_refs, AssignableRef, ElementSlot,
};
pub use components::hooks::use_random::{use_random_id, use_random_id_for};
pub use components::ui::combobox::{
    use_combobox_context, Combobox, ComboboxChildren, ComboboxContext, ComboboxInput, ComboboxList,
    ComboboxOption, ComboboxOptionContext, ComboboxOptionText, ComboboxPopover,
    ComboboxRenderState, OptionChildren, OptionRenderState,
};
pub use kit::{ComboboxItem, ComboboxStore, ComboboxStoreOptions, CompletionMode};
pub use util::{Booleanish, RenderChildren};
