pub mod combobox;

// Re-export widget symbols so callers can `use combobox_compat::components::ui::Combobox` etc.
pub use combobox::*;
