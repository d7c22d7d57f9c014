use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};

const PREFIX: &str = "cbx"; // Must NOT contain "/" or "-"

/// Stable widget identifier, generated once per call site.
///
/// Widgets that accept an `id` prop fall back to this when the caller
/// supplies none; the result is valid as both an element id and an
/// `aria-activedescendant` target.
pub fn use_random_id() -> String {
    format!("_{PREFIX}_{}", generate_hash())
}

/// Same as [`use_random_id`], prefixed with the widget kind for easier
/// DOM inspection.
pub fn use_random_id_for(element: &str) -> String {
    format!("{}_{PREFIX}_{}", element, generate_hash())
}

static COUNTER: AtomicUsize = AtomicUsize::new(1);

fn generate_hash() -> u64 {
    let mut hasher = DefaultHasher::new();
    let counter = COUNTER.fetch_add(1, Ordering::SeqCst);
    counter.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        let a = use_random_id();
        let b = use_random_id();
        assert_ne!(a, b);
    }

    #[test]
    fn test_id_for_carries_the_widget_kind() {
        let id = use_random_id_for("option");
        assert!(id.starts_with("option_"));
    }
}
