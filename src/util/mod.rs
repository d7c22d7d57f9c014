use std::sync::Arc;

use leptos::children::{ToChildren, ViewFnOnce};
use leptos::prelude::*;
use strum::{AsRefStr, Display};

/// A boolean-like prop value.
///
/// The legacy API accepted native booleans as well as the string forms
/// `"true"` / `"false"`, and some props have a deprecated alias spelling.
/// Modeling the value as a tri-state keeps "the caller said nothing" apart
/// from "the caller said false", which the alias precedence rule needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Booleanish {
    True,
    False,
    #[default]
    Unset,
}

impl Booleanish {
    /// Parses the legacy string forms. Anything that is not exactly
    /// `"true"` or `"false"` counts as unset.
    pub fn parse(value: &str) -> Self {
        match value {
            "true" => Self::True,
            "false" => Self::False,
            _ => Self::Unset,
        }
    }

    pub fn is_set(self) -> bool {
        !matches!(self, Self::Unset)
    }

    /// Canonical-over-alias precedence: the alias is consulted only when
    /// the canonical prop is unset.
    pub fn or_alias(self, alias: Self) -> Self {
        if self.is_set() {
            self
        } else {
            alias
        }
    }

    /// Resolves to a concrete boolean, treating `Unset` as `default`.
    pub fn unwrap_or(self, default: bool) -> bool {
        match self {
            Self::True => true,
            Self::False => false,
            Self::Unset => default,
        }
    }
}

impl From<bool> for Booleanish {
    fn from(value: bool) -> Self {
        if value {
            Self::True
        } else {
            Self::False
        }
    }
}

impl From<&str> for Booleanish {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

/// Widget children that are either static content or a render function
/// receiving live widget state.
///
/// Static children flow in through the `view!` macro as usual; render
/// functions are passed explicitly, e.g.
/// `children=ComboboxChildren::render(|state| ...)`. `Unset` means the
/// caller supplied nothing and the widget falls back to its default
/// content.
pub enum RenderChildren<S> {
    Unset,
    Static(ViewFnOnce),
    Render(Arc<dyn Fn(S) -> AnyView + Send + Sync>),
}

impl<S> RenderChildren<S> {
    /// Wraps a render function receiving the widget state.
    pub fn render<F, V>(render: F) -> Self
    where
        F: Fn(S) -> V + Send + Sync + 'static,
        V: IntoView + 'static,
    {
        Self::Render(Arc::new(move |state| render(state).into_any()))
    }
}

impl<S> Default for RenderChildren<S> {
    fn default() -> Self {
        Self::Unset
    }
}

// Lets `view!` macro child nodes land in the `Static` variant.
impl<S, F, C> ToChildren<F> for RenderChildren<S>
where
    F: FnOnce() -> C + Send + 'static,
    C: IntoView + 'static,
{
    fn to_children(f: F) -> Self {
        Self::Static(ViewFnOnce::from(f))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booleanish_parse() {
        assert_eq!(Booleanish::parse("true"), Booleanish::True);
        assert_eq!(Booleanish::parse("false"), Booleanish::False);
        assert_eq!(Booleanish::parse(""), Booleanish::Unset);
        assert_eq!(Booleanish::parse("yes"), Booleanish::Unset);
    }

    #[test]
    fn test_booleanish_from_bool() {
        assert_eq!(Booleanish::from(true), Booleanish::True);
        assert_eq!(Booleanish::from(false), Booleanish::False);
    }

    #[test]
    fn test_canonical_wins_over_alias() {
        assert_eq!(
            Booleanish::True.or_alias(Booleanish::False),
            Booleanish::True
        );
        assert_eq!(
            Booleanish::False.or_alias(Booleanish::True),
            Booleanish::False
        );
    }

    #[test]
    fn test_alias_consulted_only_when_canonical_unset() {
        assert_eq!(
            Booleanish::Unset.or_alias(Booleanish::False),
            Booleanish::False
        );
        assert_eq!(
            Booleanish::Unset.or_alias(Booleanish::Unset),
            Booleanish::Unset
        );
    }

    #[test]
    fn test_unwrap_or_uses_default_only_for_unset() {
        assert!(Booleanish::True.unwrap_or(false));
        assert!(!Booleanish::False.unwrap_or(true));
        assert!(Booleanish::Unset.unwrap_or(true));
        assert!(!Booleanish::Unset.unwrap_or(false));
    }

    #[test]
    fn test_booleanish_display() {
        assert_eq!(Booleanish::True.to_string(), "true");
        assert_eq!(Booleanish::False.to_string(), "false");
        assert_eq!(Booleanish::Unset.as_ref(), "unset");
    }
}
