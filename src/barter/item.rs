//! Item identity helpers and the item catalog.
//!
//! Item ids show up with and without a namespace prefix (`Hytale:Gold_Bar` vs `Gold_Bar`)
//! and in inconsistent case, so every count and space check goes through [`ids_match`].

use std::collections::HashMap;

/// Stack size assumed for items the catalog does not know.
pub const DEFAULT_MAX_STACK: u32 = 64;

/// Drop everything up to and including the last `:`.
pub fn strip_namespace(item_id: &str) -> &str {
    match item_id.rfind(':') {
        Some(idx) => &item_id[idx + 1..],
        None => item_id,
    }
}

/// Tolerant id comparison: exact, then case-insensitive, then namespace-stripped
/// case-insensitive.
pub fn ids_match(a: &str, b: &str) -> bool {
    if a == b || a.eq_ignore_ascii_case(b) {
        return true;
    }
    strip_namespace(a).eq_ignore_ascii_case(strip_namespace(b))
}

/// Human-readable name: namespace removed, underscores to spaces, each word capitalised.
///
/// `Hytale:Ingredient_Bar_Copper` becomes `Ingredient Bar Copper`.
pub fn display_name(item_id: &str) -> String {
    if item_id.is_empty() {
        return "Unknown".to_string();
    }
    let mut out = String::with_capacity(item_id.len());
    let mut capitalize_next = true;
    for ch in strip_namespace(item_id).chars() {
        if ch == '_' {
            out.push(' ');
            capitalize_next = true;
        } else if capitalize_next {
            out.extend(ch.to_uppercase());
            capitalize_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// Source of per-item stacking rules.
pub trait ItemCatalog: Send + Sync {
    /// Maximum quantity a single slot may hold. Items with `1` never stack.
    fn max_stack(&self, item_id: &str) -> u32;
}

/// Fixed catalog: one default plus explicit per-item overrides.
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    default_max_stack: u32,
    overrides: HashMap<String, u32>,
}

impl StaticCatalog {
    pub fn new(default_max_stack: u32) -> Self {
        Self {
            default_max_stack: default_max_stack.max(1),
            overrides: HashMap::new(),
        }
    }

    pub fn with_item(mut self, item_id: impl Into<String>, max_stack: u32) -> Self {
        self.overrides.insert(item_id.into(), max_stack.max(1));
        self
    }

    pub fn from_overrides(default_max_stack: u32, overrides: &HashMap<String, u32>) -> Self {
        overrides
            .iter()
            .fold(Self::new(default_max_stack), |catalog, (id, max)| {
                catalog.with_item(id.clone(), *max)
            })
    }
}

impl Default for StaticCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_STACK)
    }
}

impl ItemCatalog for StaticCatalog {
    fn max_stack(&self, item_id: &str) -> u32 {
        if let Some(max) = self.overrides.get(item_id) {
            return *max;
        }
        self.overrides
            .iter()
            .find(|(id, _)| ids_match(id, item_id))
            .map(|(_, max)| *max)
            .unwrap_or(self.default_max_stack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_match_is_case_and_namespace_tolerant() {
        assert!(ids_match("Hytale:Gold_Bar", "gold_bar"));
        assert!(ids_match("GOLD_BAR", "gold_bar"));
        assert!(ids_match("Hytale:Gold_Bar", "Other:GOLD_BAR"));
        assert!(!ids_match("Gold_Bar", "Gold_Bar_Raw"));
    }

    #[test]
    fn strip_namespace_uses_last_separator() {
        assert_eq!(strip_namespace("a:b:Iron_Bar"), "Iron_Bar");
        assert_eq!(strip_namespace("Iron_Bar"), "Iron_Bar");
    }

    #[test]
    fn display_name_title_cases_words() {
        assert_eq!(display_name("Hytale:Ingredient_Bar_Copper"), "Ingredient Bar Copper");
        assert_eq!(display_name("oak_log"), "Oak Log");
        assert_eq!(display_name(""), "Unknown");
    }

    #[test]
    fn catalog_overrides_match_tolerantly() {
        let catalog = StaticCatalog::default().with_item("Weapon_Sword_Iron", 1);
        assert_eq!(catalog.max_stack("Weapon_Sword_Iron"), 1);
        assert_eq!(catalog.max_stack("hytale:weapon_sword_iron"), 1);
        assert_eq!(catalog.max_stack("Ingredient_Bar_Iron"), DEFAULT_MAX_STACK);
    }
}
