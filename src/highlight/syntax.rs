//! Syntax style definitions and registry.

use crate::style::Style;
use std::cell::RefCell;
use std::collections::HashMap;

/// Named style for syntax highlighting.
#[derive(Clone, Debug)]
pub struct SyntaxStyle {
    /// Unique identifier.
    pub id: u32,
    /// Human-readable name.
    pub name: String,
    /// The style to apply.
    pub style: Style,
}

impl SyntaxStyle {
    /// Create a new syntax style.
    #[must_use]
    pub fn new(id: u32, name: impl Into<String>, style: Style) -> Self {
        Self {
            id,
            name: name.into(),
            style,
        }
    }
}

/// Registry of syntax styles for a theme or language.
#[derive(Clone, Debug)]
pub struct SyntaxStyleRegistry {
    styles: HashMap<u32, SyntaxStyle>,
    by_name: HashMap<String, u32>,
    next_id: u32,
    merge_cache: RefCell<HashMap<Vec<u32>, Style>>,
}

impl Default for SyntaxStyleRegistry {
    /// IDs start at 1 — `0` is never a valid registered style ID.
    fn default() -> Self {
        Self {
            styles: HashMap::new(),
            by_name: HashMap::new(),
            next_id: 1,
            merge_cache: RefCell::new(HashMap::new()),
        }
    }
}

impl SyntaxStyleRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a style, returning a stable nonzero ID.
    ///
    /// Re-registering an existing name updates that name's definition in
    /// place and returns its existing ID, rather than allocating a new one.
    pub fn register(&mut self, name: impl Into<String>, style: Style) -> u32 {
        let name = name.into();
        let id = self.by_name.get(&name).copied().unwrap_or_else(|| {
            let id = self.next_id;
            self.next_id += 1;
            id
        });

        self.by_name.insert(name.clone(), id);
        self.styles.insert(id, SyntaxStyle::new(id, name, style));
        self.merge_cache.borrow_mut().clear();

        id
    }

    /// Register a style with a specific ID.
    pub fn register_with_id(&mut self, id: u32, name: impl Into<String>, style: Style) {
        let name = name.into();
        self.by_name.insert(name.clone(), id);
        self.styles.insert(id, SyntaxStyle::new(id, name, style));
        self.next_id = self.next_id.max(id.saturating_add(1));
        self.merge_cache.borrow_mut().clear();
    }

    /// Get a style by ID.
    #[must_use]
    pub fn get(&self, id: u32) -> Option<&SyntaxStyle> {
        self.styles.get(&id)
    }

    /// Get a style by name.
    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Option<&SyntaxStyle> {
        self.by_name.get(name).and_then(|id| self.styles.get(id))
    }

    /// Get style ID by name.
    #[must_use]
    pub fn id_for_name(&self, name: &str) -> Option<u32> {
        self.by_name.get(name).copied()
    }

    /// Get the style (Style struct) by ID.
    #[must_use]
    pub fn style(&self, id: u32) -> Option<Style> {
        self.styles.get(&id).map(|s| s.style)
    }

    /// Check if a style with the given ID exists.
    #[must_use]
    pub fn contains(&self, id: u32) -> bool {
        self.styles.contains_key(&id)
    }

    /// Get the number of registered styles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// Iterate over all styles.
    pub fn iter(&self) -> impl Iterator<Item = &SyntaxStyle> {
        self.styles.values()
    }

    /// Clear all styles.
    pub fn clear(&mut self) {
        self.styles.clear();
        self.by_name.clear();
        self.next_id = 1;
        self.merge_cache.borrow_mut().clear();
    }

    /// Fold a sequence of style IDs left-to-right: each later style's `fg`
    /// and `bg` override the running result when set, and attributes
    /// accumulate by bitwise OR. IDs with no registered style are skipped.
    /// An empty sequence yields [`Style::NONE`].
    ///
    /// Results are memoized by the exact ID sequence; call [`Self::clear_cache`]
    /// after mutating styles in place if stale merges would be observable
    /// (`register`/`register_with_id`/`clear` already invalidate the cache).
    #[must_use]
    pub fn merge_styles(&self, ids: &[u32]) -> Style {
        if let Some(style) = self.merge_cache.borrow().get(ids) {
            return *style;
        }

        let merged = ids
            .iter()
            .filter_map(|id| self.style(*id))
            .fold(Style::NONE, Style::merge);

        self.merge_cache
            .borrow_mut()
            .insert(ids.to_vec(), merged);
        merged
    }

    /// Empty the merge cache without discarding registered styles.
    pub fn clear_cache(&self) {
        self.merge_cache.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba;

    #[test]
    fn test_registry_basic() {
        let mut registry = SyntaxStyleRegistry::new();
        let id = registry.register("keyword", Style::fg(Rgba::BLUE).with_bold());

        assert_eq!(registry.len(), 1);
        assert!(registry.contains(id));
        assert_eq!(registry.get(id).unwrap().name, "keyword");
    }

    #[test]
    fn test_registry_by_name() {
        let mut registry = SyntaxStyleRegistry::new();
        registry.register("string", Style::fg(Rgba::GREEN));

        let style = registry.get_by_name("string").unwrap();
        assert_eq!(style.name, "string");
        assert_eq!(style.style.fg, Some(Rgba::GREEN));
    }

    #[test]
    fn test_registry_with_id() {
        let mut registry = SyntaxStyleRegistry::new();
        registry.register_with_id(100, "comment", Style::dim());

        assert!(registry.contains(100));
        assert_eq!(registry.id_for_name("comment"), Some(100));
    }

    #[test]
    fn first_registered_id_is_nonzero() {
        let mut registry = SyntaxStyleRegistry::new();
        let id = registry.register("keyword", Style::fg(Rgba::BLUE));
        assert_ne!(id, 0);
    }

    #[test]
    fn reregistering_a_name_updates_in_place_and_keeps_the_id() {
        let mut registry = SyntaxStyleRegistry::new();
        let id = registry.register("keyword", Style::fg(Rgba::BLUE));

        let id_again = registry.register("keyword", Style::fg(Rgba::RED));

        assert_eq!(id, id_again);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.style(id).unwrap().fg, Some(Rgba::RED));
    }

    #[test]
    fn merge_styles_folds_left_to_right() {
        let mut registry = SyntaxStyleRegistry::new();
        let base = registry.register("base", Style::fg(Rgba::BLUE).with_bold());
        let overlay = registry.register("overlay", Style::builder().bg(Rgba::RED).underline().build());

        let merged = registry.merge_styles(&[base, overlay]);

        assert_eq!(merged.fg, Some(Rgba::BLUE));
        assert_eq!(merged.bg, Some(Rgba::RED));
        assert!(merged.attributes.contains(crate::style::TextAttributes::BOLD));
        assert!(merged.attributes.contains(crate::style::TextAttributes::UNDERLINE));
    }

    #[test]
    fn merge_styles_of_empty_sequence_is_the_zero_style() {
        let registry = SyntaxStyleRegistry::new();
        assert_eq!(registry.merge_styles(&[]), Style::NONE);
    }

    #[test]
    fn merge_styles_is_memoized() {
        let mut registry = SyntaxStyleRegistry::new();
        let id = registry.register("keyword", Style::fg(Rgba::BLUE));

        let first = registry.merge_styles(&[id]);
        assert_eq!(registry.merge_cache.borrow().len(), 1);
        let second = registry.merge_styles(&[id]);

        assert_eq!(first, second);
        assert_eq!(registry.merge_cache.borrow().len(), 1);
    }
}
