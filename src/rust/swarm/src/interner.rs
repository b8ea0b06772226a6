use rustc_hash::FxHashMap;
use std::borrow::Borrow;
use std::hash::Hash;

/// Dense handle for an interned element. Handles are assigned in
/// registration order and never reused.
pub type ElementId = u32;

/// Handle for the entry appended after `len` existing ones.
///
/// # Panics
/// If `len` has run past the `u32` handle space. Handles would otherwise
/// wrap and collide with live ones.
pub(crate) fn next_handle(len: usize) -> u32 {
    match u32::try_from(len) {
        Ok(handle) => handle,
        Err(_) => panic!("handle space exhausted: {len} entries exceed u32"),
    }
}

/// Interns caller-supplied element identifiers into stable `u32` handles.
#[derive(Debug, Clone)]
pub struct Interner<E> {
    elements: Vec<E>,
    element_to_id: FxHashMap<E, ElementId>,
}

impl<E> Default for Interner<E>
where
    E: Clone + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Interner<E>
where
    E: Clone + Eq + Hash,
{
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
            element_to_id: FxHashMap::default(),
        }
    }

    /// Create interner with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            elements: Vec::with_capacity(capacity),
            element_to_id: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Intern an element and return its handle. Interning a known element
    /// returns the existing handle and allocates nothing.
    ///
    /// # Panics
    /// When a new element would need a handle beyond `u32::MAX`.
    pub fn intern<Q>(&mut self, element: &Q) -> ElementId
    where
        E: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = E> + ?Sized,
    {
        if let Some(&id) = self.element_to_id.get(element) {
            return id;
        }
        let id = next_handle(self.elements.len());
        let owned = element.to_owned();
        self.elements.push(owned.clone());
        self.element_to_id.insert(owned, id);
        id
    }

    /// Look up the handle of an already interned element.
    pub fn get<Q>(&self, element: &Q) -> Option<ElementId>
    where
        E: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.element_to_id.get(element).copied()
    }

    /// Get the element for a given handle.
    pub fn resolve(&self, id: ElementId) -> Option<&E> {
        self.elements.get(id as usize)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_handle_covers_u32_range() {
        assert_eq!(next_handle(0), 0);
        assert_eq!(next_handle(u32::MAX as usize), u32::MAX);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    #[should_panic(expected = "handle space exhausted")]
    fn test_next_handle_refuses_to_wrap() {
        next_handle(u32::MAX as usize + 1);
    }

    #[test]
    fn test_intern_is_idempotent() {
        let mut interner: Interner<String> = Interner::new();

        let id1 = interner.intern("hello");
        let id2 = interner.intern("world");
        let id3 = interner.intern("hello");

        assert_eq!(id1, 0);
        assert_eq!(id2, 1);
        assert_eq!(id3, 0);
        assert_eq!(interner.len(), 2);

        assert_eq!(interner.resolve(id1).map(String::as_str), Some("hello"));
        assert_eq!(interner.resolve(id2).map(String::as_str), Some("world"));
        assert_eq!(interner.resolve(99), None);
    }

    #[test]
    fn test_get_does_not_register() {
        let mut interner: Interner<String> = Interner::with_capacity(4);
        assert!(interner.is_empty());
        assert_eq!(interner.get("ghost"), None);
        assert!(interner.is_empty());

        let id = interner.intern("ghost");
        assert_eq!(interner.get("ghost"), Some(id));
    }

    #[test]
    fn test_non_string_elements() {
        let mut interner: Interner<i64> = Interner::new();
        let a = interner.intern(&-90);
        let b = interner.intern(&100);
        assert_ne!(a, b);
        assert_eq!(interner.intern(&-90), a);
        assert_eq!(interner.resolve(b), Some(&100));
    }
}
