use std::any::{Any, TypeId};
use std::collections::HashMap;

/// Main-thread store for uploaded GPU objects.
///
/// Entries are keyed by a marker type `K` (normally the resource type that
/// uploaded them), so two resources can store values of the same type.
#[derive(Default)]
pub struct Assets {
    entries: HashMap<TypeId, Box<dyn Any>>,
}

impl Assets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `K`, returning `true` if it replaced an entry.
    pub fn insert<K: 'static, V: 'static>(&mut self, value: V) -> bool {
        self.entries
            .insert(TypeId::of::<K>(), Box::new(value))
            .is_some()
    }

    /// Returns the value under `K` if present and of type `V`.
    pub fn get<K: 'static, V: 'static>(&self) -> Option<&V> {
        self.entries.get(&TypeId::of::<K>())?.downcast_ref::<V>()
    }

    pub fn remove<K: 'static, V: 'static>(&mut self) -> Option<V> {
        let boxed = self.entries.remove(&TypeId::of::<K>())?;
        match boxed.downcast::<V>() {
            Ok(v) => Some(*v),
            Err(other) => {
                // Wrong value type requested; keep the entry.
                self.entries.insert(TypeId::of::<K>(), other);
                None
            }
        }
    }

    pub fn contains<K: 'static>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<K>())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
