//! Page-scoped context values.
//!
//! Widgets that need to cooperate (for example, so that only one popover is
//! open at a time) share a value stored here, keyed by its type. Unlike a
//! global, the map lives on the page, so two pages never interfere.

use std::{
    any::{Any, TypeId},
    sync::Arc,
};

use rustc_hash::FxHashMap as HashMap;

/// Typed map of shared values.
#[derive(Default)]
pub struct ContextMap {
    values: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl std::fmt::Debug for ContextMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextMap")
            .field("len", &self.values.len())
            .finish()
    }
}

impl ContextMap {
    /// Stores `value`, replacing any previous value of the same type.
    pub fn provide<T>(&mut self, value: T)
    where
        T: Send + Sync + 'static,
    {
        self.values.insert(TypeId::of::<T>(), Arc::new(value));
    }

    /// Reads the value of type `T`, if provided.
    pub fn get<T>(&self) -> Option<Arc<T>>
    where
        T: Send + Sync + 'static,
    {
        self.values
            .get(&TypeId::of::<T>())
            .and_then(|value| Arc::downcast::<T>(value.clone()).ok())
    }

    /// Reads the value of type `T`, inserting `T::default()` first when
    /// nothing was provided, so later readers share the same instance.
    pub fn get_or_default<T>(&mut self) -> Arc<T>
    where
        T: Default + Send + Sync + 'static,
    {
        if let Some(value) = self.get::<T>() {
            return value;
        }
        let value = Arc::new(T::default());
        self.values.insert(TypeId::of::<T>(), value.clone());
        value
    }
}
