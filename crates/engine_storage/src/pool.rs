//! Dense, type-homogeneous component storage.
//!
//! A [`ComponentPool`] keeps every component of one type in a contiguous
//! `Vec`, with a parallel `Vec` of owning entities and a map from entity to
//! dense index. Removal swaps the last slot into the hole so the storage
//! never has gaps:
//!
//! ```text
//! remove(B)            components: [A, B, C, D]  ->  [A, D, C]
//!                      entities:   [a, b, c, d]  ->  [a, d, c]
//!                      index_of:   d: 3          ->  d: 1
//! ```
//!
//! The registry reaches pools through the type-erased [`ErasedPool`] trait
//! and downcasts to the concrete pool for typed operations.

use std::any::Any;
use std::collections::HashMap;
use std::collections::hash_map::Entry;

use tracing::trace;

use crate::component::{Component, ComponentTypeId};
use crate::entity::Entity;
use crate::error::{Result, StorageError};
use crate::view::ViewRow;

/// Dense storage for every component of type `T`.
#[derive(Debug)]
pub struct ComponentPool<T: Component> {
    /// Component values. `components[i]` belongs to `entities[i]`.
    components: Vec<T>,
    /// Owning entities, index-aligned with `components`.
    entities: Vec<Entity>,
    /// Dense index of each stored entity.
    index_of: HashMap<Entity, usize>,
}

impl<T: Component> ComponentPool<T> {
    /// Create a new empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an empty pool with room for `capacity` components.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            components: Vec::with_capacity(capacity),
            entities: Vec::with_capacity(capacity),
            index_of: HashMap::with_capacity(capacity),
        }
    }

    /// Store `value` for `entity` at the end of the dense arrays.
    ///
    /// # Errors
    ///
    /// [`StorageError::DuplicateComponent`] if the entity already has a
    /// component in this pool. The existing value is left untouched.
    pub fn add(&mut self, entity: Entity, value: T) -> Result<()> {
        match self.index_of.entry(entity) {
            Entry::Occupied(_) => Err(StorageError::DuplicateComponent {
                entity,
                component: T::type_name(),
            }),
            Entry::Vacant(slot) => {
                let index = self.components.len();
                slot.insert(index);
                self.entities.push(entity);
                self.components.push(value);
                trace!(%entity, component = T::type_name(), index, "component added");
                Ok(())
            }
        }
    }

    /// Remove and return the component stored for `entity`.
    ///
    /// The last slot is moved into the vacated one and its entity's index
    /// is rewritten, so the dense range stays contiguous.
    ///
    /// # Errors
    ///
    /// [`StorageError::EntityNotFound`] if the entity has no component here.
    pub fn remove(&mut self, entity: Entity) -> Result<T> {
        let index = self
            .index_of
            .remove(&entity)
            .ok_or(StorageError::EntityNotFound {
                entity,
                component: T::type_name(),
            })?;

        let value = self.components.swap_remove(index);
        self.entities.swap_remove(index);

        // The displaced entity now lives at `index`.
        if let Some(&moved) = self.entities.get(index) {
            self.index_of.insert(moved, index);
        }

        trace!(%entity, component = T::type_name(), index, "component removed");
        Ok(value)
    }

    /// Number of stored components.
    #[must_use]
    pub fn count(&self) -> usize {
        self.components.len()
    }

    /// Alias of [`count`](Self::count).
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns `true` if the pool stores nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Returns `true` if the pool stores a component for `entity`.
    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.index_of.contains_key(&entity)
    }

    /// The component stored for `entity`, if any.
    #[must_use]
    pub fn get(&self, entity: Entity) -> Option<&T> {
        self.index_of.get(&entity).map(|&i| &self.components[i])
    }

    /// Mutable access to the component stored for `entity`, if any.
    #[must_use]
    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        self.index_of.get(&entity).map(|&i| &mut self.components[i])
    }

    /// Stored entities in dense order.
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Stored components in dense order.
    #[must_use]
    pub fn components(&self) -> &[T] {
        &self.components
    }

    /// Iterate `(entity, component)` pairs in dense order.
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.entities.iter().copied().zip(self.components.iter())
    }

    pub(crate) fn components_mut(&mut self) -> &mut [T] {
        &mut self.components
    }

    /// Seed or narrow a view's rows with this pool.
    ///
    /// With no rows, one row is appended per stored entity and `slot` is set
    /// to its dense index. Otherwise every row whose entity is missing here
    /// is dropped (swap-remove, order not kept) and the survivors get `slot`
    /// bound to this pool's index for their entity.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is not a valid position in the row's index array.
    pub fn populate_or_filter<I>(&self, rows: &mut Vec<ViewRow<I>>, slot: usize)
    where
        I: AsMut<[usize]> + Default,
    {
        let width = I::default().as_mut().len();
        assert!(
            slot < width,
            "view slot {slot} out of range for {width} requested types"
        );

        if rows.is_empty() {
            rows.reserve(self.entities.len());
            for (index, &entity) in self.entities.iter().enumerate() {
                let mut indices = I::default();
                indices.as_mut()[slot] = index;
                rows.push(ViewRow { entity, indices });
            }
            return;
        }

        let mut i = 0;
        while i < rows.len() {
            match self.index_of.get(&rows[i].entity) {
                Some(&index) => {
                    rows[i].indices.as_mut()[slot] = index;
                    i += 1;
                }
                None => {
                    rows.swap_remove(i);
                }
            }
        }
    }

    /// Checks the dense-storage invariants: equal lengths, every mapped
    /// index points back at its entity, and indices cover `0..len`.
    #[must_use]
    pub fn check_invariants(&self) -> bool {
        let len = self.components.len();
        if self.entities.len() != len || self.index_of.len() != len {
            return false;
        }
        self.index_of
            .iter()
            .all(|(&entity, &index)| index < len && self.entities[index] == entity)
    }
}

impl<T: Component> Default for ComponentPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Every pool in a registry, keyed by component type.
pub type PoolMap = HashMap<ComponentTypeId, Box<dyn ErasedPool>>;

/// Look up the typed pool for `T`, if one has been created.
#[must_use]
pub fn typed_pool<T: Component>(pools: &PoolMap) -> Option<&ComponentPool<T>> {
    pools
        .get(&ComponentTypeId::of::<T>())
        .and_then(|pool| pool.as_any().downcast_ref::<ComponentPool<T>>())
}

/// Type-erased capabilities shared by every pool.
///
/// Only operations that do not mention `T` live here; typed access goes
/// through [`as_any`](ErasedPool::as_any) and a downcast to
/// [`ComponentPool<T>`].
pub trait ErasedPool: Any {
    /// The component type stored in this pool.
    fn component_type(&self) -> ComponentTypeId;

    /// Drop the entity's component if present. Returns `true` if removed.
    fn remove_entity(&mut self, entity: Entity) -> bool;

    /// Number of stored components.
    fn count(&self) -> usize;

    /// Returns `true` if the pool stores a component for `entity`.
    fn contains(&self, entity: Entity) -> bool;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> ErasedPool for ComponentPool<T> {
    fn component_type(&self) -> ComponentTypeId {
        ComponentTypeId::of::<T>()
    }

    fn remove_entity(&mut self, entity: Entity) -> bool {
        self.remove(entity).is_ok()
    }

    fn count(&self) -> usize {
        self.components.len()
    }

    fn contains(&self, entity: Entity) -> bool {
        self.index_of.contains_key(&entity)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
