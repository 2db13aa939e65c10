//! The pool registry.
//!
//! [`Registry`] owns one [`ComponentPool`] per component type, created
//! lazily on first insert and kept until the registry is dropped. It also
//! owns the entity generator and builds [`View`]s.
//!
//! ## Query Strategy
//!
//! A view over `k` types is an intersection. The registry finds the
//! requested pool with the fewest components (the *driver*), seeds the rows
//! from it, then lets every other requested pool drop rows it does not
//! contain. That costs `O(n_min * k)` lookups instead of scanning the
//! largest pool.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::component::{Component, ComponentTypeId};
use crate::entity::{Entity, EntityGenerator, UuidGenerator};
use crate::error::{Result, StorageError};
use crate::pool::{ComponentPool, PoolMap, typed_pool};
use crate::view::{Query, View};

/// Registry configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Capacity reserved by each pool when it is first created.
    pub pool_capacity: usize,
    /// Seed for deterministic entity generation. `None` uses OS randomness.
    pub seed: Option<u64>,
}

impl RegistryConfig {
    /// Create the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve `capacity` slots in every new pool.
    #[must_use]
    pub fn with_pool_capacity(mut self, capacity: usize) -> Self {
        self.pool_capacity = capacity;
        self
    }

    /// Generate entities from a seeded RNG.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Owns every component pool and the entity generator.
pub struct Registry<G: EntityGenerator = UuidGenerator> {
    pools: PoolMap,
    generator: G,
    config: RegistryConfig,
}

impl Registry<UuidGenerator> {
    /// Create an empty registry with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create an empty registry with the given configuration.
    #[must_use]
    pub fn with_config(config: RegistryConfig) -> Self {
        let generator = match config.seed {
            Some(seed) => UuidGenerator::seeded(seed),
            None => UuidGenerator::new(),
        };
        Self {
            pools: HashMap::new(),
            generator,
            config,
        }
    }
}

impl Default for Registry<UuidGenerator> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: EntityGenerator> Registry<G> {
    /// Create an empty registry that draws entities from `generator`.
    ///
    /// The `seed` field of `config` is ignored; the generator is used as is.
    #[must_use]
    pub fn with_generator(generator: G, config: RegistryConfig) -> Self {
        Self {
            pools: HashMap::new(),
            generator,
            config,
        }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Mint a fresh entity.
    ///
    /// The entity owns nothing until a component is added for it.
    pub fn generate_entity(&mut self) -> Entity {
        self.generator.next_entity()
    }

    /// Attach `value` to `entity`, creating the pool for `T` if needed.
    ///
    /// # Errors
    ///
    /// [`StorageError::DuplicateComponent`] if the entity already has a `T`.
    pub fn add_component<T: Component>(&mut self, entity: Entity, value: T) -> Result<()> {
        self.get_or_create_pool::<T>().add(entity, value)
    }

    /// Detach and return the entity's `T` component.
    ///
    /// # Errors
    ///
    /// - [`StorageError::ComponentPoolNotFound`] if no `T` was ever added.
    /// - [`StorageError::EntityNotFound`] if the entity has no `T`.
    pub fn remove_component<T: Component>(&mut self, entity: Entity) -> Result<T> {
        self.pool_mut::<T>()
            .ok_or(StorageError::ComponentPoolNotFound {
                component: T::type_name(),
            })?
            .remove(entity)
    }

    /// Remove the entity from every pool that stores it.
    ///
    /// Pools without the entity are skipped. Returns how many components
    /// were removed; zero is not an error.
    pub fn remove_entity(&mut self, entity: Entity) -> usize {
        let removed = self
            .pools
            .values_mut()
            .map(|pool| pool.remove_entity(entity))
            .filter(|&removed| removed)
            .count();
        trace!(%entity, removed, "entity removed");
        removed
    }

    /// Build a view over every entity that owns all component types in `Q`.
    ///
    /// A type that has no pool yet counts as empty, giving an empty view.
    /// The view borrows the registry mutably until it is dropped.
    ///
    /// # Panics
    ///
    /// Panics if `Q` names the same component type more than once, since the
    /// view would hand out two mutable references to one component.
    pub fn get_view<Q: Query>(&mut self) -> View<'_, Q> {
        let types = Q::component_types();
        for (i, ty) in types.iter().enumerate() {
            assert!(
                !types[..i].contains(ty),
                "component {ty} requested more than once in a single view"
            );
        }

        let counts: Vec<usize> = types
            .iter()
            .map(|ty| self.pools.get(ty).map_or(0, |pool| pool.count()))
            .collect();

        // First minimum wins; a zero count is a valid driver.
        let Some((driver, &driver_count)) = counts
            .iter()
            .enumerate()
            .min_by_key(|&(_, &count)| count)
        else {
            return View::empty();
        };

        if driver_count == 0 {
            debug!(driver = %types[driver], "view driver is empty");
            return View::empty();
        }

        let mut rows = Vec::with_capacity(driver_count);
        Q::populate_slot(&self.pools, driver, &mut rows);
        for slot in (0..types.len()).filter(|&slot| slot != driver) {
            // An empty row set would be re-seeded by the next pool.
            if rows.is_empty() {
                break;
            }
            Q::populate_slot(&self.pools, slot, &mut rows);
        }

        debug!(
            types = ?types,
            driver = %types[driver],
            driver_count,
            rows = rows.len(),
            "view built"
        );

        if rows.is_empty() {
            return View::empty();
        }
        let slices = Q::borrow_slices(&mut self.pools);
        View::new(rows, slices)
    }

    /// The entity's `T` component, if present.
    #[must_use]
    pub fn get_component<T: Component>(&self, entity: Entity) -> Option<&T> {
        self.pool::<T>()?.get(entity)
    }

    /// Mutable access to the entity's `T` component, if present.
    #[must_use]
    pub fn get_component_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        self.pool_mut::<T>()?.get_mut(entity)
    }

    /// Returns `true` if the entity has a `T` component.
    #[must_use]
    pub fn has_component<T: Component>(&self, entity: Entity) -> bool {
        self.pool::<T>().is_some_and(|pool| pool.contains(entity))
    }

    /// Returns `true` if any pool stores a component for the entity.
    #[must_use]
    pub fn contains_entity(&self, entity: Entity) -> bool {
        self.pools.values().any(|pool| pool.contains(entity))
    }

    /// The pool for `T`, if one has been created.
    #[must_use]
    pub fn pool<T: Component>(&self) -> Option<&ComponentPool<T>> {
        typed_pool::<T>(&self.pools)
    }

    /// Number of `T` components stored. Zero when no pool exists.
    #[must_use]
    pub fn component_count<T: Component>(&self) -> usize {
        self.pool::<T>().map_or(0, ComponentPool::count)
    }

    /// Number of distinct component types that have a pool.
    #[must_use]
    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }

    /// Component types that have a pool, in no particular order.
    pub fn component_types(&self) -> impl Iterator<Item = ComponentTypeId> + '_ {
        self.pools.keys().copied()
    }

    fn pool_mut<T: Component>(&mut self) -> Option<&mut ComponentPool<T>> {
        self.pools
            .get_mut(&ComponentTypeId::of::<T>())
            .and_then(|pool| pool.as_any_mut().downcast_mut::<ComponentPool<T>>())
    }

    fn get_or_create_pool<T: Component>(&mut self) -> &mut ComponentPool<T> {
        let capacity = self.config.pool_capacity;
        self.pools
            .entry(ComponentTypeId::of::<T>())
            .or_insert_with(|| {
                debug!(component = T::type_name(), capacity, "creating component pool");
                Box::new(ComponentPool::<T>::with_capacity(capacity))
            })
            .as_any_mut()
            .downcast_mut::<ComponentPool<T>>()
            .expect("pool is always stored under its own component type")
    }
}

impl<G: EntityGenerator> std::fmt::Debug for Registry<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pools: Vec<(&'static str, usize)> = self
            .pools
            .values()
            .map(|pool| (pool.component_type().name(), pool.count()))
            .collect();
        f.debug_struct("Registry")
            .field("pools", &pools)
            .field("config", &self.config)
            .finish()
    }
}
