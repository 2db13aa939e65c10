//! Views: materialised results of multi-type queries.
//!
//! A [`View`] is built by [`Registry::get_view`](crate::Registry::get_view)
//! and holds one [`ViewRow`] per entity that owns every requested component
//! type. Each row stores the entity and, per requested type, the dense index
//! of that entity's component inside the matching pool.
//!
//! The view mutably borrows the registry for its whole lifetime, so no pool
//! can be added to, removed from, or otherwise mutated while a view exists:
//!
//! ```compile_fail
//! use engine_storage::{Component, Registry};
//!
//! struct Pos(i32);
//! impl Component for Pos {}
//!
//! let mut registry = Registry::new();
//! let e = registry.generate_entity();
//! registry.add_component(e, Pos(0)).unwrap();
//!
//! let mut view = registry.get_view::<(Pos,)>();
//! registry.remove_entity(e); // rejected: `registry` is borrowed by `view`
//! view.execute(|_, pos| pos.0 += 1);
//! ```

use std::collections::HashSet;
use std::hash::BuildHasher;

use crate::component::{Component, ComponentTypeId};
use crate::entity::Entity;
use crate::pool::{ComponentPool, PoolMap, typed_pool};

/// One row of a [`View`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewRow<I> {
    /// The matched entity.
    pub entity: Entity,
    /// Dense index into each requested pool, in request order.
    pub(crate) indices: I,
}

impl<I: AsRef<[usize]>> ViewRow<I> {
    /// Dense index of this row's component in the pool at position `slot`
    /// of the request.
    #[must_use]
    pub fn index(&self, slot: usize) -> Option<usize> {
        self.indices.as_ref().get(slot).copied()
    }
}

/// A tuple of component types that can be requested together.
///
/// Implemented for tuples of one to eight [`Component`] types.
pub trait Query: 'static {
    /// Per-row index storage, one slot per requested type.
    type Indices: Copy + Default + AsRef<[usize]> + AsMut<[usize]>;

    /// Mutable dense component slices of every requested pool.
    type Slices<'w>;

    /// Requested component types, in request order.
    fn component_types() -> Vec<ComponentTypeId>;

    /// Runs [`ComponentPool::populate_or_filter`] for the pool at `slot`.
    ///
    /// A missing pool matches nothing and clears the rows.
    fn populate_slot(pools: &PoolMap, slot: usize, rows: &mut Vec<ViewRow<Self::Indices>>);

    /// Borrows the component slices of every requested pool at once.
    ///
    /// Returns `None` if any requested pool does not exist.
    fn borrow_slices(pools: &mut PoolMap) -> Option<Self::Slices<'_>>;
}

/// The transient result of a query.
///
/// Valid for exactly one query cycle: it is created from `&mut Registry`
/// and must be dropped before the registry can be touched again.
pub struct View<'w, Q: Query> {
    rows: Vec<ViewRow<Q::Indices>>,
    slices: Option<Q::Slices<'w>>,
}

impl<'w, Q: Query> View<'w, Q> {
    pub(crate) fn new(rows: Vec<ViewRow<Q::Indices>>, slices: Option<Q::Slices<'w>>) -> Self {
        if slices.is_none() {
            return Self::empty();
        }
        Self { rows, slices }
    }

    pub(crate) fn empty() -> Self {
        Self {
            rows: Vec::new(),
            slices: None,
        }
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the view matched nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The rows in current storage order.
    #[must_use]
    pub fn rows(&self) -> &[ViewRow<Q::Indices>] {
        &self.rows
    }

    /// Matched entities in current storage order.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.rows.iter().map(|row| row.entity)
    }

    /// Returns `true` if `entity` has a row in this view.
    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.rows.iter().any(|row| row.entity == entity)
    }

    /// Keep rows whose entity is in `set` (`include == true`) or is not in
    /// `set` (`include == false`).
    ///
    /// Dropped rows are swap-removed, so row order is not preserved.
    pub fn and_or_exclude<S: BuildHasher>(&mut self, set: &HashSet<Entity, S>, include: bool) {
        let mut i = 0;
        while i < self.rows.len() {
            if set.contains(&self.rows[i].entity) == include {
                i += 1;
            } else {
                self.rows.swap_remove(i);
            }
        }
    }
}

impl<Q: Query> std::fmt::Debug for View<'_, Q> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("View")
            .field("types", &Q::component_types())
            .field("rows", &self.rows.len())
            .finish()
    }
}

macro_rules! impl_query {
    ($n:literal; $($T:ident $slice:ident $idx:tt),+) => {
        impl<$($T: Component),+> Query for ($($T,)+) {
            type Indices = [usize; $n];
            type Slices<'w> = ($(&'w mut [$T],)+);

            fn component_types() -> Vec<ComponentTypeId> {
                vec![$(ComponentTypeId::of::<$T>()),+]
            }

            fn populate_slot(
                pools: &PoolMap,
                slot: usize,
                rows: &mut Vec<ViewRow<Self::Indices>>,
            ) {
                $(
                    if slot == $idx {
                        match typed_pool::<$T>(pools) {
                            Some(pool) => pool.populate_or_filter(rows, $idx),
                            None => rows.clear(),
                        }
                        return;
                    }
                )+
            }

            fn borrow_slices(pools: &mut PoolMap) -> Option<Self::Slices<'_>> {
                $(let mut $slice: Option<&mut [$T]> = None;)+
                for (key, pool) in pools.iter_mut() {
                    $(
                        if *key == ComponentTypeId::of::<$T>() {
                            $slice = pool
                                .as_any_mut()
                                .downcast_mut::<ComponentPool<$T>>()
                                .map(|p| p.components_mut());
                            continue;
                        }
                    )+
                }
                Some(($($slice?,)+))
            }
        }

        impl<'w, $($T: Component),+> View<'w, ($($T,)+)> {
            /// Call `callback` once per row with the entity and a mutable reference
            /// to each requested component, in request order.
            ///
            /// Rows are visited in the view's current storage order.
            pub fn execute<Callback>(&mut self, mut callback: Callback)
            where
                Callback: FnMut(Entity, $(&mut $T),+),
            {
                let Some(($($slice,)+)) = self.slices.as_mut() else {
                    return;
                };
                for row in &self.rows {
                    callback(row.entity, $(&mut $slice[row.indices[$idx]]),+);
                }
            }
        }
    };
}

impl_query!(1; A a 0);
impl_query!(2; A a 0, B b 1);
impl_query!(3; A a 0, B b 1, C c 2);
impl_query!(4; A a 0, B b 1, C c 2, D d 3);
impl_query!(5; A a 0, B b 1, C c 2, D d 3, E e 4);
impl_query!(6; A a 0, B b 1, C c 2, D d 3, E e 4, F f 5);
impl_query!(7; A a 0, B b 1, C c 2, D d 3, E e 4, F f 5, G g 6);
impl_query!(8; A a 0, B b 1, C c 2, D d 3, E e 4, F f 5, G g 6, H h 7);
