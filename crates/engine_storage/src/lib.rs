//! # engine_storage
//!
//! In-memory entity/component storage and the query engine on top of it.
//!
//! This crate provides:
//!
//! - [`Component`] trait — the contract all stored data must satisfy.
//! - [`Entity`] — opaque UUID identifiers, minted by an [`EntityGenerator`].
//! - [`ComponentPool`] — dense per-type storage with swap-compaction removal.
//! - [`Registry`] — one pool per component type, plus query construction.
//! - [`View`] — the transient result of a multi-type query.
//!
//! ## Usage
//!
//! ```rust
//! use engine_storage::{Component, Registry};
//!
//! #[derive(Debug, PartialEq)]
//! struct Pos { x: u32, y: u32 }
//! struct Velocity { x: u32, y: u32 }
//!
//! impl Component for Pos {}
//! impl Component for Velocity {}
//!
//! let mut registry = Registry::new();
//! let e = registry.generate_entity();
//! registry.add_component(e, Pos { x: 1, y: 0 })?;
//! registry.add_component(e, Velocity { x: 3, y: 2 })?;
//!
//! registry.get_view::<(Pos, Velocity)>().execute(|_, pos, vel| {
//!     pos.x += vel.x;
//!     pos.y += vel.y;
//! });
//!
//! assert_eq!(registry.get_component::<Pos>(e), Some(&Pos { x: 4, y: 2 }));
//! # Ok::<(), engine_storage::StorageError>(())
//! ```
//!
//! The registry is single-threaded and does no locking. Callers sharing one
//! across threads must serialise every call themselves.

pub mod component;
pub mod entity;
pub mod error;
pub mod pool;
pub mod registry;
pub mod view;

pub use component::{Component, ComponentTypeId};
pub use entity::{Entity, EntityGenerator, UuidGenerator};
pub use error::{Result, StorageError};
pub use pool::{ComponentPool, ErasedPool};
pub use registry::{Registry, RegistryConfig};
pub use view::{Query, View, ViewRow};
