//! # Entity-Component Store
//!
//! Generational entity handles, one sparse-set table per component type and
//! a position index that always mirrors the live `Position` components.

pub mod components;
pub mod entity;
pub mod store;

pub use components::*;
pub use entity::EntityId;
pub use store::*;
