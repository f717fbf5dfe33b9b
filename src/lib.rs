//! Verdant Log core library: every gameplay domain as a Bevy plugin.
//!
//! The binary crate (`main.rs`) runs these headlessly. A presentation layer
//! (scenes, UI, input) sits on top and talks to the core only through the
//! intent and notification events in `shared`.

pub mod shared;
pub mod catalog;
pub mod inventory;
pub mod progression;
pub mod calendar;
pub mod cultivation;
pub mod world;
pub mod encyclopedia;
pub mod notify;
pub mod save;
pub mod data;
