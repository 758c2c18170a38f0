#![forbid(unsafe_code)]

//! Core: identifiers, overlay items, and errors shared by every overdeck crate.

pub mod error;
pub mod id;
pub mod item;

pub use error::{OverlayError, Result};
pub use id::{OverlayId, next_overlay_id};
pub use item::{ItemProps, KindState, OverlayItem, Visibility, transitions};
