//! thud: tile-map collision resolution (axis-separated clip, notify, respond)

pub mod api;
pub mod collider;
pub mod sources;
pub mod types;

pub use crate::api::*;
pub use crate::collider::MapCollider;
pub use crate::sources::{FreeObjectSource, PropertyTileSource, UniformTileSource};
pub use crate::types::*;
