//! Model loads and element loads

mod element;
mod frame_load;

pub use element::ElementLoad;
pub use frame_load::{Load, LoadId, LoadKind, LoadVector};
