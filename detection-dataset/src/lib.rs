//! Indexable object detection datasets backed by an image directory and a
//! directory of VOC-style XML annotations.

mod common;

pub mod annotation;
pub mod config;
pub mod dataset;
pub mod error;
pub mod index;
pub mod render;
pub mod transform;

pub use annotation::*;
pub use config::*;
pub use dataset::*;
pub use error::*;
pub use index::*;
