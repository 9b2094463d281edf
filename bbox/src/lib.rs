//! Safe bounding box types and functions.

mod common;

pub use rect::*;
pub mod rect;

pub use tlbr::*;
pub mod tlbr;

pub use cycxhw::*;
pub mod cycxhw;

pub use hw::*;
pub mod hw;

pub use unit::*;
pub mod unit;

pub mod prelude {
    pub use crate::rect::{Rect, RectFloat, RectNum};
}
