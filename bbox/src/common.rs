pub use anyhow::{ensure, Result};
pub use num_traits::{Float, Num, NumCast, ToPrimitive, Zero};
pub use std::ops::{Deref, Mul};
