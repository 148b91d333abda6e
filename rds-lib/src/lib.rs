#![doc = include_str!("../README.md")]

mod error;
mod options;

pub mod bits;
pub mod blocks;
pub mod group;

pub use error::{Error, Result};
pub use options::*;

pub(crate) mod prelude {
    pub use crate::error::{Error, Result};
}
