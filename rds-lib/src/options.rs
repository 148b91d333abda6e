use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::prelude::*;

/// Encoding of the demodulated bits handed to the decoder.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum InputType {
    /// Text stream of `0` and `1` characters. Any other character is ignored.
    #[default]
    AsciiBits,
    /// Raw bytes, 8 bits per byte, most significant bit first.
    PackedBits,
}

impl FromStr for InputType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "ascii-bits" | "bits" => Ok(Self::AsciiBits),
            "packed-bits" | "packed" => Ok(Self::PackedBits),
            _ => Err(Error::InvalidInputType(s.to_string())),
        }
    }
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AsciiBits => write!(f, "ascii-bits"),
            Self::PackedBits => write!(f, "packed-bits"),
        }
    }
}

/// Decoder options.
///
/// The block synchronizer only stores these; they are available to bit sources and other
/// collaborators through [BlockStream::options](crate::blocks::BlockStream::options).
///
/// ```
/// use rds::{InputType, Options};
///
/// let opts = Options::builder().input_type(InputType::PackedBits).build();
/// assert_eq!(opts.input_type, InputType::PackedBits);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, TypedBuilder)]
pub struct Options {
    #[builder(default)]
    pub input_type: InputType,
}

impl Default for Options {
    fn default() -> Self {
        Self::builder().build()
    }
}
