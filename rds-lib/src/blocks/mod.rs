//! Block synchronization and error correction.
//!
//! References:
//! * IEC 62106:2015 Specification of the Radio Data System (RDS)
//!     - Annex B: Error protection
//!     - Annex C: Group and block synchronization
//!
mod correction;
mod groups;
mod running_sum;
mod stream;
mod syndrome;

pub use correction::*;
pub use groups::*;
pub use running_sum::*;
pub use stream::*;
pub use syndrome::*;
