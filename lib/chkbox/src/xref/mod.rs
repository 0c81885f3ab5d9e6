//! Lookups between the numeric ids stored in sections and the values they stand for, plus the
//! rebuilders that grow those id spaces when the rich model introduces new values.

pub use self::cuwp::*;
pub use self::locations::*;
pub use self::strings::*;
pub use self::switches::*;

mod cuwp;
mod locations;
pub mod slots;
mod strings;
mod switches;
