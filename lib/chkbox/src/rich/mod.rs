//! The enriched model: every cross-reference a section holds by id is replaced with the value
//! it names.

pub use self::cuwp::*;
pub use self::location::*;
pub use self::references::*;
pub use self::sections::*;
pub use self::string::*;
pub use self::switch::*;
pub use self::units::*;

mod cuwp;
mod location;
mod references;
mod sections;
mod string;
mod switch;
mod units;
