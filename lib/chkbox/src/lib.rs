pub use crate::archive::*;
pub use crate::chk::*;
pub use crate::codec::*;
pub use crate::context::*;
pub use crate::error::{ChkError, Entity, Result};

pub mod rich;
pub mod section;
pub mod trigger;
pub mod xref;

mod archive;
mod chk;
mod codec;
mod context;
mod editor;
mod error;

#[cfg(test)]
mod test;
