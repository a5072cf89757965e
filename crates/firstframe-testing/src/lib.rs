//! Testing utilities for the firstframe crates.

pub mod recording;

pub use recording::*;

pub mod prelude {
    pub use crate::recording::*;
}
