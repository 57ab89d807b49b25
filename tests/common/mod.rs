#![allow(dead_code)]

mod assertions;
mod fixtures;

// Re-export
pub use assertions::{assert_bits_eq, assert_state_finite, assert_untouched, extrema};

pub use helpers::*;

pub use fixtures::*;
