//! TES overlap matching between two transcript sets.

pub mod engine;
pub mod index;

pub use engine::{compare, compute_overlap, scatter, Comparison};
pub use index::{TesIndex, WindowIndex};
