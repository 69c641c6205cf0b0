//! SQL composition: one filter model, two renderers, identifiers quoted and values escaped or bound.

mod builder;
pub mod filter;
pub mod params;
pub mod render;
pub use builder::*;
pub use filter::*;
pub use params::*;
pub use render::*;
