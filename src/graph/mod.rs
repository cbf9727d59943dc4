//! Graph document loading: wire model, fetch and conversion into render collections.

pub mod convert;
mod error;
pub mod fetch;
pub mod model;
mod set;

pub use convert::DecodePolicy;
pub use fetch::load_graph;
pub use model::{Arrows, RenderGraph};
