//! Canvas renderer: force-directed layout, drawing and pointer interaction.

mod component;
pub mod options;
mod render;
pub mod scale;
mod state;
mod types;

pub use component::ForceGraphCanvas;
pub use options::GraphOptions;
pub use types::Selection;
