//! Node placement and styling for rendered dependency graphs

pub mod engine;
pub mod force;
pub mod geometric;
pub mod hierarchical;
pub mod style;


pub use engine::{Canvas, LayoutEngine, Point};
pub use hierarchical::assign_levels;
pub use style::{EdgeStyle, category_color, edge_styles, shape_for, style_nodes};
