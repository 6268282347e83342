//! Chart aggregate: layout configuration, scales and the three pure services
//! (scale solver, geometry builder, interaction mapper).

pub mod geometry;
pub mod interaction;
pub mod scales;
pub mod solver;
pub mod value_objects;

pub use geometry::*;
pub use interaction::*;
pub use scales::*;
pub use solver::*;
pub use value_objects::*;
