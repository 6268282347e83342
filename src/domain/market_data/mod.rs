//! Market data aggregate: candles, series and moving averages.

pub mod entities;
pub mod indicator_engine;
pub mod value_objects;

pub use entities::*;
pub use indicator_engine::*;
pub use value_objects::*;
