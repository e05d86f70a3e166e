//! Data types for tables and their rendering configuration.

mod cell;
mod grid;
mod overrides;
mod selection;
mod style;

pub use cell::*;
pub(crate) use grid::count_u32;
pub use grid::Grid;
pub use overrides::*;
pub use selection::*;
pub use style::*;
