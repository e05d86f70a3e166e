//! Layout engine: text wrapping and grid geometry.
//!
//! This module handles:
//! - Approximate-width word wrapping shared by sizing and rendering
//! - Column widths and row heights from content and user overrides
//! - Cumulative grid line offsets and span-aware cell rectangles
//! - Binary search hit testing for cells at a point

mod grid_layout;
pub mod wrap;

pub use grid_layout::{
    font_size_for_row, CellRect, GridLayout, MergeInfo, BASE_COL_WIDTH, BODY_FONT_SIZE,
    HEADER_FONT_SIZE, LINE_HEIGHT_FACTOR, MAX_AUTO_COL_WIDTH, MIN_AUTO_ROW_HEIGHT,
};
pub use wrap::{estimate_text_width, wrap_text};
