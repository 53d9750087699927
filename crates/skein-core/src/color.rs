//! Deterministic shade assignment for logger hierarchies.
//!
//! Every logger in a tree shares the shade of its root ancestor. Sequential
//! root ids are spread `SHADE_STEP` shades apart so sibling trees stay
//! visually distinct.

use crate::types::LoggerId;

/// Number of shades in the rendering palette.
pub const SHADE_COUNT: usize = 24;
pub const SHADE_STEP: u64 = 5;
pub const SHADE_OFFSET: u64 = 2;

/// Shade index used for records whose logger never registered.
pub const DEFAULT_COLOR_INDEX: usize = 0;

/// `(base_id * SHADE_STEP + SHADE_OFFSET) mod SHADE_COUNT`.
///
/// The id is reduced before multiplying so the full `u64` range is accepted
/// without overflow; the result is identical by modular arithmetic.
pub fn color_index(base_logger_id: LoggerId) -> usize {
    let shades = SHADE_COUNT as u64;
    (((base_logger_id % shades) * SHADE_STEP + SHADE_OFFSET) % shades) as usize
}
