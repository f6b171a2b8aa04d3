//! Marquee text primitives.
//!
//! Everything here is a pure function of its inputs. Scrolling is driven by a
//! caller-supplied `tick` (wall-clock seconds in practice), so no scroll
//! position is ever stored between renders.

mod format;
mod scroll;

pub use format::{progress_bar, progress_ratio, timecode};
pub use scroll::{scroll, truncate};
