//! Player state: the snapshot model and the sources that produce it.
//!
//! Two backends are supported, MPD over its TCP protocol and any MPRIS
//! player on the session bus. Both expose the same three capabilities:
//! a point-in-time [`Snapshot`], the media file of the current track, and a
//! blocking feed of change notifications.

mod model;
mod mpd;
mod mpris;
mod source;
mod source_error;

pub use model::*;
pub use source::*;
pub use source_error::SourceError;
