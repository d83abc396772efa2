//! Shared vocabulary between the Meridian simulation core and its collaborators.
//!
//! Everything in here is plain data: coordinates, ids, enumerated kinds, the
//! intents a caller may submit and the events the core emits after a state
//! change completes.

mod coord;
mod event;
mod ids;
mod intent;
mod kinds;
mod movement;
mod snapshot;
mod victory;

pub use crate::coord::*;
pub use crate::event::*;
pub use crate::ids::*;
pub use crate::intent::*;
pub use crate::kinds::*;
pub use crate::movement::*;
pub use crate::snapshot::*;
pub use crate::victory::*;
