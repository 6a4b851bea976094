//! Conference program domain models.
//!
//! Plain typed records describing the scheduling problem and its
//! solution. They carry no scheduling behavior beyond small helpers.
//!
//! | Record | Meaning |
//! |--------|---------|
//! | Paper | A talk to place, owned by a track |
//! | Presenter | A speaker with blackout slots |
//! | Room | A venue with capacity and equipment |
//! | Slot | A time interval in the day |
//! | Schedule | A set of (paper, room, slot) assignments |

mod paper;
mod presenter;
mod room;
mod schedule;
mod slot;
mod snapshot;

pub use paper::Paper;
pub use presenter::Presenter;
pub use room::Room;
pub use schedule::{Assignment, PaperMove, Schedule, ScheduleDiff, Violation, ViolationType};
pub use slot::Slot;
pub use snapshot::Snapshot;
