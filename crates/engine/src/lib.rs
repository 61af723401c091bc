//! Plan and user stores for the trip planner.
//!
//! Two independently owned stores live here:
//!
//! - the plan store ([`PlanEngine`]): pins, whiteboards and trips, linked
//!   parent to child by arrays of ids;
//! - the user store ([`UserEngine`]): user profiles and trip memberships.
//!
//! Both are exposed through the traits in [`store`] so callers do not care
//! whether a store is local or remote.
use uuid::Uuid;

pub use avatar::{Avatar, merge_avatars, trip_avatars};
pub use change::ChangeType;
pub use error::EngineError;
pub use ops::{PlanEngine, PlanEngineBuilder, UserEngine, UserEngineBuilder};
pub use pins::{Expense, Pin, PinNew, PinUpdate};
pub use store::{
    MembershipStore, PinStore, PlanStore, ProfileStore, TripStore, UserStore, WhiteboardStore,
};
pub use trips::{Trip, TripNew, TripUpdate};
pub use user_trips::Membership;
pub use users::{User, UserNew};
pub use whiteboards::{CascadeReport, Whiteboard, WhiteboardUpdate};

mod avatar;
mod change;
mod error;
mod ops;
mod pins;
pub mod store;
mod trips;
mod user_trips;
mod users;
mod util;
mod whiteboards;

pub type ResultEngine<T> = Result<T, EngineError>;

/// Return `rows` in the order of `ids`, skipping ids without a row.
pub(crate) fn order_by_ids<T>(ids: &[Uuid], rows: Vec<T>, key: impl Fn(&T) -> Uuid) -> Vec<T> {
    let mut by_id: std::collections::HashMap<Uuid, T> =
        rows.into_iter().map(|row| (key(&row), row)).collect();
    ids.iter().filter_map(|id| by_id.remove(id)).collect()
}
