//! Store traits.
//!
//! The orchestrator only talks to these traits, so a store can live in the
//! same process ([`PlanEngine`], [`UserEngine`]) or behind an RPC client.
//!
//! Batch lookups (`find_*`) return rows in the order of the requested ids and
//! silently skip ids that do not exist.
//!
//!  [`PlanEngine`]: crate::PlanEngine
//!  [`UserEngine`]: crate::UserEngine
use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    CascadeReport, Membership, Pin, PinNew, PinUpdate, ResultEngine, Trip, TripNew, TripUpdate,
    User, UserNew, Whiteboard, WhiteboardUpdate,
};

#[async_trait]
pub trait PinStore: Send + Sync {
    async fn create_pin(&self, pin: PinNew) -> ResultEngine<Uuid>;
    async fn get_pin(&self, id: Uuid) -> ResultEngine<Pin>;
    async fn find_pins(&self, ids: &[Uuid]) -> ResultEngine<Vec<Pin>>;
    /// Pins listing `user_id` among their participants.
    async fn find_pins_by_participant(&self, user_id: Uuid) -> ResultEngine<Vec<Pin>>;
    async fn update_pin(&self, id: Uuid, update: PinUpdate) -> ResultEngine<Pin>;
    async fn delete_pin(&self, id: Uuid) -> ResultEngine<()>;
    /// Returns how many pins were removed; zero is not an error.
    async fn delete_pins(&self, ids: &[Uuid]) -> ResultEngine<u64>;
}

#[async_trait]
pub trait WhiteboardStore: Send + Sync {
    async fn create_whiteboard(&self, pin_id: Uuid, day: i32) -> ResultEngine<Uuid>;
    async fn get_whiteboard(&self, id: Uuid) -> ResultEngine<Whiteboard>;
    async fn find_whiteboards(&self, ids: &[Uuid]) -> ResultEngine<Vec<Whiteboard>>;
    async fn update_whiteboard(
        &self,
        id: Uuid,
        update: WhiteboardUpdate,
    ) -> ResultEngine<Whiteboard>;
    async fn delete_whiteboard(&self, id: Uuid) -> ResultEngine<()>;
    /// Delete the whiteboards and every pin they reference.
    async fn delete_whiteboards_cascade(&self, ids: &[Uuid]) -> ResultEngine<CascadeReport>;
}

#[async_trait]
pub trait TripStore: Send + Sync {
    async fn create_trip(&self, trip: TripNew) -> ResultEngine<Uuid>;
    async fn get_trip(&self, id: Uuid) -> ResultEngine<Trip>;
    async fn find_trips(&self, ids: &[Uuid]) -> ResultEngine<Vec<Trip>>;
    async fn update_trip(&self, id: Uuid, update: TripUpdate) -> ResultEngine<Trip>;
    async fn delete_trip(&self, id: Uuid) -> ResultEngine<()>;
}

/// Everything the plan service owns.
pub trait PlanStore: PinStore + WhiteboardStore + TripStore {}

impl<T> PlanStore for T where T: PinStore + WhiteboardStore + TripStore + ?Sized {}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn create_user(&self, user: UserNew) -> ResultEngine<User>;
    async fn get_user(&self, id: Uuid) -> ResultEngine<User>;
    async fn find_users(&self, ids: &[Uuid]) -> ResultEngine<Vec<User>>;
    async fn delete_user(&self, id: Uuid) -> ResultEngine<()>;
}

#[async_trait]
pub trait MembershipStore: Send + Sync {
    /// All-or-nothing: an existing pair rejects the whole batch.
    async fn create_memberships(&self, trip_id: Uuid, user_ids: &[Uuid]) -> ResultEngine<()>;
    async fn trips_for_user(&self, user_id: Uuid) -> ResultEngine<Vec<Uuid>>;
    async fn members_for_trip(&self, trip_id: Uuid) -> ResultEngine<Vec<Membership>>;
    async fn check_membership(&self, trip_id: Uuid, user_id: Uuid) -> ResultEngine<bool>;
    async fn update_display_name(
        &self,
        trip_id: Uuid,
        user_id: Uuid,
        name: &str,
    ) -> ResultEngine<()>;
    async fn delete_membership(&self, trip_id: Uuid, user_id: Uuid) -> ResultEngine<()>;
    async fn delete_memberships_by_user(&self, user_id: Uuid) -> ResultEngine<u64>;
    async fn delete_memberships_by_trip(&self, trip_id: Uuid) -> ResultEngine<u64>;
}

/// Everything the user service owns.
pub trait UserStore: ProfileStore + MembershipStore {}

impl<T> UserStore for T where T: ProfileStore + MembershipStore + ?Sized {}
