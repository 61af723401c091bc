//! The composite orchestrator.
//!
//! Sequences calls across the plan store and the user store to create and
//! delete whole trip hierarchies. The stores are reached only through their
//! traits, so they can be in-process engines or RPC clients.

use std::{sync::Arc, time::Duration};

use api_types::notification::EmailEvent;
use engine::{
    Avatar, ChangeType, EngineError, Pin, PinNew, PinUpdate, PlanStore, ResultEngine, Trip,
    TripNew, TripUpdate, User, UserNew, UserStore, Whiteboard, WhiteboardUpdate, trip_avatars,
};
use notification::{Notifier, parse_mailbox};
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    saga::{Saga, SagaError, SagaPolicy, SagaStep, Undo, bounded},
    types::{TripView, WhiteboardView},
};

pub const WELCOME_SUBJECT: &str = "Welcome to Trip Planner!";

/// Ids produced by a successful trip creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CreatedTrip {
    pub trip_id: Uuid,
    pub whiteboard_id: Uuid,
    pub pin_id: Uuid,
}

#[derive(Clone)]
pub struct Orchestrator {
    plan: Arc<dyn PlanStore>,
    users: Arc<dyn UserStore>,
    notifier: Arc<dyn Notifier>,
    policy: SagaPolicy,
    timeout: Option<Duration>,
}

impl Orchestrator {
    /// Fail-forward orchestrator without a per-step timeout.
    pub fn new(
        plan: Arc<dyn PlanStore>,
        users: Arc<dyn UserStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            plan,
            users,
            notifier,
            policy: SagaPolicy::default(),
            timeout: None,
        }
    }

    pub fn with_policy(mut self, policy: SagaPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Bound every remote call; `None` waits as long as the store does.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn policy(&self) -> SagaPolicy {
        self.policy
    }

    fn saga(&self, name: &'static str) -> Saga {
        Saga::new(
            name,
            self.plan.clone(),
            self.users.clone(),
            self.policy,
            self.timeout,
        )
    }

    /// Pass when `user_id` is a member of `trip_id`.
    ///
    /// A non-member gets `Forbidden` if the trip exists and `KeyNotFound`
    /// otherwise, so deleting a trip twice reports not-found the second time.
    async fn authorize(&self, trip_id: Uuid, user_id: Uuid) -> ResultEngine<()> {
        if self.users.check_membership(trip_id, user_id).await? {
            return Ok(());
        }
        self.plan.get_trip(trip_id).await?;
        Err(EngineError::Forbidden(format!(
            "user {user_id} is not a member of trip {trip_id}"
        )))
    }

    /// Create a trip with one default whiteboard holding one default pin and
    /// make `user_id` its first member.
    pub async fn create_trip(
        &self,
        user_id: Uuid,
        name: &str,
        description: &str,
    ) -> Result<CreatedTrip, SagaError> {
        let mut saga = self.saga("create_trip");
        if name.trim().is_empty() {
            return Err(saga.reject(
                SagaStep::Validate,
                EngineError::InvalidInput("trip name must not be empty".to_string()),
            ));
        }

        let pin_id = saga
            .step(SagaStep::CreatePin, self.plan.create_pin(PinNew::default()))
            .await?;
        saga.undo_with(Undo::DeletePin(pin_id));
        info!(%pin_id, "create_trip: default pin created");

        let whiteboard_id = saga
            .step(
                SagaStep::CreateWhiteboard,
                self.plan.create_whiteboard(pin_id, 1),
            )
            .await?;
        saga.undo_with(Undo::DeleteWhiteboard(whiteboard_id));
        info!(%whiteboard_id, "create_trip: default whiteboard created");

        let trip_id = saga
            .step(
                SagaStep::CreateTrip,
                self.plan.create_trip(TripNew {
                    name: name.to_string(),
                    description: description.to_string(),
                    whiteboards: vec![whiteboard_id],
                }),
            )
            .await?;
        saga.undo_with(Undo::DeleteTrip(trip_id));
        info!(%trip_id, "create_trip: trip created");

        saga.step(
            SagaStep::CreateMembership,
            self.users.create_memberships(trip_id, &[user_id]),
        )
        .await?;
        saga.undo_with(Undo::DeleteMembership { trip_id, user_id });
        saga.finish();

        Ok(CreatedTrip {
            trip_id,
            whiteboard_id,
            pin_id,
        })
    }

    /// Delete a trip, its whiteboards, their pins and every membership.
    ///
    /// Never compensated: deleted rows cannot be brought back.
    pub async fn delete_trip(&self, user_id: Uuid, trip_id: Uuid) -> Result<(), SagaError> {
        let mut saga = self.saga("delete_trip");

        saga.step(SagaStep::Authorize, self.authorize(trip_id, user_id))
            .await?;
        let trip = saga
            .step(SagaStep::ReadTrip, self.plan.get_trip(trip_id))
            .await?;
        let report = saga
            .step(
                SagaStep::CascadeWhiteboards,
                self.plan.delete_whiteboards_cascade(&trip.whiteboards),
            )
            .await?;
        saga.step(SagaStep::DeleteTrip, self.plan.delete_trip(trip_id))
            .await?;
        let memberships = saga
            .step(
                SagaStep::DeleteMemberships,
                self.users.delete_memberships_by_trip(trip_id),
            )
            .await?;
        saga.finish();

        info!(
            %trip_id,
            whiteboards = report.whiteboards_deleted,
            pins = report.pins_deleted,
            memberships,
            "trip deleted"
        );
        Ok(())
    }

    /// Add a new day to a trip. Returns the new whiteboard and its default pin.
    pub async fn add_whiteboard(
        &self,
        user_id: Uuid,
        trip_id: Uuid,
        day: i32,
    ) -> Result<(Uuid, Uuid), SagaError> {
        let mut saga = self.saga("add_whiteboard");
        if day < 1 {
            return Err(saga.reject(
                SagaStep::Validate,
                EngineError::InvalidInput(format!("day must be at least 1, got {day}")),
            ));
        }

        saga.step(SagaStep::Authorize, self.authorize(trip_id, user_id))
            .await?;

        let pin_id = saga
            .step(SagaStep::CreatePin, self.plan.create_pin(PinNew::default()))
            .await?;
        saga.undo_with(Undo::DeletePin(pin_id));

        let whiteboard_id = saga
            .step(
                SagaStep::CreateWhiteboard,
                self.plan.create_whiteboard(pin_id, day),
            )
            .await?;
        saga.undo_with(Undo::DeleteWhiteboard(whiteboard_id));
        info!(%trip_id, %whiteboard_id, day, "add_whiteboard: whiteboard created");

        saga.step(
            SagaStep::LinkWhiteboard,
            self.plan.update_trip(
                trip_id,
                TripUpdate::whiteboards(ChangeType::Add, vec![whiteboard_id]),
            ),
        )
        .await?;
        saga.finish();

        Ok((whiteboard_id, pin_id))
    }

    /// Create a pin and append it to the whiteboard's pins.
    pub async fn create_pin(&self, whiteboard_id: Uuid, pin: PinNew) -> Result<Uuid, SagaError> {
        let mut saga = self.saga("create_pin");

        let pin_id = saga
            .step(SagaStep::CreatePin, self.plan.create_pin(pin))
            .await?;
        saga.undo_with(Undo::DeletePin(pin_id));
        info!(%pin_id, %whiteboard_id, "create_pin: pin created");

        saga.step(
            SagaStep::LinkPin,
            self.plan.update_whiteboard(
                whiteboard_id,
                WhiteboardUpdate::pins(ChangeType::Add, vec![pin_id]),
            ),
        )
        .await?;
        saga.finish();

        Ok(pin_id)
    }

    /// Delete a pin, then remove it from the whiteboard's pins.
    ///
    /// The pin must be on `whiteboard_id` and must not be its last one.
    pub async fn delete_pin(&self, whiteboard_id: Uuid, pin_id: Uuid) -> Result<(), SagaError> {
        let mut saga = self.saga("delete_pin");

        saga.step(SagaStep::ReadWhiteboard, async {
            let whiteboard = self.plan.get_whiteboard(whiteboard_id).await?;
            if !whiteboard.pins.contains(&pin_id) {
                return Err(EngineError::KeyNotFound(format!(
                    "pin {pin_id} is not on whiteboard {whiteboard_id}"
                )));
            }
            if whiteboard.pins.len() == 1 {
                return Err(EngineError::InvalidInput(format!(
                    "pin {pin_id} is the last pin of whiteboard {whiteboard_id}"
                )));
            }
            Ok::<_, EngineError>(())
        })
        .await?;
        saga.step(SagaStep::DeletePin, self.plan.delete_pin(pin_id))
            .await?;
        saga.step(
            SagaStep::UnlinkPin,
            self.plan.update_whiteboard(
                whiteboard_id,
                WhiteboardUpdate::pins(ChangeType::Remove, vec![pin_id]),
            ),
        )
        .await?;
        saga.finish();

        Ok(())
    }

    /// Delete one day of a trip with its pins, then drop it from the trip.
    ///
    /// A trip keeps at least one whiteboard; delete the trip instead.
    pub async fn delete_whiteboard(
        &self,
        user_id: Uuid,
        trip_id: Uuid,
        whiteboard_id: Uuid,
    ) -> Result<(), SagaError> {
        let mut saga = self.saga("delete_whiteboard");

        saga.step(SagaStep::Authorize, self.authorize(trip_id, user_id))
            .await?;
        saga.step(SagaStep::ReadTrip, async {
            let trip = self.plan.get_trip(trip_id).await?;
            if !trip.whiteboards.contains(&whiteboard_id) {
                return Err(EngineError::KeyNotFound(format!(
                    "whiteboard {whiteboard_id} is not in trip {trip_id}"
                )));
            }
            if trip.whiteboards.len() == 1 {
                return Err(EngineError::InvalidInput(format!(
                    "whiteboard {whiteboard_id} is the last one of trip {trip_id}"
                )));
            }
            Ok::<_, EngineError>(())
        })
        .await?;
        let report = saga
            .step(
                SagaStep::CascadeWhiteboards,
                self.plan.delete_whiteboards_cascade(&[whiteboard_id]),
            )
            .await?;
        saga.step(
            SagaStep::UnlinkWhiteboard,
            self.plan.update_trip(
                trip_id,
                TripUpdate::whiteboards(ChangeType::Remove, vec![whiteboard_id]),
            ),
        )
        .await?;
        saga.finish();

        info!(%trip_id, %whiteboard_id, pins = report.pins_deleted, "whiteboard deleted");
        Ok(())
    }

    /// Register a user and queue the welcome email.
    ///
    /// The email is handed to the notifier on its own task: the caller never
    /// waits for it and a failure is only logged.
    pub async fn register_user(&self, user: UserNew) -> Result<User, SagaError> {
        let mut saga = self.saga("register_user");
        if let Err(err) = parse_mailbox(&user.email) {
            return Err(saga.reject(
                SagaStep::Validate,
                EngineError::InvalidInput(err.to_string()),
            ));
        }

        let user = saga
            .step(SagaStep::CreateUser, self.users.create_user(user))
            .await?;
        saga.finish();
        info!(user_id = %user.id, "user registered");

        let notifier = self.notifier.clone();
        let email = EmailEvent {
            to: user.email.clone(),
            subject: WELCOME_SUBJECT.to_string(),
            body: format!(
                "Hi {},\n\nyour Trip Planner account is ready. Start by creating your first trip!",
                user.name
            ),
        };
        tokio::spawn(async move {
            if let Err(err) = notifier.send_email(email).await {
                error!("welcome email not queued: {err}");
            }
        });

        Ok(user)
    }

    /// Drop every membership of the user, then the user.
    pub async fn delete_user(&self, user_id: Uuid) -> Result<(), SagaError> {
        let mut saga = self.saga("delete_user");

        let memberships = saga
            .step(
                SagaStep::DeleteMemberships,
                self.users.delete_memberships_by_user(user_id),
            )
            .await?;
        saga.step(SagaStep::DeleteUser, self.users.delete_user(user_id))
            .await?;
        saga.finish();

        info!(%user_id, memberships, "user deleted");
        Ok(())
    }

    /// A trip with its whiteboards and their pins, in stored order.
    pub async fn trip_view(&self, user_id: Uuid, trip_id: Uuid) -> ResultEngine<TripView> {
        bounded(self.timeout, "authorize", self.authorize(trip_id, user_id)).await?;
        let trip = bounded(self.timeout, "get_trip", self.plan.get_trip(trip_id)).await?;
        let whiteboards = bounded(
            self.timeout,
            "find_whiteboards",
            self.plan.find_whiteboards(&trip.whiteboards),
        )
        .await?;

        let mut views = Vec::with_capacity(whiteboards.len());
        for whiteboard in whiteboards {
            views.push(self.resolve_whiteboard(whiteboard).await?);
        }
        Ok(TripView {
            trip,
            whiteboards: views,
        })
    }

    /// Trips `user_id` is a member of.
    pub async fn trips_for(&self, user_id: Uuid) -> ResultEngine<Vec<Trip>> {
        let ids = bounded(
            self.timeout,
            "trips_for_user",
            self.users.trips_for_user(user_id),
        )
        .await?;
        bounded(self.timeout, "find_trips", self.plan.find_trips(&ids)).await
    }

    pub async fn whiteboard_view(&self, whiteboard_id: Uuid) -> ResultEngine<WhiteboardView> {
        let whiteboard = bounded(
            self.timeout,
            "get_whiteboard",
            self.plan.get_whiteboard(whiteboard_id),
        )
        .await?;
        self.resolve_whiteboard(whiteboard).await
    }

    async fn resolve_whiteboard(&self, whiteboard: Whiteboard) -> ResultEngine<WhiteboardView> {
        let pins = bounded(
            self.timeout,
            "find_pins",
            self.plan.find_pins(&whiteboard.pins),
        )
        .await?;
        Ok(WhiteboardView { whiteboard, pins })
    }

    pub async fn pin(&self, pin_id: Uuid) -> ResultEngine<Pin> {
        bounded(self.timeout, "get_pin", self.plan.get_pin(pin_id)).await
    }

    pub async fn update_pin(&self, pin_id: Uuid, update: PinUpdate) -> ResultEngine<Pin> {
        bounded(self.timeout, "update_pin", self.plan.update_pin(pin_id, update)).await
    }

    /// Pins listing `user_id` among their participants.
    pub async fn participant_pins(&self, user_id: Uuid) -> ResultEngine<Vec<Pin>> {
        bounded(
            self.timeout,
            "find_pins_by_participant",
            self.plan.find_pins_by_participant(user_id),
        )
        .await
    }

    /// Add users to a trip the requester is a member of.
    pub async fn add_members(
        &self,
        user_id: Uuid,
        trip_id: Uuid,
        user_ids: &[Uuid],
    ) -> ResultEngine<()> {
        bounded(self.timeout, "authorize", self.authorize(trip_id, user_id)).await?;
        bounded(
            self.timeout,
            "create_memberships",
            self.users.create_memberships(trip_id, user_ids),
        )
        .await
    }

    /// Avatars of the requested members; an empty list selects all of them.
    pub async fn avatars(
        &self,
        user_id: Uuid,
        trip_id: Uuid,
        user_ids: &[Uuid],
    ) -> ResultEngine<Vec<Avatar>> {
        bounded(self.timeout, "authorize", self.authorize(trip_id, user_id)).await?;
        bounded(
            self.timeout,
            "trip_avatars",
            trip_avatars(self.users.as_ref(), trip_id, user_ids),
        )
        .await
    }

    /// Set the caller's display name in a trip.
    pub async fn set_display_name(
        &self,
        user_id: Uuid,
        trip_id: Uuid,
        name: &str,
    ) -> ResultEngine<()> {
        bounded(
            self.timeout,
            "update_display_name",
            self.users.update_display_name(trip_id, user_id, name),
        )
        .await
    }
}
