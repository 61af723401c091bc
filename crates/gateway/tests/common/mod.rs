#![allow(dead_code)]

use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use api_types::notification::EmailEvent;
use async_trait::async_trait;
use engine::{
    CascadeReport, EngineError, Pin, PinNew, PinStore, PinUpdate, PlanEngine, ProfileStore,
    ResultEngine, Trip, TripNew, TripStore, TripUpdate, User, UserEngine, UserNew, Whiteboard,
    WhiteboardStore, WhiteboardUpdate,
};
use gateway::{Orchestrator, SagaPolicy};
use migration::{MigratorTrait, PlanMigrator, UserMigrator};
use notification::{NotificationError, Notifier, ResultNotification};
use sea_orm::Database;
use uuid::Uuid;

/// Switches that make single plan store calls fail.
#[derive(Default)]
pub struct Faults {
    pub create_whiteboard: AtomicBool,
    pub create_trip: AtomicBool,
    pub update_whiteboard: AtomicBool,
    pub update_trip: AtomicBool,
    pub slow_create_pin: AtomicBool,
}

fn injected(what: &str) -> EngineError {
    EngineError::Unavailable(format!("{what}: injected failure"))
}

/// Plan store that delegates to a real engine unless a fault is switched on.
pub struct FlakyPlan {
    pub inner: PlanEngine,
    pub faults: Faults,
    pub created_pins: Mutex<Vec<Uuid>>,
    pub created_whiteboards: Mutex<Vec<Uuid>>,
}

impl FlakyPlan {
    pub fn pins(&self) -> Vec<Uuid> {
        self.created_pins.lock().unwrap().clone()
    }

    pub fn whiteboards(&self) -> Vec<Uuid> {
        self.created_whiteboards.lock().unwrap().clone()
    }

    pub fn fail(&self, fault: impl Fn(&Faults) -> &AtomicBool) {
        fault(&self.faults).store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl PinStore for FlakyPlan {
    async fn create_pin(&self, pin: PinNew) -> ResultEngine<Uuid> {
        if self.faults.slow_create_pin.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_secs(5)).await;
        }
        let id = self.inner.create_pin(pin).await?;
        self.created_pins.lock().unwrap().push(id);
        Ok(id)
    }

    async fn get_pin(&self, id: Uuid) -> ResultEngine<Pin> {
        self.inner.get_pin(id).await
    }

    async fn find_pins(&self, ids: &[Uuid]) -> ResultEngine<Vec<Pin>> {
        self.inner.find_pins(ids).await
    }

    async fn find_pins_by_participant(&self, user_id: Uuid) -> ResultEngine<Vec<Pin>> {
        self.inner.find_pins_by_participant(user_id).await
    }

    async fn update_pin(&self, id: Uuid, update: PinUpdate) -> ResultEngine<Pin> {
        self.inner.update_pin(id, update).await
    }

    async fn delete_pin(&self, id: Uuid) -> ResultEngine<()> {
        self.inner.delete_pin(id).await
    }

    async fn delete_pins(&self, ids: &[Uuid]) -> ResultEngine<u64> {
        self.inner.delete_pins(ids).await
    }
}

#[async_trait]
impl WhiteboardStore for FlakyPlan {
    async fn create_whiteboard(&self, pin_id: Uuid, day: i32) -> ResultEngine<Uuid> {
        if self.faults.create_whiteboard.load(Ordering::SeqCst) {
            return Err(injected("create_whiteboard"));
        }
        let id = self.inner.create_whiteboard(pin_id, day).await?;
        self.created_whiteboards.lock().unwrap().push(id);
        Ok(id)
    }

    async fn get_whiteboard(&self, id: Uuid) -> ResultEngine<Whiteboard> {
        self.inner.get_whiteboard(id).await
    }

    async fn find_whiteboards(&self, ids: &[Uuid]) -> ResultEngine<Vec<Whiteboard>> {
        self.inner.find_whiteboards(ids).await
    }

    async fn update_whiteboard(
        &self,
        id: Uuid,
        update: WhiteboardUpdate,
    ) -> ResultEngine<Whiteboard> {
        if self.faults.update_whiteboard.load(Ordering::SeqCst) {
            return Err(injected("update_whiteboard"));
        }
        self.inner.update_whiteboard(id, update).await
    }

    async fn delete_whiteboard(&self, id: Uuid) -> ResultEngine<()> {
        self.inner.delete_whiteboard(id).await
    }

    async fn delete_whiteboards_cascade(&self, ids: &[Uuid]) -> ResultEngine<CascadeReport> {
        self.inner.delete_whiteboards_cascade(ids).await
    }
}

#[async_trait]
impl TripStore for FlakyPlan {
    async fn create_trip(&self, trip: TripNew) -> ResultEngine<Uuid> {
        if self.faults.create_trip.load(Ordering::SeqCst) {
            return Err(injected("create_trip"));
        }
        self.inner.create_trip(trip).await
    }

    async fn get_trip(&self, id: Uuid) -> ResultEngine<Trip> {
        self.inner.get_trip(id).await
    }

    async fn find_trips(&self, ids: &[Uuid]) -> ResultEngine<Vec<Trip>> {
        self.inner.find_trips(ids).await
    }

    async fn update_trip(&self, id: Uuid, update: TripUpdate) -> ResultEngine<Trip> {
        if self.faults.update_trip.load(Ordering::SeqCst) {
            return Err(injected("update_trip"));
        }
        self.inner.update_trip(id, update).await
    }

    async fn delete_trip(&self, id: Uuid) -> ResultEngine<()> {
        self.inner.delete_trip(id).await
    }
}

/// Notifier that keeps every accepted email.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<EmailEvent>>,
    pub unavailable: AtomicBool,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<EmailEvent> {
        self.sent.lock().unwrap().clone()
    }

    /// Wait for the background task that queues an email.
    pub async fn wait_for(&self, count: usize) -> Vec<EmailEvent> {
        for _ in 0..100 {
            let sent = self.sent();
            if sent.len() >= count {
                return sent;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.sent()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_email(&self, email: EmailEvent) -> ResultNotification<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(NotificationError::Unavailable("broker down".to_string()));
        }
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

pub struct Harness {
    pub plan: Arc<FlakyPlan>,
    pub users: Arc<UserEngine>,
    pub notifier: Arc<RecordingNotifier>,
}

impl Harness {
    pub async fn new() -> Self {
        let plan_db = Database::connect("sqlite::memory:").await.unwrap();
        PlanMigrator::up(&plan_db, None).await.unwrap();
        let user_db = Database::connect("sqlite::memory:").await.unwrap();
        UserMigrator::up(&user_db, None).await.unwrap();

        let inner = PlanEngine::builder().database(plan_db).build().await.unwrap();
        let users = UserEngine::builder().database(user_db).build().await.unwrap();

        Self {
            plan: Arc::new(FlakyPlan {
                inner,
                faults: Faults::default(),
                created_pins: Mutex::new(Vec::new()),
                created_whiteboards: Mutex::new(Vec::new()),
            }),
            users: Arc::new(users),
            notifier: Arc::new(RecordingNotifier::default()),
        }
    }

    pub fn orchestrator(&self, policy: SagaPolicy) -> Orchestrator {
        Orchestrator::new(self.plan.clone(), self.users.clone(), self.notifier.clone())
            .with_policy(policy)
    }

    pub async fn user(&self, name: &str) -> User {
        self.users
            .create_user(UserNew {
                name: name.to_string(),
                email: format!("{}@example.com", name.to_lowercase()),
                profile: format!("https://img.example.com/{}.png", name.to_lowercase()),
            })
            .await
            .unwrap()
    }
}
