use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

use engine::{
    ChangeType, EngineError, Expense, PinNew, PinStore, PinUpdate, PlanEngine, TripNew, TripStore,
    TripUpdate, WhiteboardStore, WhiteboardUpdate,
};
use migration::{MigratorTrait, PlanMigrator};

async fn engine_with_db() -> (PlanEngine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    PlanMigrator::up(&db, None).await.unwrap();
    let engine = PlanEngine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

async fn whiteboard_with_pin(engine: &PlanEngine, day: i32) -> (Uuid, Uuid) {
    let pin_id = engine.create_pin(PinNew::default()).await.unwrap();
    let wb_id = engine.create_whiteboard(pin_id, day).await.unwrap();
    (wb_id, pin_id)
}

#[tokio::test]
async fn default_pin_has_empty_fields() {
    let (engine, _db) = engine_with_db().await;

    let pin_id = engine.create_pin(PinNew::default()).await.unwrap();
    let pin = engine.get_pin(pin_id).await.unwrap();

    assert_eq!(pin.id, pin_id);
    assert_eq!(pin.name, "");
    assert_eq!(pin.description, "");
    assert!(pin.expenses.is_empty());
    assert_eq!(pin.location, 0.0);
    assert!(pin.parents.is_empty());
    assert!(pin.participants.is_empty());
}

#[tokio::test]
async fn pin_fields_survive_storage() {
    let (engine, _db) = engine_with_db().await;
    let alice = Uuid::new_v4();
    let parent = engine.create_pin(PinNew::default()).await.unwrap();

    let pin_id = engine
        .create_pin(PinNew {
            name: "Tanah Lot".to_string(),
            description: "sunset temple".to_string(),
            expenses: vec![Expense {
                id: alice,
                name: "ticket".to_string(),
                expense: 60.5,
            }],
            location: 12.25,
            parents: vec![parent],
            participants: vec![alice],
        })
        .await
        .unwrap();

    let pin = engine.get_pin(pin_id).await.unwrap();
    assert_eq!(pin.name, "Tanah Lot");
    assert_eq!(pin.expenses.len(), 1);
    assert_eq!(pin.expenses[0].expense, 60.5);
    assert_eq!(pin.parents, vec![parent]);
    assert_eq!(pin.participants, vec![alice]);
}

#[tokio::test]
async fn find_pins_follows_requested_order_and_skips_missing() {
    let (engine, _db) = engine_with_db().await;
    let a = engine.create_pin(PinNew::default()).await.unwrap();
    let b = engine.create_pin(PinNew::default()).await.unwrap();

    let found = engine.find_pins(&[b, Uuid::new_v4(), a]).await.unwrap();
    let ids: Vec<Uuid> = found.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![b, a]);
}

#[tokio::test]
async fn find_pins_by_participant_matches_exact_ids() {
    let (engine, _db) = engine_with_db().await;
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    let with_alice = engine
        .create_pin(PinNew {
            participants: vec![alice, bob],
            ..PinNew::default()
        })
        .await
        .unwrap();
    engine
        .create_pin(PinNew {
            participants: vec![bob],
            ..PinNew::default()
        })
        .await
        .unwrap();

    let pins = engine.find_pins_by_participant(alice).await.unwrap();
    assert_eq!(pins.len(), 1);
    assert_eq!(pins[0].id, with_alice);
    assert_eq!(engine.find_pins_by_participant(bob).await.unwrap().len(), 2);
}

#[tokio::test]
async fn update_pin_only_touches_given_fields() {
    let (engine, _db) = engine_with_db().await;
    let pin_id = engine
        .create_pin(PinNew {
            name: "Ubud".to_string(),
            location: 3.0,
            ..PinNew::default()
        })
        .await
        .unwrap();

    let pin = engine
        .update_pin(
            pin_id,
            PinUpdate {
                description: Some("rice terraces".to_string()),
                ..PinUpdate::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(pin.name, "Ubud");
    assert_eq!(pin.description, "rice terraces");
    assert_eq!(engine.get_pin(pin_id).await.unwrap(), pin);

    let err = engine
        .update_pin(pin_id, PinUpdate::default())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
}

#[tokio::test]
async fn single_delete_of_missing_pin_is_not_found() {
    let (engine, _db) = engine_with_db().await;
    let pin_id = engine.create_pin(PinNew::default()).await.unwrap();

    engine.delete_pin(pin_id).await.unwrap();
    let err = engine.delete_pin(pin_id).await.unwrap_err();
    assert!(err.is_not_found());
    assert!(engine.get_pin(pin_id).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn bulk_delete_counts_rows_and_accepts_zero() {
    let (engine, _db) = engine_with_db().await;
    let a = engine.create_pin(PinNew::default()).await.unwrap();
    let b = engine.create_pin(PinNew::default()).await.unwrap();

    assert_eq!(engine.delete_pins(&[a, b, Uuid::new_v4()]).await.unwrap(), 2);
    assert_eq!(engine.delete_pins(&[a, b]).await.unwrap(), 0);
    assert_eq!(engine.delete_pins(&[]).await.unwrap(), 0);
}

#[tokio::test]
async fn whiteboard_starts_with_its_pin() {
    let (engine, _db) = engine_with_db().await;
    let (wb_id, pin_id) = whiteboard_with_pin(&engine, 1).await;

    let wb = engine.get_whiteboard(wb_id).await.unwrap();
    assert_eq!(wb.day, 1);
    assert_eq!(wb.pins, vec![pin_id]);
}

#[tokio::test]
async fn whiteboard_requires_existing_pin_and_positive_day() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .create_whiteboard(Uuid::new_v4(), 1)
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let pin_id = engine.create_pin(PinNew::default()).await.unwrap();
    let err = engine.create_whiteboard(pin_id, 0).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
}

#[tokio::test]
async fn update_whiteboard_applies_ordered_set_changes() {
    let (engine, _db) = engine_with_db().await;
    let (wb_id, first) = whiteboard_with_pin(&engine, 1).await;
    let second = engine.create_pin(PinNew::default()).await.unwrap();
    let third = engine.create_pin(PinNew::default()).await.unwrap();

    let wb = engine
        .update_whiteboard(
            wb_id,
            WhiteboardUpdate::pins(ChangeType::Add, vec![second, first, third]),
        )
        .await
        .unwrap();
    assert_eq!(wb.pins, vec![first, second, third]);

    let wb = engine
        .update_whiteboard(wb_id, WhiteboardUpdate::pins(ChangeType::Remove, vec![second]))
        .await
        .unwrap();
    assert_eq!(wb.pins, vec![first, third]);

    let wb = engine
        .update_whiteboard(
            wb_id,
            WhiteboardUpdate {
                pins: vec![third],
                change: Some(ChangeType::Set),
                day: 4,
            },
        )
        .await
        .unwrap();
    assert_eq!(wb.pins, vec![third]);
    assert_eq!(wb.day, 4);
    assert_eq!(engine.get_whiteboard(wb_id).await.unwrap(), wb);
}

#[tokio::test]
async fn update_whiteboard_keeps_at_least_one_pin() {
    let (engine, _db) = engine_with_db().await;
    let (wb_id, pin_id) = whiteboard_with_pin(&engine, 1).await;

    let err = engine
        .update_whiteboard(wb_id, WhiteboardUpdate::pins(ChangeType::Remove, vec![pin_id]))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));

    let err = engine
        .update_whiteboard(wb_id, WhiteboardUpdate::pins(ChangeType::Set, Vec::new()))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));

    assert_eq!(engine.get_whiteboard(wb_id).await.unwrap().pins, vec![pin_id]);
}

#[tokio::test]
async fn update_whiteboard_rejects_empty_update_and_missing_row() {
    let (engine, _db) = engine_with_db().await;
    let (wb_id, _) = whiteboard_with_pin(&engine, 1).await;

    let err = engine
        .update_whiteboard(wb_id, WhiteboardUpdate::default())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidInput("no update operations provided".to_string())
    );

    let err = engine
        .update_whiteboard(
            Uuid::new_v4(),
            WhiteboardUpdate::pins(ChangeType::Add, vec![]),
        )
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn cascade_deletes_whiteboards_and_their_pins() {
    let (engine, _db) = engine_with_db().await;
    let (wb1, pin1) = whiteboard_with_pin(&engine, 1).await;
    let (wb2, pin2) = whiteboard_with_pin(&engine, 2).await;
    let extra = engine.create_pin(PinNew::default()).await.unwrap();
    engine
        .update_whiteboard(wb2, WhiteboardUpdate::pins(ChangeType::Add, vec![extra]))
        .await
        .unwrap();
    let (untouched_wb, untouched_pin) = whiteboard_with_pin(&engine, 3).await;

    let report = engine.delete_whiteboards_cascade(&[wb1, wb2]).await.unwrap();
    assert_eq!(report.pins_deleted, 3);
    assert_eq!(report.whiteboards_deleted, 2);

    assert!(engine.find_whiteboards(&[wb1, wb2]).await.unwrap().is_empty());
    assert!(engine.find_pins(&[pin1, pin2, extra]).await.unwrap().is_empty());
    assert!(engine.get_whiteboard(untouched_wb).await.is_ok());
    assert!(engine.get_pin(untouched_pin).await.is_ok());
}

#[tokio::test]
async fn cascade_retry_after_partial_progress_finishes_the_job() {
    let (engine, _db) = engine_with_db().await;
    let (wb_id, pin_id) = whiteboard_with_pin(&engine, 1).await;

    // Pins gone, whiteboard still there: the state a failed cascade can leave.
    engine.delete_pins(&[pin_id]).await.unwrap();

    let report = engine.delete_whiteboards_cascade(&[wb_id]).await.unwrap();
    assert_eq!(report.pins_deleted, 0);
    assert_eq!(report.whiteboards_deleted, 1);

    let report = engine.delete_whiteboards_cascade(&[wb_id]).await.unwrap();
    assert_eq!(report, Default::default());
}

#[tokio::test]
async fn trip_holds_its_whiteboards() {
    let (engine, _db) = engine_with_db().await;
    let (wb_id, _) = whiteboard_with_pin(&engine, 1).await;

    let trip_id = engine
        .create_trip(TripNew {
            name: "Bali Trip".to_string(),
            description: "two weeks".to_string(),
            whiteboards: vec![wb_id],
        })
        .await
        .unwrap();

    let trip = engine.get_trip(trip_id).await.unwrap();
    assert_eq!(trip.name, "Bali Trip");
    assert_eq!(trip.whiteboards, vec![wb_id]);
    assert_eq!(engine.find_trips(&[trip_id]).await.unwrap(), vec![trip]);
}

#[tokio::test]
async fn trip_rejects_blank_name_and_unknown_whiteboards() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .create_trip(TripNew {
            name: "  ".to_string(),
            description: String::new(),
            whiteboards: vec![],
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));

    let err = engine
        .create_trip(TripNew {
            name: "Lost".to_string(),
            description: String::new(),
            whiteboards: vec![Uuid::new_v4()],
        })
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn update_trip_keeps_blank_fields_and_edits_whiteboards() {
    let (engine, _db) = engine_with_db().await;
    let (wb1, _) = whiteboard_with_pin(&engine, 1).await;
    let (wb2, _) = whiteboard_with_pin(&engine, 2).await;
    let trip_id = engine
        .create_trip(TripNew {
            name: "Bali Trip".to_string(),
            description: "two weeks".to_string(),
            whiteboards: vec![wb1],
        })
        .await
        .unwrap();

    let trip = engine
        .update_trip(trip_id, TripUpdate::whiteboards(ChangeType::Add, vec![wb2]))
        .await
        .unwrap();
    assert_eq!(trip.name, "Bali Trip");
    assert_eq!(trip.whiteboards, vec![wb1, wb2]);

    let trip = engine
        .update_trip(
            trip_id,
            TripUpdate {
                name: "Bali & Lombok".to_string(),
                ..TripUpdate::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(trip.name, "Bali & Lombok");
    assert_eq!(trip.description, "two weeks");
    assert_eq!(trip.whiteboards, vec![wb1, wb2]);

    let err = engine
        .update_trip(trip_id, TripUpdate::default())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
}

#[tokio::test]
async fn delete_trip_twice_is_not_found() {
    let (engine, _db) = engine_with_db().await;
    let trip_id = engine
        .create_trip(TripNew {
            name: "Short".to_string(),
            description: String::new(),
            whiteboards: vec![],
        })
        .await
        .unwrap();

    engine.delete_trip(trip_id).await.unwrap();
    assert!(engine.delete_trip(trip_id).await.unwrap_err().is_not_found());
    assert!(engine.get_trip(trip_id).await.unwrap_err().is_not_found());
}
