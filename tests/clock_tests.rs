use chrono::Duration;
use pretty_assertions::assert_eq;
use uuid::Uuid;

use timeclock_be::database::models::{ClockMethod, UpdateClockRulesRequest};
use timeclock_be::database::repositories::ClockRepository;

mod common;

#[actix_web::test]
async fn clock_in_creates_ledger_and_first_event() {
    let db = common::TestDb::new().await.unwrap();
    let repo = ClockRepository::new(db.pool.clone());

    let org = Uuid::new_v4();
    let user = Uuid::new_v4();
    let shift = common::seed_shift(&db.pool, org, user, common::at(8, 0), Some(common::at(16, 0))).await;

    let clock = repo
        .clock_in(
            shift.id,
            user,
            user,
            &common::event_input(ClockMethod::Gps, Some(common::at(8, 5))),
        )
        .await
        .unwrap();

    assert_eq!(clock.clock.shift_id, shift.id);
    assert_eq!(clock.clock.user_id, user);
    assert_eq!(clock.clock.created_by_id, user);
    assert_eq!(clock.clock_ins.len(), 1);
    assert_eq!(clock.clock_outs.len(), 0);
    assert_eq!(clock.clock_ins[0].clock_at, common::at(8, 5));
    assert_eq!(clock.clock_ins[0].method, ClockMethod::Gps);
}

#[actix_web::test]
async fn repeated_clock_in_reuses_the_same_clock() {
    let db = common::TestDb::new().await.unwrap();
    let repo = ClockRepository::new(db.pool.clone());

    let org = Uuid::new_v4();
    let user = Uuid::new_v4();
    let shift = common::seed_shift(&db.pool, org, user, common::at(8, 0), None).await;

    let first = repo
        .clock_in(
            shift.id,
            user,
            user,
            &common::event_input(ClockMethod::Gps, Some(common::at(8, 0))),
        )
        .await
        .unwrap();
    let second = repo
        .clock_in(
            shift.id,
            user,
            user,
            &common::event_input(ClockMethod::Gps, Some(common::at(8, 1))),
        )
        .await
        .unwrap();

    // One ledger row, two events
    assert_eq!(first.clock.id, second.clock.id);
    assert_eq!(second.clock_ins.len(), 2);

    let clock_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM clocks WHERE shift_id = ? AND user_id = ?")
            .bind(shift.id)
            .bind(user)
            .fetch_one(&db.pool)
            .await
            .unwrap();
    assert_eq!(clock_count, 1);
}

#[actix_web::test]
async fn find_or_create_absorbs_duplicate_creation() {
    let db = common::TestDb::new().await.unwrap();
    let repo = ClockRepository::new(db.pool.clone());

    let org = Uuid::new_v4();
    let user = Uuid::new_v4();
    let shift = common::seed_shift(&db.pool, org, user, common::at(9, 0), None).await;

    let a = repo.find_or_create(shift.id, user, user).await.unwrap();
    let b = repo.find_or_create(shift.id, user, user).await.unwrap();

    assert_eq!(a.id, b.id);
}

#[actix_web::test]
async fn clock_out_requires_an_existing_clock() {
    let db = common::TestDb::new().await.unwrap();
    let repo = ClockRepository::new(db.pool.clone());

    let org = Uuid::new_v4();
    let user = Uuid::new_v4();
    let shift = common::seed_shift(&db.pool, org, user, common::at(8, 0), None).await;

    let result = repo
        .clock_out(
            shift.id,
            user,
            &common::event_input(ClockMethod::Gps, None),
        )
        .await
        .unwrap();

    assert!(result.is_none());
}

#[actix_web::test]
async fn clock_out_appends_to_the_out_collection() {
    let db = common::TestDb::new().await.unwrap();
    let repo = ClockRepository::new(db.pool.clone());

    let org = Uuid::new_v4();
    let user = Uuid::new_v4();
    let shift = common::seed_shift(&db.pool, org, user, common::at(8, 0), Some(common::at(16, 0))).await;

    repo.clock_in(
        shift.id,
        user,
        user,
        &common::event_input(ClockMethod::Gps, Some(common::at(8, 0))),
    )
    .await
    .unwrap();

    let clock = repo
        .clock_out(
            shift.id,
            user,
            &common::event_input(ClockMethod::Manual, Some(common::at(16, 0))),
        )
        .await
        .unwrap()
        .expect("clock should exist after clock-in");

    assert_eq!(clock.clock_ins.len(), 1);
    assert_eq!(clock.clock_outs.len(), 1);
    assert_eq!(clock.clock_outs[0].method, ClockMethod::Manual);
}

#[actix_web::test]
async fn events_are_ordered_by_clock_at_not_insertion_order() {
    let db = common::TestDb::new().await.unwrap();
    let repo = ClockRepository::new(db.pool.clone());

    let org = Uuid::new_v4();
    let user = Uuid::new_v4();
    let shift = common::seed_shift(&db.pool, org, user, common::at(8, 0), None).await;

    // Insert the chronologically later event first; callers may backfill.
    repo.clock_in(
        shift.id,
        user,
        user,
        &common::event_input(ClockMethod::Manual, Some(common::at(10, 0))),
    )
    .await
    .unwrap();
    let clock = repo
        .clock_in(
            shift.id,
            user,
            user,
            &common::event_input(ClockMethod::Gps, Some(common::at(8, 0))),
        )
        .await
        .unwrap();

    assert_eq!(clock.clock_ins.len(), 2);
    assert_eq!(clock.clock_ins[0].clock_at, common::at(8, 0));
    assert_eq!(clock.clock_ins[1].clock_at, common::at(10, 0));
    assert!(clock.clock_ins[0].clock_at < clock.clock_ins[1].clock_at);
}

#[actix_web::test]
async fn code_clock_in_rejects_a_mismatched_triple() {
    let db = common::TestDb::new().await.unwrap();
    let repo = ClockRepository::new(db.pool.clone());

    let org = Uuid::new_v4();
    let user = Uuid::new_v4();
    let other_user = Uuid::new_v4();
    let shift = common::seed_shift(&db.pool, org, user, common::at(8, 0), None).await;

    let clock = repo.find_or_create(shift.id, user, user).await.unwrap();

    // Right clock id, wrong user: the triple no longer matches a row.
    let result = repo
        .clock_in_with_code(
            clock.id,
            shift.id,
            other_user,
            &common::event_input(ClockMethod::Qr, None),
        )
        .await
        .unwrap();
    assert!(result.is_none());

    // Unknown clock id never matches.
    let result = repo
        .clock_in_with_code(
            Uuid::new_v4(),
            shift.id,
            user,
            &common::event_input(ClockMethod::Qr, None),
        )
        .await
        .unwrap();
    assert!(result.is_none());
}

#[actix_web::test]
async fn code_clock_in_appends_a_qr_event() {
    let db = common::TestDb::new().await.unwrap();
    let repo = ClockRepository::new(db.pool.clone());

    let org = Uuid::new_v4();
    let user = Uuid::new_v4();
    let shift = common::seed_shift(&db.pool, org, user, common::at(8, 0), None).await;

    let clock = repo.find_or_create(shift.id, user, user).await.unwrap();

    let updated = repo
        .clock_in_with_code(
            clock.id,
            shift.id,
            user,
            &common::event_input(ClockMethod::Qr, Some(common::at(8, 2))),
        )
        .await
        .unwrap()
        .expect("triple matches the existing clock");

    assert_eq!(updated.clock_ins.len(), 1);
    assert_eq!(updated.clock_ins[0].method, ClockMethod::Qr);
}

#[actix_web::test]
async fn update_rules_changes_only_the_supplied_flags() {
    let db = common::TestDb::new().await.unwrap();
    let repo = ClockRepository::new(db.pool.clone());

    let org = Uuid::new_v4();
    let user = Uuid::new_v4();
    let shift = common::seed_shift(&db.pool, org, user, common::at(8, 0), None).await;

    let clock = repo.find_or_create(shift.id, user, user).await.unwrap();
    assert!(!clock.require_geo);
    assert!(!clock.require_device_lock);

    let updated = repo
        .update_rules(
            clock.id,
            &UpdateClockRulesRequest {
                require_geo: Some(true),
                require_device_lock: None,
            },
        )
        .await
        .unwrap()
        .expect("clock exists");

    assert!(updated.require_geo);
    assert!(!updated.require_device_lock);

    let missing = repo
        .update_rules(
            Uuid::new_v4(),
            &UpdateClockRulesRequest {
                require_geo: Some(false),
                require_device_lock: Some(true),
            },
        )
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[actix_web::test]
async fn clock_at_defaults_to_server_time() {
    let db = common::TestDb::new().await.unwrap();
    let repo = ClockRepository::new(db.pool.clone());

    let org = Uuid::new_v4();
    let user = Uuid::new_v4();
    let shift = common::seed_shift(&db.pool, org, user, common::at(8, 0), None).await;

    let before = chrono::Utc::now() - Duration::seconds(1);
    let clock = repo
        .clock_in(
            shift.id,
            user,
            user,
            &common::event_input(ClockMethod::Gps, None),
        )
        .await
        .unwrap();
    let after = chrono::Utc::now() + Duration::seconds(1);

    let at = clock.clock_ins[0].clock_at;
    assert!(at >= before && at <= after);
}
