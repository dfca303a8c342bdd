//! Component locking through the command service

mod common;

use std::time::Duration;

use common::*;
use cmdctl_core::error::CommandError;
use cmdctl_core::lock::LockingResponse;
use cmdctl_core::models::CommandResponse;
use cmdctl_core::test_helpers::commands;

const LOCK_DURATION: Duration = Duration::from_secs(5);

#[tokio::test]
async fn test_locked_component_refuses_other_senders_before_validation() {
    let ts = TestSystem::start().await;

    let locked = ts.service.lock(CLIENT_PREFIX, LOCK_DURATION, TIMEOUT).await.unwrap();
    assert_eq!(locked, LockingResponse::LockAcquired);

    let foreign = setup_from(OTHER_PREFIX, commands::IMMEDIATE);
    let run_id = foreign.run_id();
    let validations_before = ts.handlers.validation_count();

    let response = ts.service.submit(foreign, TIMEOUT).await.unwrap();

    assert_eq!(response, CommandResponse::Locked { run_id });
    assert_eq!(ts.handlers.validation_count(), validations_before);
    assert_eq!(
        ts.service.query(run_id, TIMEOUT).await.unwrap(),
        CommandResponse::Locked { run_id }
    );
}

#[tokio::test]
async fn test_lock_owner_is_still_served() {
    let ts = TestSystem::start().await;
    ts.service.lock(CLIENT_PREFIX, LOCK_DURATION, TIMEOUT).await.unwrap();

    let command = setup(commands::IMMEDIATE);
    let run_id = command.run_id();
    let response = ts.service.submit(command, TIMEOUT).await.unwrap();

    assert_eq!(response, CommandResponse::completed(run_id));
    assert_eq!(ts.handlers.validation_count(), 1);
}

#[tokio::test]
async fn test_oneway_from_other_sender_is_locked_and_untracked() {
    let ts = TestSystem::start().await;
    ts.service.lock(CLIENT_PREFIX, LOCK_DURATION, TIMEOUT).await.unwrap();

    let foreign = setup_from(OTHER_PREFIX, commands::IMMEDIATE);
    let run_id = foreign.run_id();
    let response = ts.service.oneway(foreign, TIMEOUT).await.unwrap();

    assert_eq!(response, CommandResponse::Locked { run_id });
    assert_eq!(ts.handlers.oneway_count(), 0);
    assert_eq!(
        ts.service.query(run_id, TIMEOUT).await,
        Err(CommandError::UnknownRunId(run_id))
    );
}

#[tokio::test]
async fn test_second_owner_cannot_take_the_lock() {
    let ts = TestSystem::start().await;
    ts.service.lock(CLIENT_PREFIX, LOCK_DURATION, TIMEOUT).await.unwrap();

    let response = ts.service.lock(OTHER_PREFIX, LOCK_DURATION, TIMEOUT).await.unwrap();

    assert_eq!(response, LockingResponse::AlreadyLocked);
}

#[tokio::test]
async fn test_unlock_rules() {
    let ts = TestSystem::start().await;
    ts.service.lock(CLIENT_PREFIX, LOCK_DURATION, TIMEOUT).await.unwrap();

    let wrong_owner = ts.service.unlock(OTHER_PREFIX, TIMEOUT).await.unwrap();
    assert!(matches!(wrong_owner, LockingResponse::ReleaseFailed(_)));

    let released = ts.service.unlock(CLIENT_PREFIX, TIMEOUT).await.unwrap();
    assert_eq!(released, LockingResponse::LockReleased);

    let again = ts.service.unlock(CLIENT_PREFIX, TIMEOUT).await.unwrap();
    assert_eq!(again, LockingResponse::LockAlreadyReleased);

    let foreign = setup_from(OTHER_PREFIX, commands::IMMEDIATE);
    let response = ts.service.submit(foreign, TIMEOUT).await.unwrap();
    assert!(response.is_completed());
}

#[tokio::test(start_paused = true)]
async fn test_lock_expires_and_owner_is_told() {
    let ts = TestSystem::start().await;

    let (response, mut replies) = ts
        .service
        .lock_and_watch(CLIENT_PREFIX, Duration::from_millis(200), TIMEOUT)
        .await
        .unwrap();
    assert_eq!(response, LockingResponse::LockAcquired);

    let expired = replies.recv().await;
    assert_eq!(expired, Some(LockingResponse::LockExpired));

    let foreign = setup_from(OTHER_PREFIX, commands::IMMEDIATE);
    let response = ts.service.submit(foreign, TIMEOUT).await.unwrap();
    assert!(response.is_completed());
}

#[tokio::test(start_paused = true)]
async fn test_renewal_extends_the_lease() {
    let ts = TestSystem::start().await;
    let lease = Duration::from_millis(200);

    ts.service.lock(CLIENT_PREFIX, lease, TIMEOUT).await.unwrap();
    tokio::time::sleep(Duration::from_millis(150)).await;

    let (renewed, mut replies) = ts
        .service
        .lock_and_watch(CLIENT_PREFIX, lease, TIMEOUT)
        .await
        .unwrap();
    assert_eq!(renewed, LockingResponse::LockAcquired);

    // Past the first deadline, still inside the renewed one
    tokio::time::sleep(Duration::from_millis(100)).await;
    let foreign = setup_from(OTHER_PREFIX, commands::IMMEDIATE);
    let run_id = foreign.run_id();
    let response = ts.service.submit(foreign, TIMEOUT).await.unwrap();
    assert_eq!(response, CommandResponse::Locked { run_id });

    assert_eq!(replies.recv().await, Some(LockingResponse::LockExpired));
}

#[tokio::test]
async fn test_same_submit_proceeds_after_unlock() {
    let ts = TestSystem::start().await;
    let foreign = setup_from(OTHER_PREFIX, commands::LONG_RUNNING);
    let run_id = foreign.run_id();

    ts.service.lock(CLIENT_PREFIX, LOCK_DURATION, TIMEOUT).await.unwrap();
    let refused = ts.service.submit(foreign.clone(), TIMEOUT).await.unwrap();
    assert_eq!(refused, CommandResponse::Locked { run_id });

    ts.service.unlock(CLIENT_PREFIX, TIMEOUT).await.unwrap();

    // Resubmitting under the same run id starts a fresh lifecycle
    let accepted = ts.service.submit(foreign, TIMEOUT).await.unwrap();
    assert_eq!(accepted, CommandResponse::Started { run_id });
    assert_eq!(
        ts.service.query_final(run_id, TIMEOUT).await.unwrap(),
        CommandResponse::completed(run_id)
    );
}

#[tokio::test]
async fn test_unbounded_lock_duration_keeps_component_serving() {
    let ts = TestSystem::start().await;

    let locked = ts.service.lock(CLIENT_PREFIX, Duration::MAX, TIMEOUT).await.unwrap();
    assert_eq!(locked, LockingResponse::LockAcquired);

    let foreign = setup_from(OTHER_PREFIX, commands::IMMEDIATE);
    let run_id = foreign.run_id();
    assert_eq!(
        ts.service.submit(foreign, TIMEOUT).await.unwrap(),
        CommandResponse::Locked { run_id }
    );

    let own = ts.service.submit(setup(commands::IMMEDIATE), TIMEOUT).await.unwrap();
    assert!(own.is_completed());
    assert_eq!(
        ts.service.unlock(CLIENT_PREFIX, TIMEOUT).await.unwrap(),
        LockingResponse::LockReleased
    );
}

#[tokio::test(start_paused = true)]
async fn test_lapsed_lease_is_reported_when_timer_is_held_up() {
    let ts = TestSystem::start().await;
    let (_, mut replies) = ts
        .service
        .lock_and_watch(CLIENT_PREFIX, Duration::from_millis(100), TIMEOUT)
        .await
        .unwrap();

    // Keep the mailbox busy past the lease deadline
    let service = ts.service.clone();
    let slow = tokio::spawn(async move {
        service.submit(setup(commands::SLOW_VALIDATION), TIMEOUT).await
    });
    while ts.handlers.validation_count() == 0 {
        tokio::task::yield_now().await;
    }

    // Queued ahead of the expiry timer's message
    let foreign = setup_from(OTHER_PREFIX, commands::IMMEDIATE);
    let response = ts.service.submit(foreign, TIMEOUT).await.unwrap();
    assert!(response.is_completed());
    assert!(slow.await.unwrap().unwrap().is_completed());

    assert_eq!(replies.recv().await, Some(LockingResponse::LockExpired));
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(replies.try_recv().is_err());
}
