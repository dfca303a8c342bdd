//! Current-state subscriptions through the command service

mod common;

use std::time::Duration;

use common::*;
use cmdctl_core::models::{CurrentState, StateName};
use cmdctl_core::params::ParameterSetType;
use cmdctl_core::test_helpers::{
    choice_key, choices, commands, encoder_key, TEST_STATE_NAME, TEST_STATE_SETUP,
};
use tokio::sync::mpsc;

fn announcement(choice: &str) -> CurrentState {
    CurrentState::new(HCD_PREFIX, TEST_STATE_NAME).add(choice_key().set([choice.to_string()]))
}

fn setup_state(encoder: &[i32]) -> CurrentState {
    CurrentState::new(HCD_PREFIX, TEST_STATE_SETUP)
        .add(choice_key().set([choices::SETUP_CONFIG.to_string()]))
        .add(encoder_key().set(encoder.to_vec()))
}

#[tokio::test]
async fn test_subscriber_sees_every_state_in_order_until_unsubscribed() {
    let ts = TestSystem::start().await;
    let (tx, mut rx) = mpsc::unbounded_channel();
    let subscription = ts
        .service
        .subscribe_current_state(move |state| {
            let _ = tx.send(state);
        })
        .await
        .unwrap();

    let command = setup(commands::ACCEPTED).add(encoder_key().set([22, 23]));
    ts.service.submit(command.clone(), TIMEOUT).await.unwrap();

    assert_eq!(rx.recv().await, Some(announcement(choices::COMMAND_VALIDATION)));
    assert_eq!(rx.recv().await, Some(announcement(choices::SUBMIT_COMMAND)));
    assert_eq!(rx.recv().await, Some(setup_state(&[22, 23])));

    subscription.unsubscribe().await.unwrap();

    ts.service
        .submit(command.clone_command(), TIMEOUT)
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_subscribe_only_filters_by_state_name() {
    let ts = TestSystem::start().await;
    let (tx, mut rx) = mpsc::unbounded_channel();
    let _subscription = ts
        .service
        .subscribe_only_current_state([StateName::new(TEST_STATE_SETUP)], move |state| {
            let _ = tx.send(state);
        })
        .await
        .unwrap();

    let command = setup(commands::ACCEPTED).add(encoder_key().set([22, 23]));
    ts.service.submit(command, TIMEOUT).await.unwrap();

    assert_eq!(rx.recv().await, Some(setup_state(&[22, 23])));
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_stream_preserves_publication_order() {
    let ts = TestSystem::start().await;
    let mut stream = ts.service.current_state_stream(None).await.unwrap();
    let publisher = ts.component.publisher();

    for value in 0..10 {
        publisher
            .publish(CurrentState::new(HCD_PREFIX, "position").add(encoder_key().set([value])))
            .await
            .unwrap();
    }

    for value in 0..10 {
        let state = stream.recv().await.unwrap();
        assert_eq!(
            state.get(&encoder_key()).unwrap().values_as::<i32>(),
            Some(vec![value])
        );
    }
}

#[tokio::test]
async fn test_every_subscriber_receives_each_publication() {
    let ts = TestSystem::start().await;
    let mut first = ts.service.current_state_stream(None).await.unwrap();
    let mut second = ts
        .service
        .current_state_stream(Some([StateName::new("position")].into_iter().collect()))
        .await
        .unwrap();

    let state = CurrentState::new(HCD_PREFIX, "position").add(encoder_key().set([5]));
    ts.component.publisher().publish(state.clone()).await.unwrap();

    assert_eq!(first.recv().await, Some(state.clone()));
    assert_eq!(second.recv().await, Some(state));
}

#[tokio::test]
async fn test_unsubscribed_stream_ends_after_draining() {
    let ts = TestSystem::start().await;
    let mut stream = ts.service.current_state_stream(None).await.unwrap();
    let state = CurrentState::new(HCD_PREFIX, "position");

    ts.component.publisher().publish(state.clone()).await.unwrap();
    stream.unsubscribe().await.unwrap();
    ts.component.publisher().publish(state.clone()).await.unwrap();

    assert_eq!(stream.recv().await, Some(state));
    assert_eq!(stream.recv().await, None);
}
