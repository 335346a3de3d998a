//! Integration tests for the simulated BankID login flow.
//!
//! Tests cover:
//! - The qr -> waiting -> success -> callback timeline
//! - The identity payload and unique order references
//! - Cancelling, resetting and restarting attempts
//! - Completion handler failures
//! - Schedule validation and scaling
//! - Starting a new attempt only from the initial step
//! - The tokio driver on a paused clock

mod common;

use std::time::Duration;

use fastighetsportal::login::{Transition, TransitionEffect};
use fastighetsportal::{OrderRef, TokioClock};

use common::*;

#[tokio::test]
async fn test_steps_follow_bankid_timeline() -> anyhow::Result<()> {
    // 1. Start from the initial step
    let (mut flow, clock, delivered) = make_recording_flow();
    assert_eq!(flow.step(), LoginStep::Initial);
    assert!(!flow.is_loading());

    flow.start()?;
    assert_eq!(flow.step(), LoginStep::Qr);
    assert!(flow.is_loading());

    // 2. Nothing fires before the first second
    clock.advance(millis(999));
    assert!(flow.poll().is_empty());
    assert_eq!(flow.step(), LoginStep::Qr);

    // 3. qr -> waiting at 1s
    clock.advance(millis(1));
    assert_eq!(
        flow.poll(),
        vec![LoginEvent::StepChanged {
            from: LoginStep::Qr,
            to: LoginStep::Waiting
        }]
    );
    assert!(flow.is_loading());

    // 4. waiting -> success at 4s
    clock.advance(millis(2_999));
    assert!(flow.poll().is_empty());
    clock.advance(millis(1));
    assert_eq!(
        flow.poll(),
        vec![LoginEvent::StepChanged {
            from: LoginStep::Waiting,
            to: LoginStep::Success
        }]
    );
    assert!(!flow.is_loading());
    assert!(delivered.lock().unwrap().is_empty());

    // 5. Callback at 5s, exactly once
    clock.advance(secs(1));
    let events = flow.poll();
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], LoginEvent::Completed(_)));
    assert_eq!(delivered.lock().unwrap().len(), 1);
    assert!(flow.is_complete());
    assert_eq!(flow.step(), LoginStep::Success);
    assert!(flow.next_deadline().is_none());

    clock.advance(secs(60));
    assert!(flow.poll().is_empty());
    assert_eq!(delivered.lock().unwrap().len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_late_poll_fires_all_due_transitions() -> anyhow::Result<()> {
    // 1. Jump past the whole schedule before polling once
    let (mut flow, clock, delivered) = make_recording_flow();
    flow.start()?;
    clock.advance(secs(10));

    // 2. Every transition fires in order
    let events = flow.poll();
    assert_eq!(events.len(), 3);
    assert_eq!(
        events[0],
        LoginEvent::StepChanged {
            from: LoginStep::Qr,
            to: LoginStep::Waiting
        }
    );
    assert_eq!(
        events[1],
        LoginEvent::StepChanged {
            from: LoginStep::Waiting,
            to: LoginStep::Success
        }
    );
    assert!(matches!(events[2], LoginEvent::Completed(_)));
    assert_eq!(delivered.lock().unwrap().len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_completion_payload() -> anyhow::Result<()> {
    // 1. Run a full attempt
    let (mut flow, clock, delivered) = make_recording_flow();
    let order_ref = flow.start()?;
    assert_eq!(flow.order_ref(), Some(&order_ref));
    clock.advance(secs(5));
    flow.poll();

    // 2. The payload carries the fixed demo identity and this attempt's order
    let delivered = delivered.lock().unwrap();
    let identity = &delivered[0];
    assert_eq!(identity.personal_number, "198001011234");
    assert_eq!(identity.name, "Demo User");
    assert_eq!(identity.order_ref, order_ref.as_str());
    assert!(identity.order_ref.starts_with("mock-order-"));

    Ok(())
}

#[tokio::test]
async fn test_order_refs_are_unique() -> anyhow::Result<()> {
    let refs: std::collections::HashSet<String> = (0..100)
        .map(|_| OrderRef::generate().to_string())
        .collect();
    assert_eq!(refs.len(), 100);
    Ok(())
}

#[tokio::test]
async fn test_cancel_during_qr_never_completes() -> anyhow::Result<()> {
    // 1. Start and cancel while the QR code is shown
    let (mut flow, clock, delivered) = make_recording_flow();
    flow.start()?;
    clock.advance(millis(500));
    flow.cancel()?;
    assert_eq!(flow.step(), LoginStep::Initial);
    assert!(flow.order_ref().is_none());

    // 2. The pending timers are gone
    clock.advance(secs(10));
    assert!(flow.poll().is_empty());
    assert_eq!(flow.step(), LoginStep::Initial);
    assert!(delivered.lock().unwrap().is_empty());

    // 3. A new attempt runs on its own timeline
    let second = flow.start()?;
    clock.advance(secs(5));
    flow.poll();
    let delivered = delivered.lock().unwrap();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].order_ref, second.as_str());

    Ok(())
}

#[tokio::test]
async fn test_cancel_outside_qr_is_rejected() -> anyhow::Result<()> {
    // 1. Nothing to cancel yet
    let (mut flow, clock, delivered) = make_recording_flow();
    assert_eq!(
        flow.cancel(),
        Err(LoginError::NotCancellable(LoginStep::Initial))
    );

    // 2. Waiting cannot be cancelled and the attempt keeps running
    flow.start()?;
    clock.advance(secs(1));
    flow.poll();
    assert_eq!(
        flow.cancel(),
        Err(LoginError::NotCancellable(LoginStep::Waiting))
    );
    clock.advance(secs(4));
    flow.poll();
    assert_eq!(delivered.lock().unwrap().len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_restart_while_running_is_rejected() -> anyhow::Result<()> {
    // 1. A second start during qr is refused
    let (mut flow, clock, delivered) = make_recording_flow();
    let first = flow.start()?;
    assert_eq!(flow.start(), Err(LoginError::AlreadyStarted(LoginStep::Qr)));

    // 2. The original attempt is unaffected
    assert_eq!(flow.order_ref(), Some(&first));
    clock.advance(secs(5));
    flow.poll();
    assert_eq!(delivered.lock().unwrap().len(), 1);

    // 3. After success a new start is still refused until reset
    assert_eq!(
        flow.start(),
        Err(LoginError::AlreadyStarted(LoginStep::Success))
    );

    Ok(())
}

#[tokio::test]
async fn test_reset_discards_running_attempt() -> anyhow::Result<()> {
    // 1. Reset from waiting
    let (mut flow, clock, delivered) = make_recording_flow();
    flow.start()?;
    clock.advance(secs(2));
    flow.poll();
    assert_eq!(flow.step(), LoginStep::Waiting);

    flow.reset();
    assert_eq!(flow.step(), LoginStep::Initial);
    assert!(flow.next_deadline().is_none());

    // 2. No late callback
    clock.advance(secs(10));
    assert!(flow.poll().is_empty());
    assert!(delivered.lock().unwrap().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_failing_handler_resets_flow() -> anyhow::Result<()> {
    // 1. Handler that always fails
    let clock = ManualClock::new();
    let mut flow = LoginFlow::new(clock.clone())
        .with_completion_handler(|_| anyhow::bail!("session store unavailable"));
    flow.start()?;

    // 2. The failure is reported and the flow returns to the start
    clock.advance(secs(5));
    let events = flow.poll();
    assert_eq!(
        events.last(),
        Some(&LoginEvent::Reset {
            reason: "session store unavailable".to_string()
        })
    );
    assert_eq!(flow.step(), LoginStep::Initial);
    assert!(!flow.is_complete());

    // 3. The user may try again
    flow.start()?;
    assert_eq!(flow.step(), LoginStep::Qr);

    Ok(())
}

#[tokio::test]
async fn test_schedule_validation() -> anyhow::Result<()> {
    // 1. Empty and non-completing schedules are refused
    assert!(LoginSchedule::new(vec![]).is_err());
    assert!(LoginSchedule::new(vec![Transition::enter(secs(1), LoginStep::Waiting)]).is_err());

    // 2. Completing twice is refused
    assert!(
        LoginSchedule::new(vec![
            Transition::complete(secs(1)),
            Transition::complete(secs(1)),
        ])
        .is_err()
    );

    // 3. Initial and Qr cannot be scheduled
    assert!(
        LoginSchedule::new(vec![
            Transition::enter(secs(1), LoginStep::Initial),
            Transition::complete(secs(1)),
        ])
        .is_err()
    );
    assert!(
        LoginSchedule::new(vec![
            Transition::enter(secs(1), LoginStep::Waiting),
            Transition::enter(secs(1), LoginStep::Qr),
            Transition::complete(secs(1)),
        ])
        .is_err()
    );

    // 4. The BankID schedule totals five seconds
    let bankid = LoginSchedule::bankid();
    assert_eq!(bankid.total_delay(), secs(5));
    assert_eq!(
        bankid.transitions().last().map(|t| t.effect),
        Some(TransitionEffect::Complete)
    );
    assert_eq!(LoginSchedule::default(), bankid);

    // 5. Scaling keeps the shape
    let fast = bankid.scaled(0.1)?;
    assert_eq!(fast.total_delay(), millis(500));
    assert_eq!(fast.transitions().len(), 3);
    assert_eq!(bankid.scaled(0.0)?.total_delay(), Duration::ZERO);

    Ok(())
}

#[tokio::test]
async fn test_unrepresentable_scaling_is_refused() -> anyhow::Result<()> {
    let bankid = LoginSchedule::bankid();
    for factor in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN, f64::MAX, -1.0] {
        assert!(bankid.scaled(factor).is_err(), "factor {} accepted", factor);
    }

    Ok(())
}

#[tokio::test]
async fn test_custom_schedule_drives_flow() -> anyhow::Result<()> {
    // 1. Skip the waiting step entirely
    let schedule = LoginSchedule::new(vec![
        Transition::enter(millis(10), LoginStep::Success),
        Transition::complete(millis(10)),
    ])?;
    let (flow, clock, delivered) = make_recording_flow();
    let mut flow = flow.with_schedule(schedule);
    flow.start()?;

    // 2. qr -> success -> callback
    clock.advance(millis(10));
    assert_eq!(
        flow.poll(),
        vec![LoginEvent::StepChanged {
            from: LoginStep::Qr,
            to: LoginStep::Success
        }]
    );
    clock.advance(millis(10));
    flow.poll();
    assert_eq!(delivered.lock().unwrap().len(), 1);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_driver_completes_after_five_seconds() -> anyhow::Result<()> {
    // 1. Run the real driver on the paused tokio clock
    let started = tokio::time::Instant::now();
    let mut flow = LoginFlow::new(TokioClock);
    flow.start()?;

    let mut steps = Vec::new();
    let identity = flow
        .run(|event| {
            if let LoginEvent::StepChanged { to, .. } = event {
                steps.push(*to);
            }
        })
        .await;

    // 2. All steps were seen and the whole flow took five seconds
    assert_eq!(steps, vec![LoginStep::Waiting, LoginStep::Success]);
    let identity = identity.expect("flow should complete");
    assert_eq!(identity.name, "Demo User");
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(5), "finished early: {:?}", elapsed);
    assert!(elapsed < Duration::from_millis(5_050), "finished late: {:?}", elapsed);

    Ok(())
}

#[tokio::test]
async fn test_custom_identity_is_issued() -> anyhow::Result<()> {
    use fastighetsportal::login::DemoIdentity;

    // 1. Swap in another test person
    let clock = ManualClock::new();
    let mut flow = LoginFlow::new(clock.clone()).with_identity(DemoIdentity {
        personal_number: "199002021234".to_string(),
        name: "Test Testsson".to_string(),
    });
    let order_ref = flow.start()?;

    // 2. The completion event carries it with this attempt's order
    clock.advance(flow.schedule().total_delay());
    let events = flow.poll();
    assert_eq!(
        events.last(),
        Some(&LoginEvent::Completed(SessionIdentity {
            personal_number: "199002021234".to_string(),
            name: "Test Testsson".to_string(),
            order_ref: order_ref.to_string(),
        }))
    );

    Ok(())
}

#[tokio::test]
async fn test_running_attempt_never_returns_to_initial() -> anyhow::Result<()> {
    // 1. Walk the whole BankID timeline in small steps
    let (mut flow, clock, delivered) = make_recording_flow();
    flow.start()?;
    while flow.next_deadline().is_some() {
        clock.advance(millis(250));
        for event in flow.poll() {
            if let LoginEvent::StepChanged { to, .. } = event {
                assert_ne!(to, LoginStep::Initial);
                assert_ne!(to, LoginStep::Qr);
            }
        }

        // 2. A second start is refused at every point along the way
        if flow.next_deadline().is_some() {
            assert!(flow.start().is_err());
        }
    }

    // 3. Exactly one delivery
    assert_eq!(delivered.lock().unwrap().len(), 1);

    Ok(())
}
