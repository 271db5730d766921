// SPDX-License-Identifier: MIT

use super::*;
use mcsup_core::FakeClock;
use std::sync::Mutex as StdMutex;

fn record_action(order: Arc<StdMutex<Vec<&'static str>>>, label: &'static str) -> Action {
    Box::new(move || {
        Box::pin(async move {
            order.lock().unwrap_or_else(|e| e.into_inner()).push(label);
        })
    })
}

#[test]
fn cancel_unknown_handle_is_an_error() {
    let scheduler = Scheduler::new(FakeClock::new());
    let bogus = Handle(999);
    assert_eq!(scheduler.cancel(bogus), Err(UnknownHandle));
}

#[test]
fn cancel_then_enter_cancel_round_trip_leaves_queue_unchanged() {
    let clock = FakeClock::new();
    let scheduler = Scheduler::new(clock);
    let order = Arc::new(StdMutex::new(Vec::new()));

    let h1 = scheduler.enter(Duration::from_secs(1), 1, record_action(order.clone(), "a"));
    assert!(scheduler.cancel(h1).is_ok());
    // Already cancelled: cancelling again is unknown.
    assert!(scheduler.cancel(h1).is_err());
    assert!(scheduler.next_deadline().is_none() || scheduler.pop_ready().is_none());
}

#[tokio::test(start_paused = true)]
async fn fires_in_non_decreasing_fire_at_priority_insertion_order() {
    let clock = mcsup_core::SystemClock;
    let scheduler = Scheduler::new(clock);
    let order = Arc::new(StdMutex::new(Vec::new()));

    // Same fire time, priority breaks the tie.
    scheduler.enter(Duration::from_millis(10), 5, record_action(order.clone(), "low-pri"));
    scheduler.enter(Duration::from_millis(10), 1, record_action(order.clone(), "high-pri"));
    // Fires after both of the above.
    scheduler.enter(Duration::from_millis(20), 1, record_action(order.clone(), "later"));

    let sched = scheduler.clone();
    let runner = tokio::spawn(async move { sched.run().await });

    tokio::time::sleep(Duration::from_millis(50)).await;
    runner.abort();

    let seen = order.lock().unwrap_or_else(|e| e.into_inner()).clone();
    assert_eq!(seen, vec!["high-pri", "low-pri", "later"]);
}

#[tokio::test]
async fn cancelled_entry_never_fires() {
    let scheduler = Scheduler::new(mcsup_core::SystemClock);
    let order = Arc::new(StdMutex::new(Vec::new()));

    let h = scheduler.enter(Duration::from_millis(5), 1, record_action(order.clone(), "doomed"));
    scheduler.enter(Duration::from_millis(15), 1, record_action(order.clone(), "survivor"));
    assert!(scheduler.cancel(h).is_ok());

    let sched = scheduler.clone();
    let runner = tokio::spawn(async move { sched.run().await });
    tokio::time::sleep(Duration::from_millis(40)).await;
    runner.abort();

    let seen = order.lock().unwrap_or_else(|e| e.into_inner()).clone();
    assert_eq!(seen, vec!["survivor"]);
}
