use futures_lite::future::{block_on, poll_once, zip};
use futures_wye::prelude::*;
use futures_wye::primitive::{Ref, Signal};
use futures_wye::{process, Cause, Failure};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn new_observer_sees_current_value() {
    init_tracing();
    block_on(async {
        let signal = Signal::with_value(3);
        signal.set(4).unwrap();
        let mut late = signal.discrete();
        assert_eq!(late.next().await, Step::Emit(4));

        let mut pull = Box::pin(late.next());
        assert!(poll_once(&mut pull).await.is_none());
        signal.set(5).unwrap();
        assert_eq!(pull.await, Step::Emit(5));
    })
}

#[test]
fn discrete_waits_for_first_value() {
    init_tracing();
    block_on(async {
        let signal = Signal::new();
        let mut updates = signal.discrete();
        let writer = async {
            futures_lite::future::yield_now().await;
            signal.set("ready").unwrap();
        };
        let (step, ()) = zip(updates.next(), writer).await;
        assert_eq!(step, Step::Emit("ready"));
    })
}

#[test]
fn failing_halts_observers() {
    init_tracing();
    block_on(async {
        let signal = Signal::with_value(0);
        let mut updates = signal.discrete();
        let mut changed = signal.changed();
        assert_eq!(updates.next().await, Step::Emit(0));

        let failure = Failure::msg("sensor lost");
        signal.fail(failure.clone());
        assert_eq!(updates.next().await, Step::Halt(Cause::Error(failure.clone())));
        assert_eq!(changed.next().await, Step::Halt(Cause::Error(failure.clone())));
        assert_eq!(signal.get().await, Err(Cause::Error(failure.clone())));
        assert_eq!(signal.set(1), Err(Cause::Error(failure)));
    })
}

#[test]
fn changed_tracks_sets_between_pulls() {
    init_tracing();
    block_on(async {
        let signal = Signal::with_value(0);
        let mut changed = signal.changed();
        signal.modify(|n| n + 1).unwrap();
        signal.modify(|n| n + 1).unwrap();
        assert_eq!(changed.next().await, Step::Emit(true));
        assert_eq!(changed.next().await, Step::Emit(false));
        assert_eq!(signal.get().await, Ok(2));
    })
}

#[test]
fn interrupt_stops_on_true() {
    init_tracing();
    block_on(async {
        let stop = Signal::with_value(false);
        let mut work = process::repeat(1).interrupt_when(stop.discrete());
        assert_eq!(work.next().await, Step::Emit(1));
        stop.set(true).unwrap();

        let mut emitted = 0;
        let cause = loop {
            match work.next().await {
                Step::Emit(_) => emitted += 1,
                Step::Halt(cause) => break cause,
            }
        };
        assert!(emitted < 3, "{emitted} values after the stop");
        assert!(cause.is_clean());
        work.kill().await.unwrap();
    })
}

#[test]
fn ref_reads_only_newer_versions() {
    init_tracing();
    block_on(async {
        let cell = Ref::with_value(1);
        assert_eq!(cell.get(false, 0).await, Ok((0, 1)));

        let mut newer = Box::pin(cell.get(true, 0));
        assert!(poll_once(&mut newer).await.is_none());
        cell.set(|prev| prev.map(|n| n * 10)).unwrap();
        assert_eq!(newer.await, Ok((1, 10)));

        cell.close();
        assert_eq!(cell.get(false, 0).await, Err(Cause::Clean));
        assert_eq!(cell.version(), 1);
    })
}
