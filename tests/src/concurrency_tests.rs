//! Edge-handler writes racing scheduler snapshots

use std::sync::Arc;

use keyer_core::timing::{MAX_WPM, MIN_WPM};
use keyer_core::{KeyerState, PaddleLevels, SharedKeyerState, TimingProfile};

const EDGES: usize = 50_000;

fn edge(n: usize) -> PaddleLevels {
    match n % 7 {
        0 => PaddleLevels::new(true, false),
        1 => PaddleLevels::new(true, true),
        2 => PaddleLevels::new(false, true),
        3 => PaddleLevels::adjusting(false, true),
        4 => PaddleLevels::RELEASED,
        5 => PaddleLevels::adjusting(true, false),
        _ => PaddleLevels::new(false, true),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn snapshots_never_tear() {
    let shared = Arc::new(SharedKeyerState::new());

    let writer = {
        let shared = shared.clone();
        tokio::task::spawn_blocking(move || {
            for n in 0..EDGES {
                shared.on_paddle_edge(edge(n));
            }
        })
    };

    let reader = {
        let shared = shared.clone();
        tokio::task::spawn_blocking(move || {
            for _ in 0..EDGES {
                let snapshot = shared.snapshot();
                let wpm = snapshot.timing.speed_wpm;
                assert!((MIN_WPM..=MAX_WPM).contains(&wpm));
                assert_eq!(snapshot.timing, TimingProfile::from_wpm(wpm));
            }
        })
    };

    writer.await.unwrap();
    reader.await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_speed_steps_are_not_lost() {
    let shared = Arc::new(SharedKeyerState::with_wpm(MIN_WPM));

    let tasks: Vec<_> = (0..4)
        .map(|_| {
            let shared = shared.clone();
            tokio::task::spawn_blocking(move || {
                for _ in 0..5 {
                    shared.on_paddle_edge(PaddleLevels::adjusting(false, true));
                    shared.on_paddle_edge(PaddleLevels::adjusting(false, false));
                }
            })
        })
        .collect();

    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(shared.wpm(), MIN_WPM + 20);
    assert_eq!(shared.state(), KeyerState::Idle);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn speed_steps_do_not_disturb_paddle_state() {
    let shared = Arc::new(SharedKeyerState::new());
    shared.on_paddle_edge(PaddleLevels::new(true, true));

    let adjuster = {
        let shared = shared.clone();
        tokio::task::spawn_blocking(move || {
            for n in 0..1_000 {
                shared.on_paddle_edge(PaddleLevels::adjusting(n % 2 == 0, n % 2 == 1));
            }
        })
    };
    adjuster.await.unwrap();

    assert_eq!(shared.state(), KeyerState::SqueezeDitFirst);
    assert_eq!(shared.wpm(), 15);
}

#[tokio::test]
async fn edge_handler_reports_the_new_snapshot() {
    let shared = SharedKeyerState::new();

    let snapshot = shared.on_paddle_edge(PaddleLevels::new(false, true));
    assert_eq!(snapshot.state, KeyerState::SendingDah);
    assert_eq!(snapshot, shared.snapshot());

    shared.set_speed(99);
    assert_eq!(shared.snapshot().timing, TimingProfile::from_wpm(MAX_WPM));

    shared.reset();
    assert_eq!(shared.state(), KeyerState::Idle);
    assert_eq!(shared.wpm(), MAX_WPM);
}
