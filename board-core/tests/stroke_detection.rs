//! Stroke Detection Integration Tests
//!
//! Drives the detector the way a host does: element changes come from the
//! whiteboard, pointer events from the input layer.
//! - Debounced completion after a pause
//! - Rapid strokes re-arming the timer
//! - In-progress flag tracking under arbitrary event sequences

use std::time::Duration;

use board_core::{
    DebounceConfig, Element, InputEvent, PointerEvent, StrokeDetector, Whiteboard,
};
use proptest::prelude::*;

async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

fn draw(board: &Whiteboard, detector: &mut StrokeDetector) {
    board
        .add_element(Element::freedraw(&[(0.0, 0.0), (10.0, 10.0)]))
        .expect("valid stroke");
    detector.on_canvas_changed(board.element_count());
}

// ============================================================================
// Debounce Timing Tests
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_single_stroke_completes_after_pause() {
    let board = Whiteboard::default();
    let (mut detector, mut rx) = StrokeDetector::channel(DebounceConfig::default());

    detector.on_pointer(&PointerEvent::down());
    draw(&board, &mut detector);
    detector.on_pointer(&PointerEvent::up());

    tokio::time::sleep(Duration::from_millis(1500)).await;
    settle().await;

    let completed = rx.try_recv().expect("stroke completion");
    assert_eq!(completed.element_count, 1);
    assert!(rx.try_recv().is_err(), "exactly one completion");
}

#[tokio::test(start_paused = true)]
async fn test_rapid_strokes_fire_once_after_last() {
    let board = Whiteboard::default();
    let (mut detector, mut rx) = StrokeDetector::channel(DebounceConfig::default());

    // Five strokes, 300 ms apart, each well inside the debounce window.
    for _ in 0..5 {
        detector.on_pointer_down();
        draw(&board, &mut detector);
        detector.on_pointer_up();
        tokio::time::sleep(Duration::from_millis(300)).await;
        settle().await;
        assert!(rx.try_recv().is_err(), "no completion mid-burst");
    }

    tokio::time::sleep(Duration::from_millis(1200)).await;
    settle().await;

    let completed = rx.try_recv().expect("completion after the burst");
    assert_eq!(completed.element_count, 5);
    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_up_without_drawing_never_fires() {
    let (mut detector, mut rx) = StrokeDetector::channel(DebounceConfig::default());

    detector.on_pointer_down();
    detector.on_pointer_up();

    tokio::time::sleep(Duration::from_secs(10)).await;
    settle().await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_erasing_does_not_count_as_stroke() {
    let board = Whiteboard::default();
    let (mut detector, mut rx) = StrokeDetector::channel(DebounceConfig::default());

    let id = board
        .add_element(Element::freedraw(&[(1.0, 1.0)]))
        .expect("add");
    detector.on_canvas_changed(board.element_count());
    detector.on_pointer_down();

    board.remove_element(&id).expect("remove");
    detector.on_input(&InputEvent::ElementsChanged {
        count: board.element_count(),
    });
    detector.on_pointer_up();

    tokio::time::sleep(Duration::from_secs(3)).await;
    settle().await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_custom_delay() {
    let config = DebounceConfig::default().with_delay(Duration::from_millis(250));
    let (mut detector, mut rx) = StrokeDetector::channel(config);

    detector.on_canvas_changed(1);
    detector.on_pointer_up();

    tokio::time::sleep(Duration::from_millis(250)).await;
    settle().await;
    assert!(rx.try_recv().is_ok());
}

// ============================================================================
// Property Tests
// ============================================================================

#[derive(Debug, Clone)]
enum Op {
    Changed(usize),
    Down,
    Up,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..20).prop_map(Op::Changed),
        Just(Op::Down),
        Just(Op::Up),
    ]
}

proptest! {
    #[test]
    fn in_progress_tracks_increase_since_last_reset(ops in prop::collection::vec(op_strategy(), 0..60)) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .start_paused(true)
            .build()
            .expect("runtime");
        let _guard = runtime.enter();

        let (mut detector, _rx) = StrokeDetector::channel(DebounceConfig::default());
        let mut last = 0usize;
        let mut increased = false;

        for op in ops {
            match op {
                Op::Changed(count) => {
                    if count > last {
                        increased = true;
                    }
                    last = count;
                    detector.on_canvas_changed(count);
                }
                Op::Down => {
                    increased = false;
                    detector.on_pointer_down();
                }
                Op::Up => {
                    let armed = detector.on_pointer_up();
                    prop_assert_eq!(armed, increased);
                    increased = false;
                }
            }
            prop_assert_eq!(detector.is_in_progress(), increased);
            prop_assert_eq!(detector.last_count(), last);
        }
    }
}
