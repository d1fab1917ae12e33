//! Auto-analysis pipeline: whiteboard input in, coordinated analyses out.

use std::sync::Arc;

use board_core::{DebounceConfig, StrokeDetector, Whiteboard};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::coordinator::AnalysisCoordinator;

/// Handle to a running auto-analysis pipeline.
///
/// Dropping the handle aborts the pipeline and any pending stroke timer.
#[derive(Debug)]
#[must_use = "dropping the handle stops the pipeline"]
pub struct AutoAnalysis {
    task: Option<JoinHandle<()>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl AutoAnalysis {
    /// Whether the pipeline task has ended.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        match &self.task {
            Some(task) => task.is_finished(),
            None => true,
        }
    }

    /// Stop the pipeline and wait for it to exit.
    ///
    /// Analyses already handed to the coordinator keep running.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "auto-analysis task failed");
            }
        }
    }

    /// Stop the pipeline without waiting.
    pub fn abort(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for AutoAnalysis {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Wire a whiteboard to a coordinator.
///
/// The pipeline feeds the board's input stream (element count changes and
/// pointer events, in the order they happened) into a [`StrokeDetector`]
/// and forwards every debounced completion to
/// [`AnalysisCoordinator::handle_stroke_completed`]. Input published after
/// this call returns is observed.
///
/// Must be called from within a Tokio runtime.
pub fn spawn_auto_analysis(
    board: &Whiteboard,
    config: DebounceConfig,
    coordinator: Arc<AnalysisCoordinator>,
) -> AutoAnalysis {
    let mut input = board.subscribe();
    let initial = board.element_count();
    let board = board.clone();
    let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

    let task = tokio::spawn(async move {
        let (detector, mut completed_rx) = StrokeDetector::channel(config);
        let mut detector = detector.with_initial_count(initial);
        tracing::debug!(initial, delay_ms = config.delay.as_millis(), "auto-analysis started");

        loop {
            tokio::select! {
                _ = &mut shutdown_rx => break,
                event = input.recv() => match event {
                    Ok(event) => detector.on_input(&event),
                    Err(RecvError::Lagged(skipped)) => {
                        let count = board.element_count();
                        tracing::warn!(skipped, count, "input stream lagged, resyncing element count");
                        detector.on_canvas_changed(count);
                    }
                    Err(RecvError::Closed) => break,
                },
                Some(completed) = completed_rx.recv() => {
                    let disposition = coordinator.handle_stroke_completed();
                    tracing::debug!(
                        sequence = completed.sequence,
                        elements = completed.element_count,
                        ?disposition,
                        "stroke completed"
                    );
                }
            }
        }
        tracing::debug!("auto-analysis stopped");
    });

    AutoAnalysis {
        task: Some(task),
        shutdown_tx: Some(shutdown_tx),
    }
}
