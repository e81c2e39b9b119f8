//! Toolkit-independent UI state and background run dispatch.
//!
//! The window code only renders what [`UiController`] says and forwards
//! user actions to it. Pipeline runs execute on a tokio blocking thread and
//! report back through a channel drained on the UI thread, so widgets are
//! never touched from the worker.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{info, warn};

use crate::error::{PipelineError, PipelineResult};
use crate::log_pipeline_error;
use crate::pipeline::PipelineOutput;
use crate::visualize::VisualizationPair;

pub type RunId = u64;

pub const READY_STATUS: &str = "Select a PDF file to summarize.";
pub const PROCESSING_STATUS: &str = "Processing... please wait.";
pub const DONE_STATUS: &str = "Summarization complete.";
pub const FAILED_STATUS: &str = "Processing failed.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Selecting,
    Processing,
    Displaying,
    Failed,
}

/// Completion notice sent from the worker to the UI thread
#[derive(Debug)]
pub struct RunMessage {
    pub run_id: RunId,
    pub outcome: PipelineResult<PipelineOutput>,
}

#[derive(Debug)]
struct ActiveRun {
    id: RunId,
    path: PathBuf,
}

/// State machine behind the window:
/// `Idle → Selecting → Processing → (Displaying | Failed) → Idle`.
#[derive(Debug)]
pub struct UiController {
    phase: Phase,
    next_run: RunId,
    active: Option<ActiveRun>,
    status: String,
    summary: String,
    visuals: Option<VisualizationPair>,
    /// Bumped whenever `visuals` is replaced so the view can re-upload textures
    visuals_version: u64,
    pending_error: Option<String>,
}

impl Default for UiController {
    fn default() -> Self {
        Self::new()
    }
}

impl UiController {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            next_run: 1,
            active: None,
            status: READY_STATUS.to_string(),
            summary: String::new(),
            visuals: None,
            visuals_version: 0,
            pending_error: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The trigger is usable whenever no selection or run is in flight
    pub fn trigger_enabled(&self) -> bool {
        !matches!(self.phase, Phase::Selecting | Phase::Processing)
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn visuals(&self) -> Option<&VisualizationPair> {
        self.visuals.as_ref()
    }

    pub fn visuals_version(&self) -> u64 {
        self.visuals_version
    }

    pub fn active_path(&self) -> Option<&Path> {
        self.active.as_ref().map(|run| run.path.as_path())
    }

    /// Returns false (and changes nothing) while a run is in flight.
    pub fn begin_selection(&mut self) -> bool {
        if !self.trigger_enabled() {
            return false;
        }
        self.settle();
        self.phase = Phase::Selecting;
        true
    }

    pub fn cancel_selection(&mut self) {
        if self.phase == Phase::Selecting {
            self.phase = Phase::Idle;
        }
    }

    /// Moves to `Processing` and hands out the id the worker must report back with.
    pub fn start_processing(&mut self, path: PathBuf) -> Option<RunId> {
        if self.phase != Phase::Selecting {
            return None;
        }
        let id = self.next_run;
        self.next_run += 1;

        info!(run_id = id, file = %path.display(), "Run started");
        self.active = Some(ActiveRun { id, path });
        self.phase = Phase::Processing;
        self.status = PROCESSING_STATUS.to_string();
        Some(id)
    }

    /// Applies a worker result. Results for runs that are no longer active
    /// are dropped and `false` is returned.
    pub fn finish(&mut self, message: RunMessage) -> bool {
        let is_active = self.active.as_ref().map_or(false, |run| run.id == message.run_id);
        if !is_active || self.phase != Phase::Processing {
            warn!(run_id = message.run_id, "Ignoring result of inactive run");
            return false;
        }
        self.active = None;

        match message.outcome {
            Ok(output) => {
                info!(run_id = message.run_id, chunks = output.summary.chunk_count, "Run succeeded");
                self.summary = output.summary.text;
                self.visuals = Some(output.visuals);
                self.visuals_version += 1;
                self.status = DONE_STATUS.to_string();
                self.phase = Phase::Displaying;
            }
            Err(error) => {
                log_pipeline_error!(message.run_id, error);
                // Previous summary and images stay on screen
                self.pending_error = Some(error.user_message());
                self.status = FAILED_STATUS.to_string();
                self.phase = Phase::Failed;
            }
        }
        true
    }

    /// Error waiting to be shown to the user; taking it settles `Failed` into `Idle`.
    pub fn take_error(&mut self) -> Option<String> {
        let error = self.pending_error.take();
        if error.is_some() && self.phase == Phase::Failed {
            self.phase = Phase::Idle;
        }
        error
    }

    /// `Displaying` and `Failed` both rest in `Idle`
    fn settle(&mut self) {
        if matches!(self.phase, Phase::Displaying | Phase::Failed) {
            self.phase = Phase::Idle;
        }
    }
}

type RepaintHook = Arc<dyn Fn() + Send + Sync>;

/// Runs pipeline jobs off the UI thread and collects their results.
pub struct RunDispatcher {
    runtime: Option<Runtime>,
    tx: UnboundedSender<RunMessage>,
    rx: UnboundedReceiver<RunMessage>,
    timeout: Duration,
    repaint: Option<RepaintHook>,
}

impl RunDispatcher {
    pub fn new(timeout: Duration) -> std::io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("pipeline")
            .enable_time()
            .build()?;
        let (tx, rx) = unbounded_channel();
        Ok(Self {
            runtime: Some(runtime),
            tx,
            rx,
            timeout,
            repaint: None,
        })
    }

    /// Called after every completion so an idle UI wakes up
    pub fn set_repaint_hook(&mut self, hook: impl Fn() + Send + Sync + 'static) {
        self.repaint = Some(Arc::new(hook));
    }

    /// Starts `job` on a blocking thread. When it outlives the timeout a
    /// `Timeout` error is delivered instead and the job's late result is dropped.
    pub fn dispatch<F>(&self, run_id: RunId, job: F)
    where
        F: FnOnce() -> PipelineResult<PipelineOutput> + Send + 'static,
    {
        let Some(runtime) = self.runtime.as_ref() else {
            return;
        };
        let tx = self.tx.clone();
        let repaint = self.repaint.clone();
        let timeout = self.timeout;

        runtime.spawn(async move {
            let outcome = match tokio::time::timeout(timeout, tokio::task::spawn_blocking(job)).await {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(join_error)) => Err(PipelineError::Task {
                    message: join_error.to_string(),
                }),
                Err(_) => Err(PipelineError::Timeout {
                    seconds: timeout.as_secs(),
                }),
            };
            if tx.send(RunMessage { run_id, outcome }).is_err() {
                warn!(run_id, "UI went away before the run finished");
            }
            if let Some(repaint) = repaint {
                repaint();
            }
        });
    }

    /// Next finished run, if any; never blocks
    pub fn try_next(&mut self) -> Option<RunMessage> {
        self.rx.try_recv().ok()
    }

    /// Blocks until a run finishes; for headless callers and tests
    pub fn wait_next(&mut self) -> Option<RunMessage> {
        self.rx.blocking_recv()
    }
}

impl Drop for RunDispatcher {
    fn drop(&mut self) {
        // A hung model call must not keep the process alive on exit
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ExtractionError, VisualizationError};
    use crate::summarizer::Summary;
    use image::RgbaImage;

    fn output(text: &str) -> PipelineOutput {
        PipelineOutput {
            summary: Summary {
                text: text.to_string(),
                chunk_count: 1,
            },
            visuals: VisualizationPair {
                bar_chart: RgbaImage::new(2, 2),
                word_cloud: RgbaImage::new(2, 2),
                top_words: vec![(text.to_string(), 1)],
            },
            source_chars: text.len(),
        }
    }

    fn start(controller: &mut UiController) -> RunId {
        assert!(controller.begin_selection());
        controller.start_processing(PathBuf::from("doc.pdf")).unwrap()
    }

    #[test]
    fn test_initial_state() {
        let controller = UiController::new();
        assert_eq!(controller.phase(), Phase::Idle);
        assert!(controller.trigger_enabled());
        assert_eq!(controller.status(), READY_STATUS);
        assert!(controller.visuals().is_none());
    }

    #[test]
    fn test_cancelled_selection_returns_to_idle() {
        let mut controller = UiController::new();
        assert!(controller.begin_selection());
        assert!(!controller.trigger_enabled());
        controller.cancel_selection();
        assert_eq!(controller.phase(), Phase::Idle);
        assert!(controller.trigger_enabled());
    }

    #[test]
    fn test_successful_run_displays_results() {
        let mut controller = UiController::new();
        let id = start(&mut controller);
        assert_eq!(controller.phase(), Phase::Processing);
        assert!(!controller.trigger_enabled());
        assert!(!controller.begin_selection());

        assert!(controller.finish(RunMessage { run_id: id, outcome: Ok(output("alpha")) }));

        assert_eq!(controller.phase(), Phase::Displaying);
        assert!(controller.trigger_enabled());
        assert_eq!(controller.summary(), "alpha");
        assert_eq!(controller.status(), DONE_STATUS);
        assert_eq!(controller.visuals_version(), 1);
    }

    #[test]
    fn test_failed_run_keeps_previous_results() {
        let mut controller = UiController::new();
        let first = start(&mut controller);
        controller.finish(RunMessage { run_id: first, outcome: Ok(output("alpha")) });

        let second = start(&mut controller);
        let error = ExtractionError::Parse {
            path: "bad.pdf".to_string(),
            message: "invalid file header".to_string(),
        };
        controller.finish(RunMessage { run_id: second, outcome: Err(error.into()) });

        assert_eq!(controller.phase(), Phase::Failed);
        assert!(controller.trigger_enabled());
        assert_eq!(controller.summary(), "alpha");
        assert_eq!(controller.visuals_version(), 1);
        assert_eq!(controller.status(), FAILED_STATUS);

        let message = controller.take_error().unwrap();
        assert!(message.contains("bad.pdf"));
        assert_eq!(controller.phase(), Phase::Idle);
        assert!(controller.take_error().is_none());
    }

    #[test]
    fn test_stale_results_are_ignored() {
        let mut controller = UiController::new();
        let first = start(&mut controller);
        controller.finish(RunMessage {
            run_id: first,
            outcome: Err(PipelineError::Timeout { seconds: 1 }),
        });
        controller.take_error();

        let second = start(&mut controller);
        assert!(!controller.finish(RunMessage { run_id: first, outcome: Ok(output("late")) }));
        assert_eq!(controller.phase(), Phase::Processing);

        assert!(controller.finish(RunMessage { run_id: second, outcome: Ok(output("fresh")) }));
        assert_eq!(controller.summary(), "fresh");
    }

    #[test]
    fn test_start_requires_selection() {
        let mut controller = UiController::new();
        assert!(controller.start_processing(PathBuf::from("doc.pdf")).is_none());
        assert_eq!(controller.phase(), Phase::Idle);
    }

    #[test]
    fn test_dispatcher_delivers_result() {
        let mut dispatcher = RunDispatcher::new(Duration::from_secs(5)).unwrap();
        dispatcher.dispatch(7, || Ok(output("done")));

        let message = dispatcher.wait_next().unwrap();
        assert_eq!(message.run_id, 7);
        assert_eq!(message.outcome.unwrap().summary.text, "done");
    }

    #[test]
    fn test_dispatcher_delivers_errors() {
        let mut dispatcher = RunDispatcher::new(Duration::from_secs(5)).unwrap();
        dispatcher.dispatch(1, || Err(VisualizationError::NoTokens.into()));

        let message = dispatcher.wait_next().unwrap();
        assert!(matches!(message.outcome, Err(PipelineError::Visualization(VisualizationError::NoTokens))));
    }

    #[test]
    fn test_dispatcher_times_out_slow_jobs() {
        let mut dispatcher = RunDispatcher::new(Duration::from_millis(50)).unwrap();
        dispatcher.dispatch(3, || {
            std::thread::sleep(Duration::from_millis(400));
            Ok(output("too late"))
        });

        let message = dispatcher.wait_next().unwrap();
        assert_eq!(message.run_id, 3);
        assert!(matches!(message.outcome, Err(PipelineError::Timeout { .. })));
    }

    #[test]
    fn test_dispatcher_reports_panics() {
        let mut dispatcher = RunDispatcher::new(Duration::from_secs(5)).unwrap();
        dispatcher.dispatch(4, || panic!("model exploded"));

        let message = dispatcher.wait_next().unwrap();
        assert!(matches!(message.outcome, Err(PipelineError::Task { .. })));
    }

    #[test]
    fn test_repaint_hook_called() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let calls = Arc::new(AtomicUsize::new(0));
        let mut dispatcher = RunDispatcher::new(Duration::from_secs(5)).unwrap();
        let counter = Arc::clone(&calls);
        dispatcher.set_repaint_hook(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        dispatcher.dispatch(1, || Ok(output("x")));
        dispatcher.wait_next().unwrap();
        // The hook runs right after the send; give it a moment
        for _ in 0..100 {
            if calls.load(Ordering::SeqCst) == 1 {
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
