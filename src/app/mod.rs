mod canvas;
mod state;
mod ui;

use crate::upload::{HdrClient, Pipeline, PipelineEvent};
use eframe::App;
use reqwest::Url;
use std::path::PathBuf;
use std::sync::mpsc as std_mpsc;
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{error, info};

pub use state::{DownloadControl, WorkflowState};

const IN_FLIGHT_REPAINT: Duration = Duration::from_millis(100);

/// Owns the session state and the pipeline task for the current selection.
pub struct WorkflowController {
    client: HdrClient,
    runtime: Handle,
    state: WorkflowState,
    events_tx: std_mpsc::Sender<PipelineEvent>,
    events_rx: std_mpsc::Receiver<PipelineEvent>,
    in_flight: Option<JoinHandle<()>>,
    candidate: Option<(u64, JoinHandle<()>)>,
}

impl WorkflowController {
    pub fn new(client: HdrClient, runtime: Handle) -> Self {
        let (events_tx, events_rx) = std_mpsc::channel();
        Self {
            client,
            runtime,
            state: WorkflowState::default(),
            events_tx,
            events_rx,
            in_flight: None,
            candidate: None,
        }
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    /// Starts a pipeline for the picked file. The running one is only
    /// replaced once the new file decodes. A pick that has not decoded yet
    /// is dropped in favour of this one.
    pub fn select_file(&mut self, path: PathBuf) {
        self.drain_events();
        if let Some((_, undecided)) = self.candidate.take() {
            undecided.abort();
        }

        let seq = self.state.select(path.clone());
        let pipeline = Pipeline::new(self.client.clone(), seq, self.events_tx.clone());
        self.candidate = Some((seq, self.runtime.spawn(pipeline.run(path))));
    }

    /// Drains pending pipeline events and advances the download timer.
    pub fn pump(&mut self, now: Instant) -> bool {
        let changed = self.drain_events();
        self.state.tick(now);
        changed
    }

    fn drain_events(&mut self) -> bool {
        let mut changed = false;
        while let Ok(event) = self.events_rx.try_recv() {
            changed |= self.state.apply(event);
            self.settle_candidate();
        }
        changed
    }

    fn settle_candidate(&mut self) {
        let Some((seq, _)) = &self.candidate else {
            return;
        };
        let seq = *seq;
        if self.state.pending_seq() == Some(seq) {
            return;
        }

        if let Some((_, handle)) = self.candidate.take() {
            if self.state.session.seq == seq {
                if let Some(previous) = self.in_flight.replace(handle) {
                    previous.abort();
                }
            }
        }
    }

    /// Returns the download URL to open if the control was clickable.
    pub fn click_download(&mut self, now: Instant) -> Option<Url> {
        let processed_name = self.state.click_download(now)?;
        let url = self.client.download_url(&processed_name);
        info!("Initiating download for: {}", url);
        Some(url)
    }

    /// How soon the UI must repaint without user input, if at all.
    pub fn repaint_after(&self, now: Instant) -> Option<Duration> {
        if self.state.is_in_flight() {
            return Some(IN_FLIGHT_REPAINT);
        }
        self.state.download_status_remaining(now)
    }
}

pub struct HdrEmojiApp {
    controller: WorkflowController,
    canvas_texture: Option<(u64, egui::TextureHandle)>,
}

impl HdrEmojiApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, controller: WorkflowController) -> Self {
        info!(
            "Initializing HDR Emoji Maker against {}",
            controller.client.base_url()
        );
        Self {
            controller,
            canvas_texture: None,
        }
    }

    pub fn start_download(&mut self) {
        if let Some(url) = self.controller.click_download(Instant::now()) {
            if let Err(e) = open::that(url.as_str()) {
                error!("Failed to open download link {}: {}", url, e);
            }
        }
    }
}

impl App for HdrEmojiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        self.controller.pump(now);
        self.render(ctx, now);

        if let Some(delay) = self.controller.repaint_after(now) {
            ctx.request_repaint_after(delay);
        }
    }
}
