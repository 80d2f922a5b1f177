use super::canvas::Canvas;
use crate::upload::{PipelineEvent, PipelineEventKind};
use derivative::Derivative;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// How long the "download in progress" indicator stays up after a click.
pub const DOWNLOAD_STATUS_DURATION: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    Upload,
    Process,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Uploading,
    Processing,
    Ready,
    Failed(FailureStage),
}

/// Client-held record for one file selection.
#[derive(Debug, Default)]
pub struct SessionState {
    pub seq: u64,
    pub source_file: Option<PathBuf>,
    pub source_bytes: Option<u64>,
    pub uploaded_name: Option<String>,
    pub processed_name: Option<String>,
    pub phase: Phase,
    pub download_started: Option<Instant>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadControl {
    Hidden,
    Enabled,
    Disabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowView {
    pub download: DownloadControl,
    pub status_visible: bool,
    pub busy_label: Option<&'static str>,
}

/// A picked file that is still being read and decoded.
#[derive(Debug)]
struct PendingSelection {
    seq: u64,
    path: PathBuf,
}

#[derive(Derivative, Default)]
#[derivative(Debug)]
pub struct WorkflowState {
    next_seq: u64,
    pending: Option<PendingSelection>,
    pub session: SessionState,
    #[derivative(Debug = "ignore")]
    pub canvas: Canvas,
}

impl WorkflowState {
    /// Registers a picked file and returns its sequence number. The current
    /// session stays in place until the file decodes.
    pub fn select(&mut self, path: PathBuf) -> u64 {
        self.next_seq += 1;
        info!("Selected {} (pipeline #{})", path.display(), self.next_seq);
        self.pending = Some(PendingSelection {
            seq: self.next_seq,
            path,
        });
        self.next_seq
    }

    pub fn pending_seq(&self) -> Option<u64> {
        self.pending.as_ref().map(|pending| pending.seq)
    }

    /// Applies a pipeline event. Returns false when the event was discarded.
    pub fn apply(&mut self, event: PipelineEvent) -> bool {
        if self.pending_seq() == Some(event.seq) {
            return self.settle_pending(event.kind);
        }
        if event.seq != self.session.seq {
            debug!(
                "Discarding stale {} from pipeline #{} (current #{})",
                event.kind.label(),
                event.seq,
                self.session.seq
            );
            return false;
        }

        let session = &mut self.session;
        match (session.phase, event.kind) {
            (Phase::Uploading, PipelineEventKind::Uploaded { uploaded_name }) => {
                session.uploaded_name = Some(uploaded_name);
                session.phase = Phase::Processing;
            }
            (Phase::Uploading, PipelineEventKind::UploadFailed(reason)) => {
                warn!("Upload failed: {}", reason);
                session.phase = Phase::Failed(FailureStage::Upload);
            }
            (Phase::Processing, PipelineEventKind::Processed { processed_name })
                if session.uploaded_name.is_some() =>
            {
                info!("Processing successful, download enabled for {}", processed_name);
                session.processed_name = Some(processed_name);
                session.phase = Phase::Ready;
            }
            (Phase::Processing, PipelineEventKind::ProcessFailed(reason)) => {
                warn!("Processing failed, download disabled: {}", reason);
                session.phase = Phase::Failed(FailureStage::Process);
            }
            (Phase::Ready, PipelineEventKind::PreviewLoaded(image)) => {
                self.canvas.paint(image);
                info!("Processed image displayed in canvas");
            }
            (Phase::Ready, PipelineEventKind::PreviewFailed(reason)) => {
                warn!("Keeping previous canvas contents: {}", reason);
            }
            (phase, kind) => {
                warn!("Ignoring {} while {:?}", kind.label(), phase);
                return false;
            }
        }
        true
    }

    /// Supersedes the session once the pending file decodes. An undecodable
    /// file leaves everything as it was.
    fn settle_pending(&mut self, kind: PipelineEventKind) -> bool {
        let Some(pending) = self.pending.take() else {
            return false;
        };
        match kind {
            PipelineEventKind::SourceDecoded { image, byte_len } => {
                self.session = SessionState {
                    seq: pending.seq,
                    source_file: Some(pending.path),
                    source_bytes: Some(byte_len),
                    phase: Phase::Uploading,
                    ..SessionState::default()
                };
                self.canvas.paint(image);
                true
            }
            PipelineEventKind::SourceUndecodable(reason) => {
                info!(
                    "Keeping current session, {} is not a usable image: {}",
                    pending.path.display(),
                    reason
                );
                false
            }
            other => {
                warn!("Ignoring {} before the source decoded", other.label());
                self.pending = Some(pending);
                false
            }
        }
    }

    /// Handles a click on the download control. Returns the name to download.
    pub fn click_download(&mut self, now: Instant) -> Option<String> {
        if self.view(now).download != DownloadControl::Enabled {
            return None;
        }
        self.session.download_started = Some(now);
        self.session.processed_name.clone()
    }

    /// Clears the download indicator once its fixed duration has elapsed.
    pub fn tick(&mut self, now: Instant) {
        if let Some(started) = self.session.download_started {
            if now.duration_since(started) >= DOWNLOAD_STATUS_DURATION {
                debug!("Download status hidden, control re-displayed");
                self.session.download_started = None;
            }
        }
    }

    /// Time left until the download indicator resets, if it is showing.
    pub fn download_status_remaining(&self, now: Instant) -> Option<Duration> {
        self.session
            .download_started
            .map(|started| DOWNLOAD_STATUS_DURATION.saturating_sub(now.duration_since(started)))
    }

    pub fn view(&self, now: Instant) -> WorkflowView {
        let downloading = self
            .download_status_remaining(now)
            .map(|left| !left.is_zero())
            .unwrap_or(false);

        let download = match self.session.phase {
            Phase::Ready if downloading => DownloadControl::Hidden,
            Phase::Ready => DownloadControl::Enabled,
            Phase::Failed(FailureStage::Process) => DownloadControl::Disabled,
            _ => DownloadControl::Hidden,
        };
        let busy_label = match self.session.phase {
            Phase::Uploading => Some("Uploading…"),
            Phase::Processing => Some("Processing…"),
            _ => None,
        };

        WorkflowView {
            download,
            status_visible: self.session.phase == Phase::Ready && downloading,
            busy_label,
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.pending.is_some()
            || matches!(self.session.phase, Phase::Uploading | Phase::Processing)
    }
}
