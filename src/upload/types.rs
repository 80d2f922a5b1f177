use image::RgbaImage;

/// Progress report from one pipeline run, tagged with the run's sequence number.
#[derive(Debug, Clone)]
pub struct PipelineEvent {
    pub seq: u64,
    pub kind: PipelineEventKind,
}

#[derive(Debug, Clone)]
pub enum PipelineEventKind {
    SourceDecoded { image: RgbaImage, byte_len: u64 },
    SourceUndecodable(String),
    Uploaded { uploaded_name: String },
    UploadFailed(String),
    Processed { processed_name: String },
    ProcessFailed(String),
    PreviewLoaded(RgbaImage),
    PreviewFailed(String),
}

impl PipelineEventKind {
    pub fn label(&self) -> &'static str {
        match self {
            PipelineEventKind::SourceDecoded { .. } => "source_decoded",
            PipelineEventKind::SourceUndecodable(_) => "source_undecodable",
            PipelineEventKind::Uploaded { .. } => "uploaded",
            PipelineEventKind::UploadFailed(_) => "upload_failed",
            PipelineEventKind::Processed { .. } => "processed",
            PipelineEventKind::ProcessFailed(_) => "process_failed",
            PipelineEventKind::PreviewLoaded(_) => "preview_loaded",
            PipelineEventKind::PreviewFailed(_) => "preview_failed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub bytes: Vec<u8>,
}
