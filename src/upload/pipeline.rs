use crate::error::ClientError;
use crate::upload::client::HdrClient;
use crate::upload::types::{PipelineEvent, PipelineEventKind, SourceFile};
use crate::utils::image_file::decode_rgba;
use image::RgbaImage;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use tracing::{debug, error, info, warn};

/// One upload → process → preview run for a single selected file.
pub struct Pipeline {
    client: HdrClient,
    seq: u64,
    events: Sender<PipelineEvent>,
}

impl Pipeline {
    pub fn new(client: HdrClient, seq: u64, events: Sender<PipelineEvent>) -> Self {
        Self {
            client,
            seq,
            events,
        }
    }

    fn emit(&self, kind: PipelineEventKind) {
        debug!("pipeline #{} -> {}", self.seq, kind.label());
        self.events
            .send(PipelineEvent {
                seq: self.seq,
                kind,
            })
            .unwrap_or_default();
    }

    pub async fn run(self, path: PathBuf) {
        let source = match read_source(&path).await {
            Ok(source) => source,
            Err(e) => {
                warn!("Ignoring {}: {}", path.display(), e);
                self.emit(PipelineEventKind::SourceUndecodable(e.to_string()));
                return;
            }
        };

        let (image, source) = match decode_in_background(source).await {
            Ok(decoded) => decoded,
            Err(e) => {
                warn!("Ignoring {}: {}", path.display(), e);
                self.emit(PipelineEventKind::SourceUndecodable(e.to_string()));
                return;
            }
        };
        self.emit(PipelineEventKind::SourceDecoded {
            image,
            byte_len: source.bytes.len() as u64,
        });

        let uploaded_name = match self.client.upload(&source).await {
            Ok(name) => {
                info!("Upload of {} assigned name {}", source.name, name);
                name
            }
            Err(e) => {
                error!("Error uploading image: {}", e);
                self.emit(PipelineEventKind::UploadFailed(e.to_string()));
                return;
            }
        };
        self.emit(PipelineEventKind::Uploaded {
            uploaded_name: uploaded_name.clone(),
        });

        self.process(Some(uploaded_name)).await;
    }

    /// Runs the process step and, on success, loads the processed preview.
    pub async fn process(&self, uploaded_name: Option<String>) {
        let Some(uploaded_name) = uploaded_name else {
            return;
        };

        let processed_name = match self.client.process(&uploaded_name).await {
            Ok(name) => {
                info!("Processed filename received: {}", name);
                name
            }
            Err(e) => {
                error!("Error processing image: {}", e);
                self.emit(PipelineEventKind::ProcessFailed(e.to_string()));
                return;
            }
        };
        self.emit(PipelineEventKind::Processed {
            processed_name: processed_name.clone(),
        });

        match self.load_preview(&processed_name).await {
            Ok(image) => self.emit(PipelineEventKind::PreviewLoaded(image)),
            Err(e) => {
                error!("Error loading processed image: {}", e);
                self.emit(PipelineEventKind::PreviewFailed(e.to_string()));
            }
        }
    }

    async fn load_preview(&self, processed_name: &str) -> Result<RgbaImage, ClientError> {
        let bytes = self.client.fetch_processed(processed_name).await?;
        let source = SourceFile {
            name: processed_name.to_string(),
            bytes,
        };
        let (image, _) = decode_in_background(source).await?;
        Ok(image)
    }
}

async fn read_source(path: &Path) -> Result<SourceFile, ClientError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| ClientError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    Ok(SourceFile { name, bytes })
}

async fn decode_in_background(
    source: SourceFile,
) -> Result<(RgbaImage, SourceFile), ClientError> {
    let path = PathBuf::from(&source.name);
    tokio::task::spawn_blocking(move || decode_rgba(&source.bytes).map(|image| (image, source)))
        .await
        .map_err(|join_err| ClientError::Io {
            path,
            source: std::io::Error::new(std::io::ErrorKind::Other, join_err.to_string()),
        })?
}
