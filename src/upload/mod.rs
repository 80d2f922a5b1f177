mod client;
mod pipeline;
mod types;

#[cfg(test)]
pub(crate) mod mock_server;

pub use client::HdrClient;
pub use pipeline::Pipeline;
pub use types::{PipelineEvent, PipelineEventKind};
