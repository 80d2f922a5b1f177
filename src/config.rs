use clap::Parser;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";

/// Runtime settings, read from the command line with environment fallbacks.
#[derive(Parser, Debug, Clone)]
#[command(name = "hdr-emoji", about = "Upload an image and get an HDR emoji back")]
pub struct Settings {
    /// Base URL of the HDR processing service.
    #[arg(long, env = "HDR_EMOJI_SERVER", default_value = DEFAULT_SERVER_URL)]
    pub server_url: String,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, env = "HDR_EMOJI_LOG", default_value = "info")]
    pub log_filter: String,
}
