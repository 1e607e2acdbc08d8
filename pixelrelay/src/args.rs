use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use pixelrelay_config::DeploymentMode;

/// pixelrelay image generation proxy
#[derive(Debug, Parser)]
#[command(name = "pixelrelay", about = "Forward image generation requests to an upstream text-to-image API")]
pub struct Args {
    /// Path to configuration file; defaults apply when omitted
    #[arg(short, long, env = "PIXELRELAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the listen address
    #[arg(long, env = "PIXELRELAY_LISTEN")]
    pub listen: Option<SocketAddr>,

    /// Deployment mode; anything other than "production" echoes failure traces
    #[arg(long, env = "APP_ENV")]
    pub mode: Option<String>,

    /// Log filter directive
    #[arg(long, env = "PIXELRELAY_LOG", default_value = "info")]
    pub log: String,
}

impl Args {
    pub fn deployment_mode(&self) -> Option<DeploymentMode> {
        self.mode.as_deref().map(DeploymentMode::from)
    }
}
