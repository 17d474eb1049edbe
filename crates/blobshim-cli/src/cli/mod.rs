//! CLI for the blobshim compatibility layer.

mod commands;

use anyhow::Result;
use blobshim_core::config;
use blobshim_core::host::HostCapabilities;
use clap::{Parser, Subcommand};
use std::path::Path;

use commands::{run_encode, run_fetch, run_roundtrip, run_text};

/// Top-level CLI for blobshim.
#[derive(Debug, Parser)]
#[command(name = "blobshim")]
#[command(about = "blobshim: Blob, FileReader and object URL layer for constrained hosts", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Print a file as a base64 data: URL.
    Encode {
        /// Path to the file.
        path: String,
        /// Media type; guessed from the extension when omitted.
        #[arg(long = "type", value_name = "MEDIA_TYPE")]
        media_type: Option<String>,
    },

    /// Register a file as an object URL and fetch it back through an intercepted request.
    Roundtrip {
        /// Path to the file.
        path: String,
        /// Media type; guessed from the extension when omitted.
        #[arg(long = "type", value_name = "MEDIA_TYPE")]
        media_type: Option<String>,
        /// Revoke the object URL right after send, before the request completes.
        #[arg(long)]
        revoke_before_send: bool,
    },

    /// Load a URL with the resource loader (data: URLs, or file:// with the file transport).
    Fetch {
        /// URL to load.
        url: String,
    },

    /// Decode a file as UTF-8 text through the reader and print it.
    Text {
        /// Path to the file.
        path: String,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);
        let host = HostCapabilities::from_config(cfg);

        match cli.command {
            CliCommand::Encode { path, media_type } => {
                run_encode(&host, Path::new(&path), media_type.as_deref()).await?
            }
            CliCommand::Roundtrip {
                path,
                media_type,
                revoke_before_send,
            } => {
                run_roundtrip(&host, Path::new(&path), media_type.as_deref(), revoke_before_send)
                    .await?
            }
            CliCommand::Fetch { url } => run_fetch(&host, &url).await?,
            CliCommand::Text { path } => run_text(&host, Path::new(&path)).await?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
