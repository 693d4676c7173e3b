//! Subcommand implementations for the shelfctl CLI

pub mod book;
pub mod circulation;
pub mod member;
pub mod report;

use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Args;
use shelfctl_core::{HttpTransport, Library, Overrides, Row, ServiceConfig, Transport};
use tracing::debug;

use crate::menu::Menu;
use crate::output::{write_rows, OutputFormat};
use crate::ui::Progress;

// Re-export main dispatcher functions for flat access from main.rs
pub use book::run_book;
pub use circulation::{run_borrow, run_return};
pub use member::run_member;
pub use report::run_report;

/// Connection flags, falling back to the environment
#[derive(Args, Debug)]
pub struct ConnectionArgs {
    /// Project URL of the hosted database
    #[arg(long, env = "SUPABASE_URL", global = true, hide_env_values = true)]
    pub url: Option<String>,

    /// Service key used for every request
    #[arg(long, env = "SUPABASE_KEY", global = true, hide_env_values = true)]
    pub key: Option<String>,
}

/// Everything a command needs: the client handle plus output settings
pub struct Session<T> {
    pub library: Library<T>,
    pub format: OutputFormat,
    pub progress: Progress,
    pub top_limit: usize,
}

impl Session<HttpTransport> {
    pub fn connect(
        args: &ConnectionArgs,
        format: OutputFormat,
        progress: Progress,
    ) -> Result<Self> {
        let config = ServiceConfig::load(&Overrides {
            url: args.url.clone(),
            key: args.key.clone(),
        })
        .context("failed to load service configuration")?;
        debug!(?config, "service configuration loaded");

        let transport = HttpTransport::new(&config)?;
        Ok(Self {
            library: Library::new(transport),
            format,
            progress,
            top_limit: config.top_limit,
        })
    }
}

impl<T: Transport> Session<T> {
    pub fn print_rows<W: Write>(&self, out: &mut W, rows: &[Row]) -> Result<()> {
        write_rows(out, rows, self.format)?;
        Ok(())
    }
}

/// Interactive menu on stdin
pub async fn run_menu<T: Transport, W: Write>(session: &Session<T>, out: &mut W) -> Result<()> {
    let stdin = io::stdin();
    Menu::new(&session.library, stdin.lock(), out, session.top_limit)
        .run()
        .await
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use shelfctl_core::mock::MockTransport;

    pub fn session(format: OutputFormat) -> Session<MockTransport> {
        Session {
            library: Library::new(MockTransport::new()),
            format,
            progress: Progress::hidden(),
            top_limit: 5,
        }
    }

    pub fn stdout_of(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }
}
