//! Spinner feedback while a subcommand waits on the backend.
//!
//! The menu never draws one: its prompts share the terminal with the answers.

use std::future::Future;
use std::io::IsTerminal;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Set to `1` to silence spinners without passing `--quiet`
pub const QUIET_VAR: &str = "SHELFCTL_QUIET";

const TICK: Duration = Duration::from_millis(100);

/// Whether subcommands draw a spinner on stderr
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    visible: bool,
}

impl Progress {
    /// Visible unless `--quiet`, `SHELFCTL_QUIET=1` or stderr is redirected
    pub fn detect(quiet_flag: bool) -> Self {
        let quiet_env = std::env::var(QUIET_VAR).is_ok_and(|v| v.trim() == "1");
        Self::from_switches(quiet_flag || quiet_env, std::io::stderr().is_terminal())
    }

    fn from_switches(quiet: bool, stderr_is_tty: bool) -> Self {
        Self {
            visible: !quiet && stderr_is_tty,
        }
    }

    #[cfg(test)]
    pub fn hidden() -> Self {
        Self { visible: false }
    }

    /// Await `work` with a spinner labelled `label`; the line is cleared
    /// afterwards so row output starts clean
    pub async fn wrap<F: Future>(&self, label: &str, work: F) -> F::Output {
        let bar = self.visible.then(|| start(label));
        let output = work.await;
        if let Some(bar) = bar {
            bar.finish_and_clear();
        }
        output
    }
}

fn start(label: &str) -> ProgressBar {
    let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    let bar = ProgressBar::new_spinner()
        .with_style(style)
        .with_message(label.to_string());
    bar.enable_steady_tick(TICK);
    bar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spinner_needs_terminal_and_no_quiet() {
        assert!(Progress::from_switches(false, true).visible);
        assert!(!Progress::from_switches(true, true).visible);
        assert!(!Progress::from_switches(false, false).visible);
    }

    #[tokio::test]
    async fn test_wrap_passes_output_through() {
        let value = Progress::hidden().wrap("Working...", async { 7 }).await;
        assert_eq!(value, 7);

        let err: Result<(), &str> = Progress::hidden()
            .wrap("Working...", async { Err("nope") })
            .await;
        assert_eq!(err, Err("nope"));
    }
}
