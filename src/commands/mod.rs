//! Subcommands that poll the backend and render what they find.

pub mod logs;
pub mod metrics;
pub mod traces;

use common::SourceError;

/// Signals that could not be fetched during one invocation. A failed
/// signal does not stop the others; the process reports them at the end.
#[derive(Debug, Default)]
pub struct Failures {
    failed: Vec<String>,
}

impl Failures {
    pub fn record(&mut self, what: impl Into<String>, err: &SourceError) {
        let what = what.into();
        if err.is_transient() {
            log::error!("Failed to fetch {what} (transient, retry later): {err}");
        } else {
            log::error!("Failed to fetch {what}: {err}");
        }
        self.failed.push(what);
    }

    pub fn extend(&mut self, other: Failures) {
        self.failed.extend(other.failed);
    }

    pub fn is_empty(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn failed(&self) -> &[String] {
        &self.failed
    }

    /// `Err` naming every failed signal, if any.
    pub fn into_result(self) -> anyhow::Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            anyhow::bail!(
                "{} signal(s) could not be fetched: {}",
                self.failed.len(),
                self.failed.join(", ")
            )
        }
    }
}
