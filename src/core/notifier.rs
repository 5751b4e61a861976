//! Narrow contract for dispatching a rendered report somewhere a human
//! will see it (Slack, email, ...). The concrete channel is a deployment
//! concern, not this crate's (`spec.md` §1).

use async_trait::async_trait;

use crate::core::domain::Filing;
use crate::error::Result;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, filing: &Filing, report_markdown: &str) -> Result<()>;
}

/// A notifier that does nothing, for deployments that only want the
/// written report file.
pub struct NullNotifier;

#[async_trait]
impl Notifier for NullNotifier {
    async fn notify(&self, _filing: &Filing, _report_markdown: &str) -> Result<()> {
        Ok(())
    }
}
