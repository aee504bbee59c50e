//! Share step: the avatar's public link.

use std::sync::Arc;

use crate::notify::Clipboard;

use super::StepContext;

pub struct ShareStep {
    ctx: Arc<StepContext>,
}

impl ShareStep {
    pub fn enter(ctx: Arc<StepContext>) -> Self {
        Self { ctx }
    }

    /// `{host}/{handle}`.
    pub async fn public_link(&self) -> String {
        let handle = self.ctx.sequencer.draft().await.handle;
        format!("{}/{}", self.ctx.app_host, handle)
    }

    pub async fn copy_link(&self, clipboard: &dyn Clipboard) -> bool {
        let link = self.public_link().await;
        let copied = clipboard.write_text(&link);
        if copied {
            self.ctx.notifier.success("Link copied!");
        }
        copied
    }
}
