use super::Invocation;
use crate::clip::DEFAULT_TITLE;
use crate::cooldown::Check;
use crate::error::{ClipError, Result};

use tokio::time::Instant;

impl super::Commands {
    /// !easteregg
    pub async fn easter_egg(&self, invocation: &Invocation) -> Result<()> {
        self.send_response(invocation, "You found the easter egg")
            .await
    }

    /// !clip [title]
    pub async fn clip(&self, invocation: &Invocation) -> Result<()> {
        // held until we are done, so the same user can't slip in twice
        let mut slot = self.state.cooldowns.acquire(&invocation.user.login).await;
        let now = Instant::now();

        if let Check::Denied { remaining_secs } = slot.check(now) {
            let response = format!(
                "{}, you need to wait {}s before creating another clip.",
                slot.user(),
                remaining_secs
            );
            return self.send_error(invocation, response).await;
        }

        let title = invocation.args.as_deref().unwrap_or(DEFAULT_TITLE);
        let created = self
            .state
            .clips
            .create_clip(&self.state.channel, title, &invocation.user.display_name)
            .await;

        let response = match created {
            Ok(clip) => {
                log::info!("{} created clip {}", invocation.user.login, clip.url);
                slot.record(now);
                return self.send_response(invocation, clip.message).await;
            }
            Err(ClipError::LookupFailed(reason)) => {
                log::warn!("Could not look up '{}': {}", self.state.channel, reason);
                "Couldn't get broadcaster ID."
            }
            Err(err) => {
                log::warn!("Could not create clip for {}: {}", invocation.user.login, err);
                "Couldn't create a clip."
            }
        };
        self.send_error(invocation, response).await
    }
}
