use super::Invocation;
use crate::error::{ConfigError, Result};

impl super::Commands {
    /// !setclipcooldown <seconds>
    pub async fn set_clip_cooldown(&self, invocation: &Invocation) -> Result<()> {
        let value = invocation.args.as_deref().unwrap_or_default();
        match self.state.config.set(value, &invocation.user.login) {
            Ok(secs) => {
                log::info!("{} set the clip cooldown to {}s", invocation.user.login, secs);
                let response = format!("Clip cooldown set to {} seconds.", secs);
                self.send_response(invocation, response).await
            }
            Err(ConfigError::PermissionDenied) => {
                log::warn!(
                    "{} tried to change the clip cooldown",
                    invocation.user.login
                );
                self.send_error(invocation, "Only the streamer can change the clip cooldown.")
                    .await
            }
            Err(ConfigError::InvalidArgument(_)) => {
                self.send_help(
                    invocation,
                    "Please provide a cooldown in seconds, e.g. !setclipcooldown 30",
                )
                .await
            }
        }
    }
}
