use crate::error::{ClipError, Result};
use crate::platform::{Platform, CLIPS_URL};

use markings::{Args, Opts, Template};
use std::sync::Arc;
use tokio::time::{timeout, Duration};

/// Title used when the requester did not give one
pub const DEFAULT_TITLE: &str = "Untitled";

/// Default bound on a single platform call
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const CREATED: &str = r#"Clip created: "${title} | ${name}""#;

/// A clip that was successfully created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedClip {
    pub id: String,
    pub url: String,
    /// What to tell chat about it
    pub message: String,
}

/// Turns a clip request into a clip on the platform.
///
/// This knows nothing about cooldowns, callers do their own bookkeeping.
pub struct ClipCreator {
    platform: Arc<dyn Platform>,
    timeout: Duration,
    created: Template<'static>,
}

impl ClipCreator {
    pub fn new(platform: Arc<dyn Platform>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            platform,
            timeout,
            created: Template::parse(CREATED, Opts::default())?,
        })
    }

    /// Clip the live broadcast of `broadcaster`, on behalf of `requester` (a display name)
    pub async fn create_clip(
        &self,
        broadcaster: &str,
        title: &str,
        requester: &str,
    ) -> std::result::Result<CreatedClip, ClipError> {
        // rendered up front, nothing may fail once the clip exists
        let created = {
            let args = Args::new().with("title", &title).with("name", &requester);
            self.created.clone().apply(&args)?
        };

        let broadcaster_id = match timeout(self.timeout, self.platform.resolve_user_id(broadcaster))
            .await
        {
            Ok(Ok(Some(id))) => id,
            Ok(Ok(None)) => {
                return Err(ClipError::LookupFailed(format!(
                    "no account named '{}'",
                    broadcaster
                )))
            }
            Ok(Err(err)) => return Err(ClipError::LookupFailed(err.to_string())),
            Err(_) => return Err(ClipError::LookupFailed("timed out".into())),
        };
        log::debug!("resolved '{}' to {}", broadcaster, broadcaster_id);

        let clip = match timeout(self.timeout, self.platform.create_clip(&broadcaster_id)).await {
            Ok(Ok(Some(clip))) => clip,
            Ok(Ok(None)) => {
                return Err(ClipError::CreateFailed(
                    "platform returned no clip".into(),
                ))
            }
            Ok(Err(err)) => return Err(ClipError::CreateFailed(err.to_string())),
            Err(_) => return Err(ClipError::CreateFailed("timed out".into())),
        };

        let url = format!("{}/{}", CLIPS_URL, clip.id);
        let message = format!("{} → {}", created, url);

        Ok(CreatedClip {
            id: clip.id,
            url,
            message,
        })
    }
}
