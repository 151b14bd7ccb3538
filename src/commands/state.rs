use crate::clip::ClipCreator;
use crate::cooldown::{ConfigState, CooldownTracker};

use std::sync::Arc;

/// State of the bot
pub struct State {
    /// the channel we clip, its owner may change the cooldown
    pub channel: String,
    /// the clip cooldown setting
    pub config: Arc<ConfigState>,
    /// who clipped when
    pub cooldowns: CooldownTracker,
    /// something that makes clips
    pub clips: ClipCreator,
}

impl State {
    pub fn new(channel: &str, cooldown_secs: u64, clips: ClipCreator) -> Self {
        let channel = channel.trim_start_matches('#').to_lowercase();
        let config = Arc::new(ConfigState::new(&channel, cooldown_secs));
        Self {
            cooldowns: CooldownTracker::new(config.clone()),
            config,
            channel,
            clips,
        }
    }
}
