use crate::error::Result;

use async_trait::async_trait;
use twitchchat::writer::{AsyncWriter, MpscWriter};

/// A chat participant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Login name, lower case
    pub login: String,
    pub display_name: String,
}

impl User {
    pub fn new(login: &str, display_name: Option<&str>) -> Self {
        Self {
            login: login.to_lowercase(),
            display_name: display_name.unwrap_or(login).to_string(),
        }
    }
}

/// Somewhere to send a reply to
#[async_trait]
pub trait Respond: Send + Sync {
    async fn respond(&self, text: &str) -> Result<()>;
}

/// Replies into a twitch channel
#[derive(Clone)]
pub struct ChannelResponder {
    writer: AsyncWriter<MpscWriter>,
    channel: String,
}

impl ChannelResponder {
    pub fn new(writer: AsyncWriter<MpscWriter>, channel: impl Into<String>) -> Self {
        Self {
            writer,
            channel: channel.into(),
        }
    }
}

#[async_trait]
impl Respond for ChannelResponder {
    async fn respond(&self, text: &str) -> Result<()> {
        let mut writer = self.writer.clone();
        writer
            .encode(twitchchat::commands::privmsg(&self.channel, text))
            .await?;
        Ok(())
    }
}
