mod error;
pub use error::{ClipError, ConfigError, KappaError, Result};

pub mod chat;
pub mod clip;
pub mod commands;
pub mod cooldown;
pub mod platform;

use chat::{ChannelResponder, Respond, User};
use commands::{Command, Commands, Invocation};

use std::sync::Arc;
use tokio::sync::watch;
use twitchchat::{
    connector::tokio::ConnectorRustTls,
    messages::{Commands as Message, Privmsg},
    runner::{AsyncRunner, Status},
    UserConfig,
};

pub struct Bot {
    commands: Commands,
}

impl Bot {
    pub fn new(commands: Commands) -> Self {
        Self { commands }
    }

    /// Connect, join our channel and handle chat until the connection ends.
    ///
    /// Returns `true` if we were asked to stop, `false` if we should restart.
    pub async fn run_to_completion(
        &self,
        user_config: &UserConfig,
        quit: &mut watch::Receiver<bool>,
    ) -> Result<bool> {
        let connector = ConnectorRustTls::twitch()?;
        let mut runner = AsyncRunner::connect(connector, user_config).await?;
        log::info!("connected! our name is: {}", runner.identity.username());

        let channel = format!("#{}", self.commands.state().channel);
        log::info!("joining {}", channel);
        runner.join(&channel).await?;
        log::info!("Bot Ready");

        let responder: Arc<dyn Respond> =
            Arc::new(ChannelResponder::new(runner.writer(), channel.as_str()));
        let mut quit_handle = Some(runner.quit_handle());

        loop {
            let status = tokio::select! {
                status = runner.next_message() => status?,
                changed = quit.changed(), if quit_handle.is_some() => {
                    if changed.is_err() || *quit.borrow() {
                        log::info!("disconnecting");
                        if let Some(handle) = quit_handle.take() {
                            handle.notify().await;
                        }
                    }
                    continue;
                }
            };

            match status {
                Status::Message(Message::Privmsg(msg)) => self.handle(&msg, &responder).await,
                Status::Message(..) => {}
                Status::Quit => {
                    log::warn!("Shutting down.");
                    return Ok(true);
                }
                Status::Eof => {
                    log::warn!("Connection closed.");
                    return Ok(quit_handle.is_none());
                }
            }
        }
    }

    async fn handle(&self, msg: &Privmsg<'_>, responder: &Arc<dyn Respond>) {
        let user = User::new(msg.name(), msg.display_name());
        log::info!("{} - {}", user.display_name, msg.data());

        let command = match Command::parse(msg.data()) {
            Some(command) => command,
            None => return,
        };

        let invocation = Invocation {
            user,
            args: command.args.map(ToString::to_string),
            responder: responder.clone(),
        };

        if let Err(err) = self.commands.dispatch(command.cmd, invocation).await {
            log::error!("Error handling message: {:?}", err);
        }
    }
}
