use crate::chat::{Respond, User};
use crate::error::Result;

use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinHandle;

// these are commands only the broadcaster can do
mod broadcaster;

// these are commands all users can do
mod user;

mod command;
pub use command::Command;

mod state;
pub use state::State;

/// Everything the bot knows how to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    EasterEgg,
    Clip,
    SetClipCooldown,
}

/// Maps command names to the commands they run
#[derive(Debug, Clone)]
pub struct Registry {
    names: HashMap<String, CommandKind>,
}

impl Registry {
    /// An empty registry, nothing will be dispatched
    pub fn new() -> Self {
        Self {
            names: HashMap::new(),
        }
    }

    /// Bind `name` (case-sensitive, without the '!') to `kind`
    pub fn register(&mut self, name: impl Into<String>, kind: CommandKind) -> &mut Self {
        self.names.insert(name.into(), kind);
        self
    }

    pub fn lookup(&self, name: &str) -> Option<CommandKind> {
        self.names.get(name).copied()
    }
}

impl Default for Registry {
    fn default() -> Self {
        let mut registry = Self::new();
        registry
            .register("easteregg", CommandKind::EasterEgg)
            .register("clip", CommandKind::Clip)
            .register("setclipcooldown", CommandKind::SetClipCooldown);
        registry
    }
}

/// One use of a command by someone in chat
#[derive(Clone)]
pub struct Invocation {
    pub user: User,
    pub args: Option<String>,
    pub responder: Arc<dyn Respond>,
}

#[derive(Clone)]
pub struct Commands {
    state: Arc<State>,
    registry: Arc<Registry>,
}

impl Commands {
    /// Initialize the commands with the provided state
    pub fn new(state: State) -> Self {
        Self::with_registry(state, Registry::default())
    }

    pub fn with_registry(state: State, registry: Registry) -> Self {
        Self {
            state: Arc::new(state),
            registry: Arc::new(registry),
        }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    /// Tries to dispatch this command.
    ///
    /// Unknown commands are ignored. Commands that have to wait on the
    /// platform are run in the background, and their handle is returned.
    pub async fn dispatch(
        &self,
        name: &str,
        invocation: Invocation,
    ) -> Result<Option<JoinHandle<()>>> {
        let kind = match self.registry.lookup(name) {
            Some(kind) => kind,
            None => return Ok(None),
        };
        log::debug!("{} ran {:?}", invocation.user.login, kind);

        match kind {
            CommandKind::EasterEgg => self.easter_egg(&invocation).await?,
            CommandKind::SetClipCooldown => self.set_clip_cooldown(&invocation).await?,
            CommandKind::Clip => {
                let this = self.clone();
                let handle = tokio::spawn(async move {
                    if let Err(err) = this.clip(&invocation).await {
                        log::error!("Error handling clip: {:?}", err);
                    }
                });
                return Ok(Some(handle));
            }
        }
        Ok(None)
    }

    // note: these are the same for now.
    //
    // helper which sends a response
    async fn send_response(
        &self,
        invocation: &Invocation,
        response: impl AsRef<str>,
    ) -> Result<()> {
        invocation.responder.respond(response.as_ref()).await
    }

    // helper which sends a help msg
    async fn send_help(&self, invocation: &Invocation, help: impl AsRef<str>) -> Result<()> {
        invocation.responder.respond(help.as_ref()).await
    }

    // helper which sends an error msg
    async fn send_error(&self, invocation: &Invocation, error: impl AsRef<str>) -> Result<()> {
        invocation.responder.respond(error.as_ref()).await
    }
}
