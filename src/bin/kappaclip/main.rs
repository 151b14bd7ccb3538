use kappaclip::{
    clip::{ClipCreator, DEFAULT_TIMEOUT},
    commands::{Commands, State},
    cooldown::DEFAULT_COOLDOWN_SECS,
    platform::Helix,
    Bot, KappaError,
};

use std::{env, sync::Arc, time::Duration};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::watch,
};
use twitchchat::UserConfig;

struct Config {
    user_config: UserConfig,
    channel: String,
    client_id: String,
    api_token: String,
    cooldown_secs: u64,
    timeout: Duration,
}

impl Config {
    fn load() -> anyhow::Result<Self> {
        let nick = env::var("TWITCH_NICK")?;
        let oauth = env::var("TWITCH_OAUTH")?;

        let user_config = UserConfig::builder()
            .name(&nick)
            .token(&oauth)
            .enable_all_capabilities()
            .build()?;

        let channel = env::var("TWITCH_CHANNEL")?;
        let client_id = env::var("TWITCH_CLIENT_ID")?;

        // the chat token works for the api too, minus its prefix
        let api_token = env::var("TWITCH_API_TOKEN")
            .unwrap_or_else(|_| oauth.trim_start_matches("oauth:").to_string());

        let cooldown_secs = seconds("CLIP_COOLDOWN")?.unwrap_or(DEFAULT_COOLDOWN_SECS);
        let timeout = seconds("CLIP_TIMEOUT")?
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);

        Ok(Self {
            user_config,
            channel,
            client_id,
            api_token,
            cooldown_secs,
            timeout,
        })
    }
}

fn seconds(key: &str) -> anyhow::Result<Option<u64>> {
    match env::var(key) {
        Ok(value) => match value.trim().parse() {
            Ok(secs) => Ok(Some(secs)),
            Err(_) => Err(KappaError::BadInput(format!("{}={}", key, value)).into()),
        },
        Err(_) => Ok(None),
    }
}

// flips to true once the operator presses enter
fn stop_on_enter() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        let mut line = String::new();
        if let Err(err) = BufReader::new(tokio::io::stdin()).read_line(&mut line).await {
            log::error!("could not read stdin: {}", err);
        }
        let _ = tx.send(true);
    });
    rx
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load the config
    simple_env_load::load_env_from(&[".env", ".env.production"]);
    alto_logger::init_term_logger()?;

    let config = Config::load()?;
    eprintln!("channel we'll be on: {}", &config.channel);

    let platform = Arc::new(Helix::new(&config.client_id, &config.api_token)?);
    let clips = ClipCreator::new(platform, config.timeout)?;
    let bot = Bot::new(Commands::new(State::new(
        &config.channel,
        config.cooldown_secs,
        clips,
    )));

    log::info!("Press ENTER to stop");
    let mut quit = stop_on_enter();

    loop {
        log::info!("Starting!");

        match bot.run_to_completion(&config.user_config, &mut quit).await {
            Ok(true) => break Ok(()),
            Ok(false) => {
                // we should restart
            }
            Err(err) => {
                // we should restart
                log::error!("ran into an error: {}", err)
            }
        }

        log::info!("Restarting, waiting 1 minute.");
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(60)) => {}
            _ = quit.changed() => break Ok(()),
        }
    }
}
