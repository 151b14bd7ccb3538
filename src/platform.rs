use crate::error::{KappaError, Result};

use async_trait::async_trait;
use reqwest::{header, Client, Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};

/// Public base url for clips
pub const CLIPS_URL: &str = "https://clips.twitch.tv";

const HELIX_URL: &str = "https://api.twitch.tv/helix";

/// A freshly created clip
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct NewClip {
    pub id: String,
    #[serde(default)]
    pub edit_url: Option<String>,
}

/// The parts of the streaming platform the bot talks to
#[async_trait]
pub trait Platform: Send + Sync {
    /// Look up the stable user id for `login`, `None` if there is no such account
    async fn resolve_user_id(&self, login: &str) -> Result<Option<String>>;

    /// Clip the live broadcast of `broadcaster_id`, `None` if nothing was created
    async fn create_clip(&self, broadcaster_id: &str) -> Result<Option<NewClip>>;
}

#[derive(Debug, Deserialize)]
struct Data<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct User {
    id: String,
}

/// Body Helix sends along with a failed status
#[derive(Debug, Deserialize)]
struct HelixError {
    #[serde(default)]
    message: String,
}

async fn parse<T: DeserializeOwned>(res: Response) -> Result<T> {
    let status = res.status();
    let body = res.text().await?;
    if !status.is_success() {
        return Err(refused(status, &body));
    }
    Ok(serde_json::from_str(&body)?)
}

// keeps the platform's own explanation when there is one
fn refused(status: StatusCode, body: &str) -> KappaError {
    let message = serde_json::from_str::<HelixError>(body)
        .ok()
        .map(|err| err.message)
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string());

    KappaError::Refused {
        status: status.as_u16(),
        message,
    }
}

fn first_user(res: Data<Vec<User>>) -> Option<String> {
    res.data.into_iter().next().map(|user| user.id)
}

fn first_clip(res: Data<Vec<NewClip>>) -> Option<NewClip> {
    res.data.into_iter().next()
}

/// Twitch Helix API client
#[derive(Debug, Clone)]
pub struct Helix {
    client: Client,
    client_id: String,
    token: String,
}

impl Helix {
    pub fn new(client_id: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: Client::builder().build()?,
            client_id: client_id.into(),
            token: token.into(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}/{}", HELIX_URL, path))
            .header("Client-Id", &self.client_id)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token))
    }
}

#[async_trait]
impl Platform for Helix {
    async fn resolve_user_id(&self, login: &str) -> Result<Option<String>> {
        let res = self
            .request(Method::GET, "users")
            .query(&[("login", login)])
            .send()
            .await?;

        Ok(first_user(parse(res).await?))
    }

    async fn create_clip(&self, broadcaster_id: &str) -> Result<Option<NewClip>> {
        let res = self
            .request(Method::POST, "clips")
            .query(&[("broadcaster_id", broadcaster_id)])
            .send()
            .await?;

        Ok(first_clip(parse(res).await?))
    }
}
