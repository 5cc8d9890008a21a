use std::time::Duration;

use reqwest::header::COOKIE;
use reqwest::{Client, RequestBuilder};
use tracing::trace;

use crew_core::PollPayload;
use crew_proto::{
    decode_envelope, decode_lobby, decode_snapshot, ActionReply, ActionRequest, AuthorityError,
    PollTarget,
};

/// HTTP transport to the game authority. Cheap to clone; clones share the
/// connection pool.
#[derive(Debug, Clone)]
pub struct HttpAuthority {
    client: Client,
    base: String,
    cookie: Option<String>,
}

impl HttpAuthority {
    pub fn new(base: &str, cookie: Option<String>, timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base: base.trim_end_matches('/').to_string(),
            cookie: cookie.filter(|value| !value.trim().is_empty()),
        })
    }

    pub async fn poll(&self, target: PollTarget) -> Result<PollPayload, AuthorityError> {
        let request = self.client.get(self.url(target.path()));
        let (status, body) = self.exchange(request).await?;
        trace!(target: "crewlink::http", path = target.path(), status, "poll.reply");
        let value = decode_envelope(status, &body)?;
        match target {
            PollTarget::Player => {
                decode_snapshot(value).map(|snapshot| PollPayload::Player(Box::new(snapshot)))
            }
            PollTarget::Lobby => {
                decode_lobby(value).map(|lobby| PollPayload::Lobby(Box::new(lobby)))
            }
        }
    }

    pub async fn send(&self, request: &ActionRequest) -> Result<ActionReply, AuthorityError> {
        let mut builder = self.client.post(self.url(request.path()));
        if let Some(body) = request.body() {
            builder = builder.json(&body);
        }
        let (status, body) = self.exchange(builder).await?;
        trace!(target: "crewlink::http", path = request.path(), status, "action.reply");
        let value = decode_envelope(status, &body)?;
        request.parse_reply(value)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn exchange(&self, builder: RequestBuilder) -> Result<(u16, String), AuthorityError> {
        let builder = match &self.cookie {
            Some(cookie) => builder.header(COOKIE, cookie.as_str()),
            None => builder,
        };
        let response = builder.send().await.map_err(transport)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(transport)?;
        Ok((status, body))
    }
}

fn transport(err: reqwest::Error) -> AuthorityError {
    AuthorityError::Transport(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalised() {
        let authority =
            HttpAuthority::new("http://127.0.0.1:3000/", Some("  ".into()), Duration::from_secs(1))
                .expect("client builds");
        assert_eq!(
            authority.url(PollTarget::Player.path()),
            "http://127.0.0.1:3000/api/player"
        );
        assert!(authority.cookie.is_none());
    }
}
