//! Fortune bot: answers `@fortune` with a line from fortune(1).

use anyhow::{bail, Context};
use regex::Regex;
use spaces_client::{
    chat_listener, ClientConfig, Credential, HttpApi, Identity, OAuthClientCredentials, Session,
    WebSocketConnector,
};
use std::sync::Arc;
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{info, warn};

const TRIGGER: &str = "@fortune";

/// Recognizes fortune requests in HTML message bodies.
pub struct RequestMatcher {
    html_tag: Regex,
}

impl RequestMatcher {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            html_tag: Regex::new(r"<.*?>")?,
        })
    }

    pub fn strip_html_tags(&self, text: &str) -> String {
        self.html_tag.replace_all(text, "").into_owned()
    }

    pub fn is_fortune_request(&self, body_text: &str) -> bool {
        self.strip_html_tags(body_text).trim().starts_with(TRIGGER)
    }
}

async fn fortune() -> anyhow::Result<String> {
    let output = Command::new("fortune")
        .args(["-s", "fortunes"])
        .output()
        .await
        .context("running fortune")?;
    if !output.status.success() {
        bail!("fortune exited with {}", output.status);
    }
    let text = String::from_utf8_lossy(&output.stdout);
    Ok(text.trim_end_matches('\n').to_string())
}

pub async fn run(
    config: ClientConfig,
    space_id: &str,
    refresh_token: &str,
    client: OAuthClientCredentials,
) -> anyhow::Result<()> {
    let api = Arc::new(HttpApi::new(config.clone())?);
    let mut credential = Credential::oauth_refreshable(refresh_token)?;
    credential.refresh(api.as_ref(), &client).await?;

    let connector = Arc::new(WebSocketConnector::new(&config));
    let mut session =
        Session::with_backends(Identity::registered(credential), config, api, connector);
    session.login().await?;

    let matcher = RequestMatcher::new()?;
    let (requests_tx, mut requests) = mpsc::unbounded_channel();
    session.add_chat_listener(chat_listener(move |message| {
        if matcher.is_fortune_request(&message.body_text) {
            let _ = requests_tx.send(message.sender.name().to_string());
        }
    }));
    session.start().await?;
    session.enter_group_space(space_id).await?;
    info!("Fortune bot listening in space {}", space_id);

    loop {
        tokio::select! {
            Some(requester) = requests.recv() => {
                info!("Fortune requested by {}", requester);
                match fortune().await {
                    Ok(text) => session.send_group_chat_message(&text).await?,
                    Err(e) => warn!("Could not get a fortune: {:#}", e),
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    info!("Shutting down");
    session.leave_group_space().await?;
    session.stop().await?;
    Ok(())
}
