//! `.client_data` file: OAuth2 client id and secret as `key=value` lines.

use anyhow::{anyhow, Context};
use spaces_client::OAuthClientCredentials;
use std::path::Path;

pub fn parse_client_data(contents: &str) -> anyhow::Result<OAuthClientCredentials> {
    let mut client_id = None;
    let mut client_secret = None;
    for line in contents.lines() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        match key.trim() {
            "client_id" => client_id = Some(value.trim().to_string()),
            "client_secret" => client_secret = Some(value.trim().to_string()),
            _ => {}
        }
    }

    match (client_id, client_secret) {
        (Some(id), Some(secret)) => Ok(OAuthClientCredentials::new(id, secret)),
        (None, _) => Err(anyhow!("client_id is missing")),
        (_, None) => Err(anyhow!("client_secret is missing")),
    }
}

pub fn read_client_data(path: &Path) -> anyhow::Result<OAuthClientCredentials> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading client data from {}", path.display()))?;
    parse_client_data(&contents).with_context(|| format!("in {}", path.display()))
}
