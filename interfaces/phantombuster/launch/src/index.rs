use reqwest::{Client, StatusCode};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug)]
pub struct PhantomLaunchResult {
    pub body: String,
    pub status: StatusCode,
}

#[derive(Serialize)]
struct LaunchPayload<'a> {
    argument: LaunchArgument<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LaunchArgument<'a> {
    post_urls: &'a [&'a str],
}

/// Starts a run of the given phantom against `post_urls`.
///
/// The response is handed back untouched; callers decide what a
/// non-success status means for them.
pub async fn launch_phantom(
    base_url: &str,
    api_key: &str,
    agent_id: &str,
    post_urls: &[&str],
) -> Result<PhantomLaunchResult, LaunchPhantomError> {
    let endpoint = format!(
        "{}/api/v2/phantoms/{agent_id}/launch",
        base_url.trim_end_matches('/')
    );

    let payload = LaunchPayload {
        argument: LaunchArgument { post_urls },
    };

    let client = Client::new();

    let response = client
        .post(endpoint)
        .header("X-Phantombuster-Key", api_key)
        .header("Content-Type", "application/json")
        .json(&payload)
        .send()
        .await
        .map_err(|source| LaunchPhantomError::RequestSend { source })?;

    let status = response.status();

    let body = response
        .text()
        .await
        .map_err(|source| LaunchPhantomError::ResponseRead { source })?;

    Ok(PhantomLaunchResult { body, status })
}

#[derive(Debug, Error)]
pub enum LaunchPhantomError {
    #[error("RequestSend: {source}")]
    RequestSend {
        source: reqwest::Error,
    },

    #[error("ResponseRead: {source}")]
    ResponseRead {
        source: reqwest::Error,
    },
}
