use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{FcmTokenManager, PushError, PushGateway};
use crate::core::config::PushConfig;
use crate::features::notifications::models::PushMessage;

const FCM_BASE_URL: &str = "https://fcm.googleapis.com/v1";

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    message: FcmMessage<'a>,
}

#[derive(Debug, Serialize)]
struct FcmMessage<'a> {
    token: &'a str,
    notification: FcmNotification<'a>,
    data: &'a BTreeMap<String, String>,
    android: AndroidConfig<'a>,
}

#[derive(Debug, Serialize)]
struct FcmNotification<'a> {
    title: &'a str,
    body: &'a str,
}

#[derive(Debug, Serialize)]
struct AndroidConfig<'a> {
    priority: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    name: String,
}

/// Firebase Cloud Messaging HTTP v1 gateway
pub struct FcmGateway {
    project_id: String,
    token_manager: FcmTokenManager,
    http_client: reqwest::Client,
}

impl FcmGateway {
    pub fn new(config: PushConfig) -> Self {
        Self {
            project_id: config.project_id.clone(),
            token_manager: FcmTokenManager::new(config),
            http_client: reqwest::Client::new(),
        }
    }

    fn send_url(&self) -> String {
        format!("{}/projects/{}/messages:send", FCM_BASE_URL, self.project_id)
    }
}

#[async_trait]
impl PushGateway for FcmGateway {
    async fn send(&self, token: &str, message: &PushMessage) -> Result<String, PushError> {
        let access_token = self.token_manager.get_access_token().await?;

        let request = SendRequest {
            message: FcmMessage {
                token,
                notification: FcmNotification {
                    title: &message.title,
                    body: &message.body,
                },
                data: &message.data,
                android: AndroidConfig { priority: "high" },
            },
        };

        let response = self
            .http_client
            .post(self.send_url())
            .bearer_auth(access_token)
            .json(&request)
            .send()
            .await
            .map_err(|e| PushError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(PushError::Rejected { status, body });
        }

        let body: SendResponse = response
            .json()
            .await
            .map_err(|e| PushError::Transport(e.to_string()))?;

        Ok(body.name)
    }
}
