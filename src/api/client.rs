//! HTTP client for the chat backend

use super::types::{EditResponse, ExchangeResponse, MessageRequest};
use super::ApiError;
use crate::runtime::ChatApi;
use crate::session::Credential;
use crate::state_machine::{EditedMessage, Exchange, MessageId};
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Backend client speaking the `/message` REST contract
pub struct HttpChatApi {
    client: Client,
    base_url: String,
}

impl HttpChatApi {
    /// `timeout` of `None` lets a hung call wait forever
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn message_url(&self) -> String {
        format!("{}/message", self.base_url)
    }

    fn message_id_url(&self, id: MessageId) -> String {
        format!("{}/message/{}", self.base_url, id)
    }

    /// Send the request and return the body of a successful response
    async fn execute(request: RequestBuilder, credential: &Credential) -> Result<String, ApiError> {
        let response = request
            .header(AUTHORIZATION, credential.bearer())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ApiError::status(status, body));
        }
        Ok(body)
    }

    async fn execute_json<T: DeserializeOwned>(
        request: RequestBuilder,
        credential: &Credential,
    ) -> Result<T, ApiError> {
        let body = Self::execute(request, credential).await?;
        serde_json::from_str(&body).map_err(|e| ApiError::decode(e.to_string(), body))
    }
}

#[async_trait]
impl ChatApi for HttpChatApi {
    async fn send_message(
        &self,
        text: &str,
        credential: &Credential,
    ) -> Result<Exchange, ApiError> {
        let request = self.client.post(self.message_url()).json(&MessageRequest {
            message: text.to_string(),
        });
        let response: ExchangeResponse = Self::execute_json(request, credential).await?;
        Ok(response.into())
    }

    async fn edit_message(
        &self,
        id: MessageId,
        text: &str,
        credential: &Credential,
    ) -> Result<EditedMessage, ApiError> {
        let request = self.client.put(self.message_id_url(id)).json(&MessageRequest {
            message: text.to_string(),
        });
        let response: EditResponse = Self::execute_json(request, credential).await?;
        Ok(response.into())
    }

    async fn delete_message(&self, id: MessageId, credential: &Credential) -> Result<(), ApiError> {
        let request = self.client.delete(self.message_id_url(id));
        Self::execute(request, credential).await?;
        Ok(())
    }
}
