//! Chat endpoints.

use reqwest::{Method, StatusCode};
use tracing::debug;

use ub_core::error::UbResult;
use ub_models::{ActionResponse, Chat, ChatRequest, ChatResponse};

use crate::client::ApiClient;

/// Outcome of a single existence lookup for one participant ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatExistence {
    /// The backend answered 200.
    Exists,
    /// The backend answered 404.
    Missing,
    /// Any other status; the chat may or may not exist.
    Indeterminate(u16),
}

impl ChatExistence {
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::OK => Self::Exists,
            StatusCode::NOT_FOUND => Self::Missing,
            other => Self::Indeterminate(other.as_u16()),
        }
    }

    pub fn exists(self) -> bool {
        matches!(self, Self::Exists)
    }
}

/// Result of a create request.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCreation {
    Created(ChatResponse),
    /// The backend refused a duplicate (409 Conflict).
    AlreadyExisted,
}

impl ApiClient {
    /// Look up the chat between `first` and `second`, in that order.
    ///
    /// Only transport failures are errors; every status maps to a
    /// [`ChatExistence`].
    pub async fn chat_existence(&self, first: &str, second: &str) -> UbResult<ChatExistence> {
        let path = format!(
            "/chats/getByBothUsers/{}/{}",
            Self::segment(first),
            Self::segment(second)
        );
        let resp = self.send(Method::GET, &path, None).await?;
        let existence = ChatExistence::from_status(resp.status());
        debug!("chat existence {first} -> {second}: {existence:?}");
        Ok(existence)
    }

    /// Create a chat between sender and receiver.
    pub async fn create_chat(&self, request: &ChatRequest) -> UbResult<ChatCreation> {
        let path = "/chats/";
        let body = serde_json::to_value(request)?;
        let resp = self.send(Method::POST, path, Some(&body)).await?;

        if resp.status() == StatusCode::CONFLICT {
            return Ok(ChatCreation::AlreadyExisted);
        }

        let resp = Self::check_status(path, resp).await?;
        let text = resp
            .text()
            .await
            .map_err(Self::classify_error)?;
        // Some deployments answer 201 with an empty body.
        let created = if text.trim().is_empty() {
            ChatResponse::default()
        } else {
            serde_json::from_str(&text)?
        };
        Ok(ChatCreation::Created(created))
    }

    /// All chats a user takes part in. A 404 surfaces as `NotFound`.
    pub async fn chats_by_username(&self, username: &str) -> UbResult<Vec<Chat>> {
        let path = format!("/chats/getByUsername/{}", Self::segment(username));
        self.get_json(&path).await
    }

    /// Delete a chat by id.
    pub async fn delete_chat(&self, chat_id: &str) -> UbResult<ActionResponse> {
        let path = format!("/chats/{}", Self::segment(chat_id));
        self.delete_json(&path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_existence_from_status() {
        assert_eq!(ChatExistence::from_status(StatusCode::OK), ChatExistence::Exists);
        assert_eq!(ChatExistence::from_status(StatusCode::NOT_FOUND), ChatExistence::Missing);
        assert_eq!(
            ChatExistence::from_status(StatusCode::INTERNAL_SERVER_ERROR),
            ChatExistence::Indeterminate(500)
        );
        assert!(!ChatExistence::Indeterminate(204).exists());
        assert!(ChatExistence::Exists.exists());
    }
}
