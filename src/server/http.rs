//! `POST /api/ai`: one-shot prompt endpoint.
//!
//! Unlike the WebSocket relay this path accepts an explicit provider and
//! reports which provider answered. It also always applies the HTTP prefix
//! guard (`>` by default).

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use log::{error, info};
use serde::{Deserialize, Serialize};

use super::RelayState;
use crate::core::{MessagePolicy, PolicyViolation};

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct PromptRequest {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum PromptReply {
    Success { response: String, provider: String },
    Failure { error: String },
}

fn failure(status: StatusCode, error: impl Into<String>) -> (StatusCode, Json<PromptReply>) {
    (
        status,
        Json(PromptReply::Failure {
            error: error.into(),
        }),
    )
}

pub(super) async fn prompt_handler(
    State(state): State<RelayState>,
    payload: Result<Json<PromptRequest>, JsonRejection>,
) -> (StatusCode, Json<PromptReply>) {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            return failure(
                StatusCode::BAD_REQUEST,
                format!("Invalid request body: {}", rejection.body_text()),
            );
        }
    };

    let prompt = request.prompt.unwrap_or_default();
    match MessagePolicy::new(state.http_prefix).check(&prompt) {
        Ok(()) => {}
        Err(violation @ PolicyViolation::Empty) => {
            return failure(StatusCode::BAD_REQUEST, violation.to_string());
        }
        Err(violation @ PolicyViolation::MissingPrefix(_)) => {
            return failure(StatusCode::UNPROCESSABLE_ENTITY, violation.to_string());
        }
    }

    info!("Thinking about: {:?}", prompt);

    match state
        .invoker
        .complete(request.provider.as_deref(), &prompt)
        .await
    {
        Ok(completion) => (
            StatusCode::OK,
            Json(PromptReply::Success {
                response: completion.text,
                provider: completion.provider,
            }),
        ),
        Err(e) => {
            error!("Error generating response: {}", e);
            failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to generate response: {e}"),
            )
        }
    }
}
