//! Interaction webhook handler.
//!
//! Verifies the request (via [`SignedBody`]), decodes the interaction, and
//! answers synchronously. A `talk` command is answered with a deferred
//! response while the talk itself runs in a background task that keeps
//! editing the original message.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use tracing::Instrument;
use uuid::Uuid;

use sakura_core::interaction::{Dispatch, dispatch};
use sakura_core::talk::{TalkOrchestrator, TalkRequest};
use sakura_types::interaction::{Interaction, InteractionResponse};

use crate::http::error::AppError;
use crate::http::extractors::signature::SignedBody;
use crate::state::AppState;

/// POST /interactions - Receive a signed interaction.
pub async fn receive_interaction(
    State(state): State<AppState>,
    SignedBody(body): SignedBody,
) -> Result<Json<InteractionResponse>, AppError> {
    let interaction: Interaction = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("invalid interaction payload: {e}")))?;

    tracing::debug!(
        interaction_id = %interaction.id,
        kind = %interaction.kind,
        "interaction received"
    );

    let dispatched = dispatch(&interaction)?;
    let response = dispatched.response();

    if let Dispatch::Talk(request) = dispatched {
        spawn_talk(&state, &interaction, request);
    }

    Ok(Json(response))
}

/// Start a talk task detached from the request.
///
/// The task owns everything it needs; nothing is shared with other talks.
fn spawn_talk(state: &AppState, interaction: &Interaction, request: TalkRequest) {
    let request = request.with_system_prompt(state.system_prompt.clone());
    let publisher = Arc::new(state.followup.publisher_for(interaction.token.clone()));
    let orchestrator = TalkOrchestrator::new(Arc::clone(&state.chat), publisher)
        .with_heartbeat_interval(state.heartbeat_interval);

    let span = tracing::info_span!(
        "talk",
        talk_id = %Uuid::now_v7(),
        interaction_id = %interaction.id,
    );

    tokio::spawn(
        async move {
            let phase = orchestrator.run(request).await;
            tracing::debug!(%phase, "talk task finished");
        }
        .instrument(span),
    );
}
