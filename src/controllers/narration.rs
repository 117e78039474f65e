use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::{
    domain::narration::{NarrationAck, NarrationRequestDto, NarrationService},
    error::{AppError, AppResult},
};

pub struct NarrationController {
    narration_service: Arc<NarrationService>,
}

impl NarrationController {
    pub fn new(narration_service: Arc<NarrationService>) -> Self {
        Self { narration_service }
    }

    /// POST /api/narrations - Start narrating a topic in the background
    pub async fn start(
        State(controller): State<Arc<NarrationController>>,
        Json(request): Json<NarrationRequestDto>,
    ) -> AppResult<(StatusCode, Json<NarrationAck>)> {
        if request.content.trim().is_empty() {
            return Err(AppError::BadRequest("Content cannot be empty".to_string()));
        }

        tracing::info!(
            topic_id = request.topic_id,
            content_length = request.content.len(),
            "Narration requested"
        );

        let ack = controller.narration_service.start(request.into());

        Ok((StatusCode::ACCEPTED, Json(ack)))
    }
}
