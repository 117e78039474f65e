use super::model::NarrationRequest;
use serde::{Deserialize, Serialize};

/// Request for POST /api/narrations
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrationRequestDto {
    pub topic_id: i64,
    #[serde(default)]
    pub title: String,
    pub content: String,
}

impl From<NarrationRequestDto> for NarrationRequest {
    fn from(dto: NarrationRequestDto) -> Self {
        Self {
            topic_id: dto.topic_id,
            title: dto.title,
            raw_content: dto.content,
        }
    }
}

/// Immediate acknowledgment; the job result is never reported here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NarrationAck {
    pub started: bool,
    pub topic_id: i64,
}
