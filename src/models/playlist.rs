use crate::models::{Criteria, QueryDescriptor};
use serde::{Deserialize, Serialize};
use validator::Validate;

fn default_bpm_limit() -> usize {
    50
}

fn default_criteria_limit() -> usize {
    10
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SearchByBpmRequest {
    #[validate(range(min = 1, max = 400))]
    pub min_bpm: u32,
    #[validate(range(min = 1, max = 400))]
    pub max_bpm: u32,
    #[serde(default = "default_bpm_limit")]
    #[validate(range(min = 1, max = 100))]
    pub limit: usize,
    #[serde(default)]
    pub access_token: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SearchByCriteriaRequest {
    #[serde(default)]
    pub criteria: Option<Criteria>,
    /// Free text interpreted by the language model before searching
    #[serde(default)]
    #[validate(length(min = 1, max = 1000))]
    pub prompt: Option<String>,
    #[serde(default = "default_criteria_limit")]
    #[validate(range(min = 1, max = 100))]
    pub limit: usize,
    #[serde(default)]
    pub access_token: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ParsePromptRequest {
    #[validate(length(min = 1, max = 1000))]
    pub prompt: String,
    #[serde(default)]
    pub access_token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsePromptResponse {
    pub criteria: Criteria,
    pub descriptor: QueryDescriptor,
    pub suggested_name: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlaylistRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1))]
    pub track_uris: Vec<String>,
    #[serde(default)]
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistInfo {
    pub id: String,
    pub name: String,
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreatePlaylistResponse {
    pub success: bool,
    pub playlist: PlaylistInfo,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub display_name: Option<String>,
}
