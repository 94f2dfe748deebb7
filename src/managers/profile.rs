use crate::constants::{limits, paths};
use crate::errors::ToolError;
use crate::managers::{parse_args, respond, ToolSet};
use crate::mcp::envelope::ToolResponse;
use crate::services::api_client::ProfileApi;
use crate::services::api_key::{ApiKeyCheck, ApiKeyGate};
use crate::services::history::{HistoryLog, ObjectType};
use crate::services::logger::Logger;
use crate::utils::text::unescape_text;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileTool {
    GetJobSummary,
    UpdateJobSummary,
    GetWantToDo,
    UpdateWantToDo,
}

const TOOLS: &[ProfileTool] = &[
    ProfileTool::GetJobSummary,
    ProfileTool::UpdateJobSummary,
    ProfileTool::GetWantToDo,
    ProfileTool::UpdateWantToDo,
];

/// A free-text profile section stored under a single JSON field.
struct Section {
    path: &'static str,
    field: &'static str,
    max_chars: usize,
    history: Option<ObjectType>,
}

const JOB_SUMMARY: Section = Section {
    path: paths::JOB_SUMMARY,
    field: "job_summary",
    max_chars: limits::JOB_SUMMARY_MAX_CHARS,
    history: None,
};

const WANT_TO_DO: Section = Section {
    path: paths::WANT_TO_DO,
    field: "want_to_do",
    max_chars: limits::WANT_TO_DO_MAX_CHARS,
    history: Some(ObjectType::WantToDo),
};

#[derive(Debug, Deserialize)]
struct JobSummaryParams {
    job_summary: String,
}

#[derive(Debug, Deserialize)]
struct WantToDoParams {
    want_to_do: String,
}

pub struct ProfileManager {
    logger: Logger,
    api: Arc<ProfileApi>,
    gate: ApiKeyGate,
    history: HistoryLog,
}

impl ProfileManager {
    pub fn new(logger: Logger, api: Arc<ProfileApi>, gate: ApiKeyGate, history: HistoryLog) -> Self {
        Self {
            logger: logger.child("profile"),
            api,
            gate,
            history,
        }
    }

    async fn fetch(&self, key: &str, section: &Section) -> Result<ToolResponse, ToolError> {
        let body = self.api.get(self.api.endpoint(section.path)?, key).await?;
        Ok(ToolResponse::json(&body))
    }

    async fn store(
        &self,
        key: &str,
        tool: &str,
        section: &Section,
        text: &str,
    ) -> Result<ToolResponse, ToolError> {
        let text = unescape_text(Some(text));
        let length = text.chars().count();
        if length > section.max_chars {
            return Err(ToolError::invalid_params(format!(
                "{} must be at most {} characters (got {})",
                section.field, section.max_chars, length
            )));
        }

        let url = self.api.endpoint(section.path)?;
        if let Some(object_type) = section.history {
            let previous = self.api.get(url.clone(), key).await?;
            self.history.record(tool, object_type, previous).await;
        }

        let mut body = serde_json::Map::new();
        body.insert(section.field.to_string(), Value::String(text));
        let response = self.api.put(url, key, Value::Object(body)).await?;
        Ok(ToolResponse::json(&response))
    }
}

#[async_trait]
impl ToolSet for ProfileManager {
    type Tool = ProfileTool;

    fn tools() -> &'static [ProfileTool] {
        TOOLS
    }

    fn tool_name(tool: ProfileTool) -> &'static str {
        match tool {
            ProfileTool::GetJobSummary => "get_job_summary",
            ProfileTool::UpdateJobSummary => "update_job_summary",
            ProfileTool::GetWantToDo => "get_want_to_do",
            ProfileTool::UpdateWantToDo => "update_want_to_do",
        }
    }

    async fn call(&self, tool: ProfileTool, args: Value) -> ToolResponse {
        let key = match self.gate.check() {
            ApiKeyCheck::Valid(key) => key,
            ApiKeyCheck::Invalid(response) => return response,
        };
        let name = Self::tool_name(tool);
        match tool {
            ProfileTool::GetJobSummary => {
                let result = self.fetch(&key, &JOB_SUMMARY).await;
                respond(&self.logger, name, "Failed to fetch job summary", result)
            }
            ProfileTool::UpdateJobSummary => {
                let result = match parse_args::<JobSummaryParams>(args) {
                    Ok(params) => self.store(&key, name, &JOB_SUMMARY, &params.job_summary).await,
                    Err(err) => Err(err),
                };
                respond(&self.logger, name, "Failed to update job summary", result)
            }
            ProfileTool::GetWantToDo => {
                let result = self.fetch(&key, &WANT_TO_DO).await;
                respond(&self.logger, name, "Failed to fetch career aspirations", result)
            }
            ProfileTool::UpdateWantToDo => {
                let result = match parse_args::<WantToDoParams>(args) {
                    Ok(params) => self.store(&key, name, &WANT_TO_DO, &params.want_to_do).await,
                    Err(err) => Err(err),
                };
                respond(&self.logger, name, "Failed to update career aspirations", result)
            }
        }
    }
}
