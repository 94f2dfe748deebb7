use crate::constants::paths;
use crate::errors::ToolError;
use crate::managers::{parse_args, respond, ToolSet};
use crate::mcp::envelope::{error_response, ToolResponse};
use crate::services::api_client::ProfileApi;
use crate::services::api_key::{ApiKeyCheck, ApiKeyGate};
use crate::services::history::{HistoryLog, ObjectType};
use crate::services::logger::Logger;
use crate::utils::text::unescape_text;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExperienceTool {
    List,
    Create,
    Update,
    Delete,
    BulkReplace,
}

const TOOLS: &[ExperienceTool] = &[
    ExperienceTool::List,
    ExperienceTool::Create,
    ExperienceTool::Update,
    ExperienceTool::Delete,
    ExperienceTool::BulkReplace,
];

const DELETION_WARNING: &str = "The experience list is shrinking, so existing experiences may be deleted. Show the user exactly what will change and get their explicit confirmation before proceeding. Once the user has confirmed, re-run with force=true to continue. Never proceed with a deletion without explicit user confirmation.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionRef {
    pub id: i64,
}

/// Writable fields of a work experience. `end_year`/`end_month` of 0 mean the
/// experience is ongoing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    pub organization_name: String,
    pub positions: Vec<PositionRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_name: Option<String>,
    pub is_client_work: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_company_name: Option<String>,
    pub start_year: i64,
    pub start_month: i64,
    pub end_year: i64,
    pub end_month: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// An experience as submitted for full replacement. `id: null` asks upstream
/// to create the row.
#[derive(Debug, Clone, Serialize)]
pub struct ExperienceRecord {
    pub id: Option<i64>,
    #[serde(flatten)]
    pub experience: Experience,
}

#[derive(Debug, Deserialize)]
struct UpdateParams {
    experience_id: i64,
    #[serde(flatten)]
    experience: Experience,
}

#[derive(Debug, Deserialize)]
struct DeleteParams {
    experience_id: i64,
}

#[derive(Debug, Deserialize)]
struct BulkParams {
    experience_list: Vec<Experience>,
    #[serde(default)]
    force: bool,
}

#[derive(Debug, Deserialize)]
struct CurrentExperience {
    organization_name: String,
}

#[derive(Debug, Deserialize)]
struct CurrentExperiences {
    experience_list: Vec<CurrentExperience>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletionCheck {
    Safe,
    Suspected {
        current_count: usize,
        new_count: usize,
        removed_organizations: Vec<String>,
    },
}

impl DeletionCheck {
    pub fn describe(&self) -> String {
        match self {
            DeletionCheck::Safe => "no experiences would be removed".to_string(),
            DeletionCheck::Suspected {
                current_count,
                new_count,
                removed_organizations,
            } => {
                let mut parts = Vec::new();
                if current_count > new_count {
                    parts.push(format!(
                        "experience count would drop from {} to {}",
                        current_count, new_count
                    ));
                }
                if !removed_organizations.is_empty() {
                    parts.push(format!(
                        "organizations missing from the new list: {}",
                        removed_organizations.join(", ")
                    ));
                }
                parts.join("; ")
            }
        }
    }
}

/// Flags a replacement that would lose data: fewer entries than today, or an
/// organization that exists today but is absent from the new list. Names are
/// compared as a set, so duplicates only matter through the count.
pub fn check_experience_deletion<C, N>(current: &[C], proposed: &[N]) -> DeletionCheck
where
    C: AsRef<str>,
    N: AsRef<str>,
{
    let new_names: BTreeSet<&str> = proposed.iter().map(|name| name.as_ref()).collect();
    let removed_organizations: Vec<String> = current
        .iter()
        .map(|name| name.as_ref())
        .collect::<BTreeSet<&str>>()
        .into_iter()
        .filter(|name| !new_names.contains(name))
        .map(str::to_string)
        .collect();

    if current.len() > proposed.len() || !removed_organizations.is_empty() {
        DeletionCheck::Suspected {
            current_count: current.len(),
            new_count: proposed.len(),
            removed_organizations,
        }
    } else {
        DeletionCheck::Safe
    }
}

#[derive(Debug)]
pub enum BulkOutcome {
    Replaced(Value),
    DeletionRejected(DeletionCheck),
}

pub struct ExperienceManager {
    logger: Logger,
    api: Arc<ProfileApi>,
    gate: ApiKeyGate,
    history: HistoryLog,
}

impl ExperienceManager {
    pub fn new(logger: Logger, api: Arc<ProfileApi>, gate: ApiKeyGate, history: HistoryLog) -> Self {
        Self {
            logger: logger.child("experiences"),
            api,
            gate,
            history,
        }
    }

    async fn list(&self, key: &str) -> Result<ToolResponse, ToolError> {
        let url = self.api.endpoint(paths::EXPERIENCES)?;
        let body = self.api.get(url, key).await?;
        Ok(ToolResponse::json(&body))
    }

    async fn create(&self, key: &str, args: Value) -> Result<ToolResponse, ToolError> {
        let mut experience: Experience = parse_args(args)?;
        experience.description = Some(unescape_text(experience.description.as_deref()));

        let url = self.api.endpoint(paths::EXPERIENCES)?;
        let body = self
            .api
            .post(url, key, serde_json::to_value(&experience)?)
            .await?;
        Ok(ToolResponse::json(&body))
    }

    async fn update(&self, key: &str, args: Value) -> Result<ToolResponse, ToolError> {
        let UpdateParams {
            experience_id,
            mut experience,
        } = parse_args(args)?;
        experience.position_name = Some(experience.position_name.unwrap_or_default());
        experience.description = Some(unescape_text(experience.description.as_deref()));

        let previous = self.api.get(self.api.endpoint(paths::EXPERIENCES)?, key).await?;
        self.history
            .record("update_experience", ObjectType::Experience, previous)
            .await;

        let url = self
            .api
            .endpoint_with_id(paths::EXPERIENCES, &experience_id.to_string())?;
        let body = self
            .api
            .put(url, key, serde_json::to_value(&experience)?)
            .await?;
        Ok(ToolResponse::json(&body))
    }

    async fn delete(&self, key: &str, args: Value) -> Result<ToolResponse, ToolError> {
        let params: DeleteParams = parse_args(args)?;
        let url = self
            .api
            .endpoint_with_id(paths::EXPERIENCES, &params.experience_id.to_string())?;
        self.api.delete(url, key).await?;
        Ok(ToolResponse::text("Experience deleted successfully."))
    }

    async fn current_organizations(&self, key: &str) -> Result<Vec<String>, ToolError> {
        let body = self.api.get(self.api.endpoint(paths::EXPERIENCES)?, key).await?;
        let current: CurrentExperiences = serde_json::from_value(body)?;
        Ok(current
            .experience_list
            .into_iter()
            .map(|exp| exp.organization_name)
            .collect())
    }

    /// Replaces the whole experience list in one request unless the guard
    /// fires and `force` is off. Every submitted entry is sent with a null id.
    pub async fn bulk_replace(
        &self,
        key: &str,
        experiences: Vec<Experience>,
        force: bool,
    ) -> Result<BulkOutcome, ToolError> {
        let current = self.current_organizations(key).await?;
        let proposed: Vec<&str> = experiences
            .iter()
            .map(|exp| exp.organization_name.as_str())
            .collect();

        let check = check_experience_deletion(&current, &proposed);
        if matches!(check, DeletionCheck::Suspected { .. }) {
            if !force {
                return Ok(BulkOutcome::DeletionRejected(check));
            }
            self.logger.info(
                "forcing replacement past deletion guard",
                Some(&serde_json::json!({"details": check.describe()})),
            );
        }

        let experience_list: Vec<ExperienceRecord> = experiences
            .into_iter()
            .map(|mut experience| {
                experience.description = experience
                    .description
                    .map(|text| unescape_text(Some(&text)));
                ExperienceRecord {
                    id: None,
                    experience,
                }
            })
            .collect();
        let url = self.api.endpoint(paths::EXPERIENCES)?;
        let body = self
            .api
            .post(url, key, serde_json::json!({ "experience_list": experience_list }))
            .await?;
        Ok(BulkOutcome::Replaced(body))
    }

    async fn bulk(&self, key: &str, args: Value) -> ToolResponse {
        let params: BulkParams = match parse_args(args) {
            Ok(params) => params,
            Err(err) => return error_response(&err, "Failed to update experiences"),
        };
        if params.experience_list.is_empty() {
            return error_response("experience_list is required", "Experience list is required");
        }

        match self
            .bulk_replace(key, params.experience_list, params.force)
            .await
        {
            Ok(BulkOutcome::Replaced(body)) => ToolResponse::json(&body),
            Ok(BulkOutcome::DeletionRejected(check)) => {
                let details = check.describe();
                self.logger.info(
                    "bulk replacement rejected",
                    Some(&serde_json::json!({"details": details})),
                );
                error_response(&details, DELETION_WARNING)
            }
            Err(err) => respond(
                &self.logger,
                "bulk_update_experiences",
                "Failed to update experiences",
                Err(err),
            ),
        }
    }
}

#[async_trait]
impl ToolSet for ExperienceManager {
    type Tool = ExperienceTool;

    fn tools() -> &'static [ExperienceTool] {
        TOOLS
    }

    fn tool_name(tool: ExperienceTool) -> &'static str {
        match tool {
            ExperienceTool::List => "get_experiences",
            ExperienceTool::Create => "create_experience",
            ExperienceTool::Update => "update_experience",
            ExperienceTool::Delete => "delete_experience",
            ExperienceTool::BulkReplace => "bulk_update_experiences",
        }
    }

    async fn call(&self, tool: ExperienceTool, args: Value) -> ToolResponse {
        let key = match self.gate.check() {
            ApiKeyCheck::Valid(key) => key,
            ApiKeyCheck::Invalid(response) => return response,
        };
        let name = Self::tool_name(tool);
        match tool {
            ExperienceTool::List => {
                let result = self.list(&key).await;
                respond(&self.logger, name, "Failed to fetch experiences", result)
            }
            ExperienceTool::Create => {
                let result = self.create(&key, args).await;
                respond(&self.logger, name, "Failed to create experience", result)
            }
            ExperienceTool::Update => {
                let result = self.update(&key, args).await;
                respond(&self.logger, name, "Failed to update experience", result)
            }
            ExperienceTool::Delete => {
                let result = self.delete(&key, args).await;
                respond(&self.logger, name, "Failed to delete experience", result)
            }
            ExperienceTool::BulkReplace => self.bulk(&key, args).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_lists_are_safe() {
        assert_eq!(check_experience_deletion(&["A", "B"], &["B", "A"]), DeletionCheck::Safe);
    }

    #[test]
    fn growing_list_is_safe() {
        assert_eq!(check_experience_deletion(&["A"], &["A", "C"]), DeletionCheck::Safe);
        assert_eq!(
            check_experience_deletion::<&str, &str>(&[], &["A"]),
            DeletionCheck::Safe
        );
    }

    #[test]
    fn shrinking_list_is_suspected_even_when_names_survive() {
        let check = check_experience_deletion(&["A", "A"], &["A"]);
        assert_eq!(
            check,
            DeletionCheck::Suspected {
                current_count: 2,
                new_count: 1,
                removed_organizations: vec![],
            }
        );
        assert_eq!(check.describe(), "experience count would drop from 2 to 1");
    }

    #[test]
    fn renamed_organization_is_suspected_at_equal_length() {
        let check = check_experience_deletion(&["A", "B"], &["A", "C"]);
        assert_eq!(
            check,
            DeletionCheck::Suspected {
                current_count: 2,
                new_count: 2,
                removed_organizations: vec!["B".to_string()],
            }
        );
        assert_eq!(check.describe(), "organizations missing from the new list: B");
    }

    #[test]
    fn removed_organizations_are_sorted_and_deduplicated() {
        let check = check_experience_deletion(&["Zeta", "Alpha", "Zeta"], &["Other"]);
        let DeletionCheck::Suspected {
            removed_organizations,
            ..
        } = check
        else {
            panic!("must be suspected");
        };
        assert_eq!(removed_organizations, vec!["Alpha", "Zeta"]);
    }

    #[test]
    fn record_serializes_null_id_alongside_fields() {
        let record = ExperienceRecord {
            id: None,
            experience: Experience {
                organization_name: "A".to_string(),
                positions: vec![PositionRef { id: 2 }],
                position_name: None,
                is_client_work: false,
                client_company_name: None,
                start_year: 2020,
                start_month: 4,
                end_year: 0,
                end_month: 0,
                description: Some("line".to_string()),
            },
        };
        let value = serde_json::to_value(&record).expect("serialize");
        assert!(value["id"].is_null());
        assert_eq!(value["organization_name"], "A");
        assert_eq!(value["positions"][0]["id"], 2);
        assert!(value.get("position_name").is_none());
    }
}
