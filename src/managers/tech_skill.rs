use crate::constants::paths;
use crate::errors::ToolError;
use crate::managers::{parse_args, respond, ToolSet};
use crate::mcp::envelope::{error_response, ToolResponse};
use crate::services::api_client::ProfileApi;
use crate::services::api_key::{ApiKeyCheck, ApiKeyGate};
use crate::services::logger::Logger;
use crate::utils::suggest::suggest;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TechSkillTool {
    Get,
    Update,
}

const TOOLS: &[TechSkillTool] = &[TechSkillTool::Get, TechSkillTool::Update];

/// Upper bounds (exclusive) of the year ranges and the bucket id each maps to.
/// Anything at or above the last bound falls into bucket 10.
const YEAR_BUCKETS: &[(f64, u8)] = &[(1.0, 0), (2.0, 1), (3.0, 2), (5.0, 3), (10.0, 5)];
const TOP_BUCKET: u8 = 10;

pub fn years_to_bucket(years: f64) -> u8 {
    YEAR_BUCKETS
        .iter()
        .find(|(max, _)| years < *max)
        .map(|(_, bucket)| *bucket)
        .unwrap_or(TOP_BUCKET)
}

pub fn bucket_label(bucket: i64) -> &'static str {
    match bucket {
        0 => "under 1 year",
        1 => "1–2",
        2 => "2–3",
        3 => "3–5",
        5 => "5–10",
        10 => "10+",
        _ => "unknown",
    }
}

/// Whitespace removed, lowercased. Full-width spaces count as whitespace.
pub fn normalize_skill_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

#[derive(Debug, Clone, Deserialize)]
pub struct MasterSkill {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct MasterList {
    tech_skill_list: Vec<MasterSkill>,
}

/// Lookup tables over the skill master for a single call. When two master
/// names normalize to the same key, the first one listed wins.
pub struct SkillIndex {
    by_name: HashMap<String, i64>,
    by_id: HashMap<i64, String>,
    names: Vec<String>,
}

impl SkillIndex {
    pub fn new(master: Vec<MasterSkill>) -> Self {
        let mut by_name = HashMap::new();
        let mut by_id = HashMap::new();
        let mut names = Vec::with_capacity(master.len());
        for skill in master {
            by_name.entry(normalize_skill_name(&skill.name)).or_insert(skill.id);
            by_id.entry(skill.id).or_insert_with(|| skill.name.clone());
            names.push(skill.name);
        }
        Self {
            by_name,
            by_id,
            names,
        }
    }

    pub fn resolve(&self, name: &str) -> Option<i64> {
        self.by_name.get(&normalize_skill_name(name)).copied()
    }

    pub fn name_of(&self, id: i64) -> Option<&str> {
        self.by_id.get(&id).map(String::as_str)
    }

    pub fn suggestions(&self, name: &str) -> Vec<String> {
        suggest(name, &self.names, 3)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SkillInput {
    pub name: String,
    pub years: f64,
}

#[derive(Debug, Deserialize)]
struct UpdateParams {
    tech_skill_list: Vec<SkillInput>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillRecord {
    pub tech_skill_id: i64,
    pub years: i64,
}

/// Resolved records plus the input names that matched nothing in the master.
pub fn resolve_skills(index: &SkillIndex, inputs: &[SkillInput]) -> (Vec<SkillRecord>, Vec<String>) {
    let mut records = Vec::new();
    let mut unknown = Vec::new();
    for input in inputs {
        match index.resolve(&input.name) {
            Some(tech_skill_id) => records.push(SkillRecord {
                tech_skill_id,
                years: i64::from(years_to_bucket(input.years)),
            }),
            None => unknown.push(input.name.clone()),
        }
    }
    (records, unknown)
}

#[derive(Debug)]
pub enum SkillUpdateOutcome {
    Updated(Value),
    NoValidSkills { unknown: Vec<String> },
}

#[derive(Debug, Deserialize)]
struct CurrentSkills {
    #[serde(default)]
    error: Value,
    tech_skill_list: Vec<SkillRecord>,
    #[serde(default)]
    updated_at: Value,
}

#[derive(Debug, Serialize)]
struct SkillView {
    tech_skill_id: i64,
    tech_skill_name: Option<String>,
    years_id: i64,
    years_label: &'static str,
}

pub struct TechSkillManager {
    logger: Logger,
    api: Arc<ProfileApi>,
    gate: ApiKeyGate,
}

impl TechSkillManager {
    pub fn new(logger: Logger, api: Arc<ProfileApi>, gate: ApiKeyGate) -> Self {
        Self {
            logger: logger.child("tech_skill"),
            api,
            gate,
        }
    }

    async fn load_index(&self, key: &str) -> Result<SkillIndex, ToolError> {
        let url = self.api.endpoint(paths::TECH_SKILL_MASTER)?;
        let master: MasterList = serde_json::from_value(self.api.get(url, key).await?)?;
        Ok(SkillIndex::new(master.tech_skill_list))
    }

    async fn current(&self, key: &str) -> Result<ToolResponse, ToolError> {
        let index = self.load_index(key).await?;
        let url = self.api.endpoint(paths::TECH_SKILL)?;
        let current: CurrentSkills = serde_json::from_value(self.api.get(url, key).await?)?;

        let tech_skill_list: Vec<SkillView> = current
            .tech_skill_list
            .iter()
            .map(|record| SkillView {
                tech_skill_id: record.tech_skill_id,
                tech_skill_name: index.name_of(record.tech_skill_id).map(str::to_string),
                years_id: record.years,
                years_label: bucket_label(record.years),
            })
            .collect();

        Ok(ToolResponse::json(&serde_json::json!({
            "error": current.error,
            "updated_at": current.updated_at,
            "tech_skill_list": tech_skill_list,
        })))
    }

    /// Resolves names against a fresh master and sends one PUT with every
    /// match. Nothing is sent when no name resolves.
    pub async fn update(&self, key: &str, inputs: &[SkillInput]) -> Result<SkillUpdateOutcome, ToolError> {
        let index = self.load_index(key).await?;
        let (records, unknown) = resolve_skills(&index, inputs);

        if !unknown.is_empty() {
            let suggestions: HashMap<&str, Vec<String>> = unknown
                .iter()
                .map(|name| (name.as_str(), index.suggestions(name)))
                .collect();
            self.logger.info(
                "skipping unknown tech skills",
                Some(&serde_json::json!({"unknown": unknown, "suggestions": suggestions})),
            );
        }
        if records.is_empty() {
            return Ok(SkillUpdateOutcome::NoValidSkills { unknown });
        }

        let url = self.api.endpoint(paths::TECH_SKILL)?;
        let body = self
            .api
            .put(url, key, serde_json::json!({ "tech_skill_list": records }))
            .await?;
        Ok(SkillUpdateOutcome::Updated(body))
    }
}

#[async_trait]
impl ToolSet for TechSkillManager {
    type Tool = TechSkillTool;

    fn tools() -> &'static [TechSkillTool] {
        TOOLS
    }

    fn tool_name(tool: TechSkillTool) -> &'static str {
        match tool {
            TechSkillTool::Get => "get_tech_skill",
            TechSkillTool::Update => "update_tech_skill",
        }
    }

    async fn call(&self, tool: TechSkillTool, args: Value) -> ToolResponse {
        let key = match self.gate.check() {
            ApiKeyCheck::Valid(key) => key,
            ApiKeyCheck::Invalid(response) => return response,
        };
        let name = Self::tool_name(tool);
        match tool {
            TechSkillTool::Get => {
                let result = self.current(&key).await;
                respond(&self.logger, name, "Failed to fetch tech skills", result)
            }
            TechSkillTool::Update => {
                let failure = "Failed to update tech skills";
                let params: UpdateParams = match parse_args(args) {
                    Ok(params) => params,
                    Err(err) => return respond(&self.logger, name, failure, Err(err)),
                };
                match self.update(&key, &params.tech_skill_list).await {
                    Ok(SkillUpdateOutcome::Updated(body)) => ToolResponse::json(&body),
                    Ok(SkillUpdateOutcome::NoValidSkills { unknown }) => error_response(
                        &format!(
                            "No valid tech skills to update (unknown: {})",
                            unknown.join(", ")
                        ),
                        "No valid tech skills found. Check the skill names.",
                    ),
                    Err(err) => respond(&self.logger, name, failure, Err(err)),
                }
            }
        }
    }
}
