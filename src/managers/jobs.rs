use crate::constants::paths;
use crate::errors::ToolError;
use crate::managers::{parse_args, respond, ToolSet};
use crate::mcp::envelope::{error_response, ToolResponse};
use crate::services::api_client::ProfileApi;
use crate::services::logger::Logger;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobsTool {
    Search,
    Detail,
}

const TOOLS: &[JobsTool] = &[JobsTool::Search, JobsTool::Detail];

#[derive(Debug, Default, Deserialize)]
pub struct SearchJobsParams {
    pub keyword: Option<String>,
    pub page: Option<Number>,
    pub positions: Option<Vec<String>>,
    pub prog_lang_ids: Option<Vec<i64>>,
    pub framework_ids: Option<Vec<i64>>,
    pub db_ids: Option<Vec<i64>>,
    pub infra_ids: Option<Vec<i64>>,
    pub business_types: Option<Vec<i64>>,
    pub employment_types: Option<Vec<i64>>,
    pub work_styles: Option<Vec<i64>>,
    pub preferred_condition_ids: Option<Vec<i64>>,
    pub annual_salary_min: Option<Number>,
    pub sort_type: Option<String>,
}

impl SearchJobsParams {
    /// Query string pairs in wire order. Lists repeat as `key[]=value`; empty
    /// lists, a zero page and blank strings are left out.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self
            .page
            .as_ref()
            .filter(|page| page.as_f64().is_some_and(|n| n > 0.0))
        {
            pairs.push(("page".to_string(), page.to_string()));
        }
        if let Some(keyword) = self.keyword.as_deref().filter(|k| !k.is_empty()) {
            pairs.push(("keyword".to_string(), keyword.to_string()));
        }
        push_list(&mut pairs, "positions", self.positions.as_deref());
        push_list(&mut pairs, "prog_lang_ids", self.prog_lang_ids.as_deref());
        push_list(&mut pairs, "framework_ids", self.framework_ids.as_deref());
        push_list(&mut pairs, "db_ids", self.db_ids.as_deref());
        push_list(&mut pairs, "infra_ids", self.infra_ids.as_deref());
        push_list(&mut pairs, "business_types", self.business_types.as_deref());
        push_list(&mut pairs, "employment_types", self.employment_types.as_deref());
        push_list(&mut pairs, "work_styles", self.work_styles.as_deref());
        push_list(
            &mut pairs,
            "preferred_condition_ids",
            self.preferred_condition_ids.as_deref(),
        );
        if let Some(min) = &self.annual_salary_min {
            pairs.push(("annual_salary_min".to_string(), min.to_string()));
        }
        if let Some(sort) = self.sort_type.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("sort_type".to_string(), sort.to_string()));
        }
        pairs
    }
}

fn push_list<T: ToString>(pairs: &mut Vec<(String, String)>, key: &str, values: Option<&[T]>) {
    let key = format!("{}[]", key);
    for value in values.unwrap_or_default() {
        pairs.push((key.clone(), value.to_string()));
    }
}

#[derive(Debug, Deserialize)]
struct JobDetailParams {
    #[serde(rename = "jobId")]
    job_id: String,
}

#[derive(Debug, Deserialize)]
struct RawCompany {
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawTag {
    name: String,
}

/// One job as the search endpoint returns it. Image URLs are accepted but
/// never carried into the output.
#[derive(Debug, Deserialize)]
struct RawJob {
    job_description_id: Number,
    company_id: Number,
    title: String,
    created_at: Number,
    updated_at: Number,
    company: RawCompany,
    work_location_prefecture: Vec<String>,
    position_name: Option<String>,
    tags: Option<Vec<RawTag>>,
    employment_type: Option<String>,
    salary_min: Option<Number>,
    salary_max: Option<Number>,
    salary_type: Option<Number>,
    preferred_condition_names: Option<Vec<String>>,
    business_type_names: Option<Vec<String>>,
    work_style_names: Option<Vec<String>>,
    url: String,
}

#[derive(Debug, Serialize)]
struct CompanyName {
    name: String,
}

#[derive(Debug, Serialize)]
struct JobListing {
    job_description_id: Number,
    company_id: Number,
    title: String,
    created_at: Number,
    updated_at: Number,
    work_location_prefecture: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    position_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    employment_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    salary_min: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    salary_max: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    salary_type: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    preferred_condition_names: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    business_type_names: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    work_style_names: Option<Vec<String>>,
    url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    tags: Option<String>,
    company: CompanyName,
}

impl From<RawJob> for JobListing {
    fn from(job: RawJob) -> Self {
        Self {
            job_description_id: job.job_description_id,
            company_id: job.company_id,
            title: job.title,
            created_at: job.created_at,
            updated_at: job.updated_at,
            work_location_prefecture: job.work_location_prefecture,
            position_name: job.position_name,
            employment_type: job.employment_type,
            salary_min: job.salary_min,
            salary_max: job.salary_max,
            salary_type: job.salary_type,
            preferred_condition_names: job.preferred_condition_names,
            business_type_names: job.business_type_names,
            work_style_names: job.work_style_names,
            url: job.url,
            tags: job.tags.map(|tags| {
                tags.into_iter()
                    .map(|tag| tag.name)
                    .collect::<Vec<_>>()
                    .join(", ")
            }),
            company: CompanyName {
                name: job.company.name,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawSearchResponse {
    #[serde(default)]
    job_descriptions: Value,
    total_count: Number,
    current_page: Number,
    per_page: Number,
    total_pages: Number,
}

#[derive(Debug, Serialize)]
struct SearchResult {
    job_descriptions: Vec<JobListing>,
    total_count: Number,
    current_page: Number,
    per_page: Number,
    total_pages: Number,
}

pub struct JobsManager {
    logger: Logger,
    api: Arc<ProfileApi>,
}

impl JobsManager {
    pub fn new(logger: Logger, api: Arc<ProfileApi>) -> Self {
        Self {
            logger: logger.child("jobs"),
            api,
        }
    }

    async fn search(&self, args: Value) -> Result<ToolResponse, ToolError> {
        let params: SearchJobsParams = parse_args(args)?;
        let url = self.api.endpoint(paths::JOB_SEARCH)?;
        let body = self.api.get_public(url, &params.query_pairs()).await?;
        let raw: RawSearchResponse = serde_json::from_value(body)?;

        // A malformed job list degrades to no results; the paging fields
        // above are still required.
        let jobs: Vec<RawJob> = match serde_json::from_value(raw.job_descriptions) {
            Ok(jobs) => jobs,
            Err(err) => {
                self.logger.warn(
                    "discarding unparseable job list",
                    Some(&serde_json::json!({"error": err.to_string()})),
                );
                Vec::new()
            }
        };

        let result = SearchResult {
            job_descriptions: jobs.into_iter().map(JobListing::from).collect(),
            total_count: raw.total_count,
            current_page: raw.current_page,
            per_page: raw.per_page,
            total_pages: raw.total_pages,
        };
        Ok(ToolResponse::json(&serde_json::to_value(result)?))
    }

    async fn detail(&self, params: JobDetailParams) -> Result<ToolResponse, ToolError> {
        let url = self.api.endpoint_with_id(paths::JOB_DETAIL, &params.job_id)?;
        let body = self.api.get_public(url, &[]).await?;
        Ok(ToolResponse::json(&body))
    }
}

#[async_trait]
impl ToolSet for JobsManager {
    type Tool = JobsTool;

    fn tools() -> &'static [JobsTool] {
        TOOLS
    }

    fn tool_name(tool: JobsTool) -> &'static str {
        match tool {
            JobsTool::Search => "search_jobs",
            JobsTool::Detail => "get_job_detail",
        }
    }

    async fn call(&self, tool: JobsTool, args: Value) -> ToolResponse {
        match tool {
            JobsTool::Search => {
                let result = self.search(args).await;
                respond(&self.logger, "search_jobs", "Failed to search jobs", result)
            }
            JobsTool::Detail => {
                let params: JobDetailParams = match parse_args(args) {
                    Ok(params) => params,
                    Err(err) => return error_response(&err, "Job ID is required"),
                };
                if params.job_id.trim().is_empty() {
                    return error_response("jobId is required", "Job ID is required");
                }
                let result = self.detail(params).await;
                respond(
                    &self.logger,
                    "get_job_detail",
                    "Failed to fetch job detail",
                    result,
                )
            }
        }
    }
}
