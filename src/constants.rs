pub mod api {
    pub const DEFAULT_BASE_URL: &str = "https://lapras.com/api/mcp";
    pub const ACCEPT: &str = "application/json, text/plain, */*";
    pub const CONTENT_TYPE_JSON: &str = "application/json";
}

pub mod env {
    pub const API_KEY: &str = "LAPRAS_API_KEY";
    pub const BASE_URL: &str = "LAPRAS_API_BASE_URL";
    pub const LOG_LEVEL: &str = "LOG_LEVEL";
}

pub mod paths {
    pub const JOB_SEARCH: &str = "job_descriptions/search";
    pub const JOB_DETAIL: &str = "job_descriptions";
    pub const EXPERIENCES: &str = "experiences";
    pub const JOB_SUMMARY: &str = "job_summary";
    pub const WANT_TO_DO: &str = "want_to_do";
    pub const TECH_SKILL: &str = "tech_skill";
    pub const TECH_SKILL_MASTER: &str = "tech_skill/master";
}

pub mod links {
    pub const API_KEY_SETTINGS: &str = "https://lapras.com/config/api-key";
}

pub mod limits {
    pub const JOB_SUMMARY_MAX_CHARS: usize = 10_000;
    pub const WANT_TO_DO_MAX_CHARS: usize = 1_000;
    pub const SCHEMA_ERRORS_SHOWN: usize = 10;
}
