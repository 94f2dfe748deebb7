use crate::constants::limits::SCHEMA_ERRORS_SHOWN;
use crate::errors::ToolError;
use crate::utils::suggest::suggest;
use jsonschema::error::{TypeKind, ValidationErrorKind};
use jsonschema::JSONSchema;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDef {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

static TOOL_CATALOG: Lazy<Vec<ToolDef>> = Lazy::new(|| {
    let raw = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/tool_catalog.json"));
    serde_json::from_str(raw).expect("tool_catalog.json must be valid JSON")
});

static TOOL_MAP: Lazy<HashMap<String, ToolDef>> = Lazy::new(|| {
    TOOL_CATALOG
        .iter()
        .cloned()
        .map(|tool| (tool.name.clone(), tool))
        .collect()
});

static TOOL_VALIDATORS: Lazy<HashMap<String, JSONSchema>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for tool in TOOL_CATALOG.iter() {
        if let Ok(schema) = JSONSchema::compile(&tool.input_schema) {
            map.insert(tool.name.clone(), schema);
        }
    }
    map
});

pub fn tool_catalog() -> &'static Vec<ToolDef> {
    &TOOL_CATALOG
}

pub fn tool_by_name(name: &str) -> Option<&'static ToolDef> {
    TOOL_MAP.get(name)
}

pub fn tool_names() -> Vec<String> {
    TOOL_CATALOG.iter().map(|tool| tool.name.clone()).collect()
}

/// Names of catalog tools whose input schema does not compile.
pub fn invalid_schemas() -> Vec<String> {
    TOOL_CATALOG
        .iter()
        .filter(|tool| !TOOL_VALIDATORS.contains_key(&tool.name))
        .map(|tool| tool.name.clone())
        .collect()
}

pub fn validate_tool_args(tool_name: &str, args: &Value) -> Result<(), ToolError> {
    let (Some(tool), Some(schema)) = (tool_by_name(tool_name), TOOL_VALIDATORS.get(tool_name))
    else {
        return Ok(());
    };
    if let Err(errors) = schema.validate(args) {
        return Err(ToolError::invalid_params(format_schema_errors(
            errors,
            &tool.input_schema,
        )));
    }
    Ok(())
}

fn format_schema_errors(errors: jsonschema::ErrorIterator, schema: &Value) -> String {
    let mut rendered = Vec::new();
    let mut did_you_means = Vec::new();

    for err in errors.take(SCHEMA_ERRORS_SHOWN) {
        let instance_path = if err.instance_path.to_string().is_empty() {
            "(root)".to_string()
        } else {
            err.instance_path.to_string()
        };
        match &err.kind {
            ValidationErrorKind::AdditionalProperties { unexpected } => {
                let known: Vec<String> = schema_at(schema, &err.schema_path.to_string())
                    .and_then(|parent| parent.get("properties"))
                    .and_then(|props| props.as_object())
                    .map(|props| props.keys().cloned().collect())
                    .unwrap_or_default();
                for unknown in unexpected {
                    rendered.push(format!("{}: unknown field '{}'", instance_path, unknown));
                    let suggestions = suggest(unknown, &known, 3);
                    if !suggestions.is_empty() {
                        did_you_means.push(format!("'{}' -> {}", unknown, suggestions.join(", ")));
                    }
                }
            }
            ValidationErrorKind::Required { property } => {
                let prop = property
                    .as_str()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| property.to_string());
                rendered.push(format!("{}: missing required field '{}'", instance_path, prop));
            }
            ValidationErrorKind::Type { kind } => {
                rendered.push(format!("{}: expected {}", instance_path, format_type_kind(kind)));
            }
            _ => {
                rendered.push(format!("{}: {}", instance_path, err));
            }
        }
    }

    let mut lines: Vec<String> = rendered.iter().map(|line| format!("- {}", line)).collect();
    if !did_you_means.is_empty() {
        lines.push(format!("Did you mean: {}", did_you_means.join(" | ")));
    }
    lines.join("\n")
}

fn format_type_kind(kind: &TypeKind) -> String {
    match kind {
        TypeKind::Single(primitive) => primitive.to_string(),
        TypeKind::Multiple(types) => {
            let list: Vec<String> = (*types).into_iter().map(|t| t.to_string()).collect();
            if list.is_empty() {
                "unknown".to_string()
            } else {
                list.join(" | ")
            }
        }
    }
}

/// Schema node that owns the keyword at `schema_path` (the path minus its
/// last segment).
fn schema_at<'a>(schema: &'a Value, schema_path: &str) -> Option<&'a Value> {
    let segments: Vec<&str> = schema_path.split('/').filter(|s| !s.is_empty()).collect();
    let parent = segments.split_last().map(|(_, rest)| rest).unwrap_or(&[]);
    let mut current = schema;
    for segment in parent {
        current = match current {
            Value::Object(obj) => obj.get(*segment)?,
            Value::Array(arr) => arr.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;

    #[test]
    fn catalog_names_are_unique_and_schemas_compile() {
        let names = tool_names();
        let unique: HashSet<&String> = names.iter().collect();
        assert_eq!(unique.len(), names.len());
        assert!(invalid_schemas().is_empty(), "{:?}", invalid_schemas());
    }

    #[test]
    fn missing_required_field_is_reported() {
        let err = validate_tool_args("delete_experience", &json!({})).expect_err("invalid");
        assert!(err
            .to_string()
            .contains("(root): missing required field 'experience_id'"));
    }

    #[test]
    fn unknown_field_gets_a_suggestion() {
        let err = validate_tool_args("get_job_detail", &json!({"jobId": "1", "jobid": "1"}))
            .expect_err("invalid");
        let text = err.to_string();
        assert!(text.contains("unknown field 'jobid'"), "{}", text);
        assert!(text.contains("Did you mean: 'jobid' -> jobId"), "{}", text);
    }

    #[test]
    fn wrong_type_names_expected_type() {
        let err = validate_tool_args("search_jobs", &json!({"page": "two"})).expect_err("invalid");
        assert!(err.to_string().contains("/page: expected number"));
    }

    #[test]
    fn tech_skill_years_must_be_non_negative() {
        let args = json!({"tech_skill_list": [{"name": "Rust", "years": -1}]});
        assert!(validate_tool_args("update_tech_skill", &args).is_err());
        let args = json!({"tech_skill_list": []});
        assert!(validate_tool_args("update_tech_skill", &args).is_err());
    }

    #[test]
    fn length_limits_are_enforced() {
        let long = "a".repeat(1001);
        assert!(validate_tool_args("update_want_to_do", &json!({"want_to_do": long})).is_err());
        assert!(validate_tool_args("update_job_summary", &json!({"job_summary": long})).is_ok());
    }

    #[test]
    fn bulk_items_may_carry_an_id() {
        let args = json!({
            "experience_list": [{
                "id": 12,
                "organization_name": "A",
                "positions": [{"id": 1}],
                "is_client_work": false,
                "start_year": 2020,
                "start_month": 1,
                "end_year": 0,
                "end_month": 0
            }]
        });
        assert!(validate_tool_args("bulk_update_experiences", &args).is_ok());
    }
}
