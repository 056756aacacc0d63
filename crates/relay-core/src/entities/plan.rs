use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::StepType;
use crate::errors::CoreError;

/// The planner's structured output, carried as JSON in a planner message's content.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Plan {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub thought: String,
    #[serde(default)]
    pub steps: Vec<PlanStep>,
}

/// One step of a plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct PlanStep {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub step_type: StepType,
    #[serde(default)]
    pub tools: Vec<String>,
}

impl Plan {
    /// Parse a planner message's content.
    ///
    /// Accepts bare JSON or JSON wrapped in a Markdown code fence, which some
    /// models emit despite being asked not to.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if the content is empty or not a
    /// complete plan object (e.g. the planner is still streaming).
    pub fn parse(content: &str) -> Result<Self, CoreError> {
        let body = strip_code_fence(content.trim());
        if body.is_empty() {
            return Err(CoreError::Validation("plan content is empty".to_string()));
        }
        serde_json::from_str(body)
            .map_err(|e| CoreError::Validation(format!("plan content is not valid JSON: {e}")))
    }
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string ("json") on the opening fence line.
    let rest = rest.split_once('\n').map_or("", |(_, body)| body);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_json() {
        let plan = Plan::parse(
            r#"{"title":"Sprint health","thought":"Check sprint 5","steps":[
                {"title":"Fetch","description":"Fetch sprints","step_type":"pm_query","tools":["list_sprints"]},
                {"title":"Analyze","description":"Compute burndown","step_type":"processing"}
            ]}"#,
        )
        .unwrap();

        assert_eq!(plan.title, "Sprint health");
        assert_eq!(plan.steps.len(), 2);
        assert_eq!(plan.steps[0].tools, vec!["list_sprints"]);
        assert_eq!(plan.steps[1].step_type, StepType::Processing);
        assert!(plan.steps[1].tools.is_empty());
    }

    #[test]
    fn parses_fenced_json() {
        let plan = Plan::parse("```json\n{\"title\":\"t\",\"steps\":[]}\n```").unwrap();
        assert_eq!(plan.title, "t");
        assert!(plan.steps.is_empty());
    }

    #[test]
    fn ignores_extra_planner_fields() {
        let plan = Plan::parse(
            r#"{"locale":"en-US","has_enough_context":false,"title":"t","steps":[{"need_search":true,"description":"d"}]}"#,
        )
        .unwrap();
        assert_eq!(plan.steps[0].description, "d");
        assert_eq!(plan.steps[0].step_type, StepType::PmQuery);
    }

    #[test]
    fn rejects_partial_stream() {
        let err = Plan::parse(r#"{"title":"Sprint health","steps":[{"desc"#).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn rejects_empty_content() {
        assert!(Plan::parse("   ").is_err());
    }
}
