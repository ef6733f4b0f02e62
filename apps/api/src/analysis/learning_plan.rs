//! Learning Plan Generator: turns a skill-gap analysis into a phased study plan.

use serde::{Deserialize, Serialize};

use crate::analysis::matcher::JobAnalysis;
use crate::analysis::prompts::{LEARNING_PLAN_PROMPT_TEMPLATE, LEARNING_PLAN_ROLE};
use crate::errors::AppError;
use crate::llm_client::prompts::{fill_template, json_system};
use crate::llm_client::LlmClient;
use crate::models::user::UserProfile;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Video,
    Course,
    Tutorial,
    Documentation,
    Book,
    Practice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyLevel {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningResource {
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub title: String,
    pub url: String,
    pub description: String,
    pub estimated_hours: f64,
    pub difficulty: DifficultyLevel,
    pub provider: String,
    #[serde(default = "default_is_free")]
    pub is_free: bool,
}

fn default_is_free() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSuggestion {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub technologies: Vec<String>,
    pub estimated_hours: f64,
    pub difficulty: DifficultyLevel,
    #[serde(default)]
    pub key_features: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_template: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningPhase {
    pub name: String,
    pub description: String,
    pub estimated_hours: f64,
    #[serde(default)]
    pub resources: Vec<LearningResource>,
    #[serde(default)]
    pub projects: Vec<ProjectSuggestion>,
    #[serde(default)]
    pub milestones: Vec<String>,
}

/// Ordered study plan attached to every job application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningPlan {
    pub timeframe: String,
    pub phases: Vec<LearningPhase>,
    pub total_estimated_hours: f64,
    #[serde(default)]
    pub priority_order: Vec<String>,
}

impl LearningPlan {
    /// Structural checks serde cannot express.
    pub fn validate(&self) -> Result<(), String> {
        if self.timeframe.trim().is_empty() {
            return Err("timeframe is blank".to_string());
        }
        if self.phases.is_empty() {
            return Err("plan has no phases".to_string());
        }
        check_hours("totalEstimatedHours", self.total_estimated_hours)?;

        for (i, phase) in self.phases.iter().enumerate() {
            if phase.name.trim().is_empty() {
                return Err(format!("phases[{i}].name is blank"));
            }
            check_hours(&format!("phases[{i}].estimatedHours"), phase.estimated_hours)?;

            for (j, resource) in phase.resources.iter().enumerate() {
                if resource.title.trim().is_empty() {
                    return Err(format!("phases[{i}].resources[{j}].title is blank"));
                }
                check_hours(
                    &format!("phases[{i}].resources[{j}].estimatedHours"),
                    resource.estimated_hours,
                )?;
            }
            for (j, project) in phase.projects.iter().enumerate() {
                if project.name.trim().is_empty() {
                    return Err(format!("phases[{i}].projects[{j}].name is blank"));
                }
                check_hours(
                    &format!("phases[{i}].projects[{j}].estimatedHours"),
                    project.estimated_hours,
                )?;
            }
        }
        Ok(())
    }
}

fn check_hours(field: &str, hours: f64) -> Result<(), String> {
    if hours.is_finite() && hours >= 0.0 {
        Ok(())
    } else {
        Err(format!("{field} must be a non-negative number, got {hours}"))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Generation
// ────────────────────────────────────────────────────────────────────────────

/// Asks the LLM for a learning plan covering the analysis's gaps.
///
/// Any failure (provider, parse or validation) becomes `AppError::LearningPlan`.
pub async fn generate_learning_plan(
    analysis: &JobAnalysis,
    profile: &UserProfile,
    llm: &LlmClient,
) -> Result<LearningPlan, AppError> {
    let prompt = build_learning_plan_prompt(analysis, profile);
    let plan: LearningPlan = llm
        .call_json(&prompt, &json_system(LEARNING_PLAN_ROLE))
        .await
        .map_err(|e| AppError::LearningPlan(format!("LLM call failed: {e}")))?;

    plan.validate()
        .map_err(|e| AppError::LearningPlan(format!("LLM returned an invalid plan: {e}")))?;

    Ok(plan)
}

fn build_learning_plan_prompt(analysis: &JobAnalysis, profile: &UserProfile) -> String {
    let current_skills = profile
        .skills
        .iter()
        .map(|s| s.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    fill_template(
        LEARNING_PLAN_PROMPT_TEMPLATE,
        &[
            ("experience", profile.experience.as_str()),
            ("missing_skills", &analysis.missing_skills.join(", ")),
            ("improvement_areas", &analysis.improvement_areas.join(", ")),
            ("current_skills", &current_skills),
        ],
    )
}
