//! Match Analyzer: asks the LLM to compare a candidate profile with a job description.

use serde::{Deserialize, Serialize};

use crate::analysis::prompts::{ANALYSIS_PROMPT_TEMPLATE, ANALYSIS_ROLE};
use crate::errors::AppError;
use crate::llm_client::prompts::{fill_template, json_system};
use crate::llm_client::LlmClient;
use crate::models::user::{ExperienceLevel, UserProfile};

/// Structured skill-gap analysis returned by the LLM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobAnalysis {
    pub required_skills: Vec<String>,
    pub preferred_skills: Vec<String>,
    pub matching_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    /// Years the candidate is short of the role; negative when over-qualified.
    pub experience_gap: i32,
    pub strength_areas: Vec<String>,
    pub improvement_areas: Vec<String>,
    pub job_level: ExperienceLevel,
}

impl JobAnalysis {
    /// Checks what the type system cannot: every list entry is a real string.
    pub fn validate(&self) -> Result<(), String> {
        let lists = [
            ("requiredSkills", &self.required_skills),
            ("preferredSkills", &self.preferred_skills),
            ("matchingSkills", &self.matching_skills),
            ("missingSkills", &self.missing_skills),
            ("strengthAreas", &self.strength_areas),
            ("improvementAreas", &self.improvement_areas),
        ];

        for (field, items) in lists {
            if let Some(idx) = items.iter().position(|s| s.trim().is_empty()) {
                return Err(format!("{field}[{idx}] is blank"));
            }
        }
        Ok(())
    }
}

/// Runs the match analysis for one profile and job description.
///
/// Provider errors, unparseable JSON and schema violations all surface as
/// `AppError::Analysis`. Nothing is retried.
pub async fn analyze_match(
    profile: &UserProfile,
    job_description: &str,
    llm: &LlmClient,
) -> Result<JobAnalysis, AppError> {
    let prompt = build_analysis_prompt(profile, job_description)?;
    let analysis: JobAnalysis = llm
        .call_json(&prompt, &json_system(ANALYSIS_ROLE))
        .await
        .map_err(|e| AppError::Analysis(format!("LLM call failed: {e}")))?;

    analysis
        .validate()
        .map_err(|e| AppError::Analysis(format!("LLM returned an invalid analysis: {e}")))?;

    Ok(analysis)
}

fn build_analysis_prompt(profile: &UserProfile, job_description: &str) -> Result<String, AppError> {
    let skills = to_prompt_json(&profile.skills)?;
    let work_experience = to_prompt_json(&profile.work_experience)?;
    let education = to_prompt_json(&profile.education)?;

    Ok(fill_template(
        ANALYSIS_PROMPT_TEMPLATE,
        &[
            ("first_name", &profile.first_name),
            ("last_name", &profile.last_name),
            ("experience", profile.experience.as_str()),
            ("skills", &skills),
            ("work_experience", &work_experience),
            ("education", &education),
            ("job_description", job_description),
        ],
    ))
}

fn to_prompt_json<T: Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string(value)
        .map_err(|e| AppError::Analysis(format!("Failed to serialize profile: {e}")))
}
