use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::learning_plan::LearningPlan;
use crate::analysis::matcher::JobAnalysis;

/// Where the candidate is with an application. Any status may follow any other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    #[default]
    Analyzed,
    InProgress,
    Completed,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Analyzed => "analyzed",
            ApplicationStatus::InProgress => "in_progress",
            ApplicationStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "analyzed" => Ok(ApplicationStatus::Analyzed),
            "in_progress" => Ok(ApplicationStatus::InProgress),
            "completed" => Ok(ApplicationStatus::Completed),
            other => Err(format!("unknown application status '{other}'")),
        }
    }
}

/// One user's analysis of one job posting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobApplication {
    pub id: Uuid,
    pub user_id: Uuid,
    pub job_description: String,
    pub job_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    pub match_score: u8,
    pub analysis: JobAnalysis,
    pub learning_plan: LearningPlan,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload produced by the analysis pipeline.
#[derive(Debug, Clone)]
pub struct NewJobApplication {
    pub user_id: Uuid,
    pub job_description: String,
    pub job_title: String,
    pub company_name: Option<String>,
    pub match_score: u8,
    pub analysis: JobAnalysis,
    pub learning_plan: LearningPlan,
}
