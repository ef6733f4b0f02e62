use std::borrow::Cow;
use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    Entry,
    Junior,
    Mid,
    Senior,
    Lead,
    Principal,
}

impl ExperienceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceLevel::Entry => "entry",
            ExperienceLevel::Junior => "junior",
            ExperienceLevel::Mid => "mid",
            ExperienceLevel::Senior => "senior",
            ExperienceLevel::Lead => "lead",
            ExperienceLevel::Principal => "principal",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillCategory {
    Programming,
    Framework,
    Database,
    Cloud,
    Devops,
    Design,
    SoftSkills,
    Tools,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProficiencyLevel {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkType {
    Remote,
    Hybrid,
    Onsite,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    #[validate(custom(function = "not_blank", message = "skill name is required"))]
    pub name: String,
    pub category: SkillCategory,
    pub proficiency: ProficiencyLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, message = "yearsOfExperience must be >= 0"))]
    pub years_of_experience: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    #[validate(length(min = 1))]
    pub institution: String,
    #[validate(length(min = 1))]
    pub degree: String,
    #[validate(length(min = 1))]
    pub field: String,
    pub graduation_year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, max = 4.0, message = "gpa must be between 0 and 4"))]
    pub gpa: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct WorkExperience {
    #[validate(length(min = 1))]
    pub company: String,
    #[validate(length(min = 1))]
    pub position: String,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[validate(length(min = 1))]
    pub description: String,
    #[serde(default)]
    pub technologies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub description: String,
    pub technologies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(url)]
    pub github_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(url)]
    pub live_url: Option<String>,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Certification {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub issuer: String,
    pub issue_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "USD".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPreferences {
    #[serde(default)]
    pub desired_roles: Vec<String>,
    #[serde(default)]
    pub industries: Vec<String>,
    #[serde(default)]
    pub work_type: Vec<WorkType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary_range: Option<SalaryRange>,
    #[serde(default)]
    pub locations: Vec<String>,
}

/// Everything the analysis prompts know about a candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "profile_skills_unique"))]
pub struct UserProfile {
    #[validate(custom(function = "not_blank", message = "firstName is required"))]
    pub first_name: String,
    #[validate(custom(function = "not_blank", message = "lastName is required"))]
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub experience: ExperienceLevel,
    #[validate(nested)]
    pub skills: Vec<Skill>,
    #[serde(default)]
    #[validate(nested)]
    pub education: Vec<Education>,
    #[serde(default)]
    #[validate(nested)]
    pub work_experience: Vec<WorkExperience>,
    #[serde(default)]
    #[validate(nested)]
    pub projects: Vec<Project>,
    #[serde(default)]
    #[validate(nested)]
    pub certifications: Vec<Certification>,
    #[serde(default)]
    pub preferences: JobPreferences,
}

impl UserProfile {
    /// Replaces every field present in `update`; absent fields are kept.
    pub fn apply_update(&mut self, update: ProfileUpdate) {
        let ProfileUpdate {
            first_name,
            last_name,
            title,
            experience,
            skills,
            education,
            work_experience,
            projects,
            certifications,
            preferences,
        } = update;

        if let Some(v) = first_name {
            self.first_name = v;
        }
        if let Some(v) = last_name {
            self.last_name = v;
        }
        if let Some(v) = title {
            self.title = Some(v);
        }
        if let Some(v) = experience {
            self.experience = v;
        }
        if let Some(v) = skills {
            self.skills = v;
        }
        if let Some(v) = education {
            self.education = v;
        }
        if let Some(v) = work_experience {
            self.work_experience = v;
        }
        if let Some(v) = projects {
            self.projects = v;
        }
        if let Some(v) = certifications {
            self.certifications = v;
        }
        if let Some(v) = preferences {
            self.preferences = v;
        }
    }

    /// Inserts `skill`, replacing any existing skill with the same name.
    pub fn upsert_skill(&mut self, skill: Skill) {
        self.skills.retain(|s| s.name != skill.name);
        self.skills.push(skill);
    }

    /// Removes skills named `name`. Unknown names leave the list untouched.
    pub fn remove_skill(&mut self, name: &str) {
        self.skills.retain(|s| s.name != name);
    }
}

/// Partial profile update. Serializes only the fields that are present, so it
/// can be merged into the stored profile document as-is.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "update_skills_unique"))]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "not_blank", message = "firstName is required"))]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "not_blank", message = "lastName is required"))]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience: Option<ExperienceLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub skills: Option<Vec<Skill>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub education: Option<Vec<Education>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub work_experience: Option<Vec<WorkExperience>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub projects: Option<Vec<Project>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub certifications: Option<Vec<Certification>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<JobPreferences>,
}

/// Rejects empty and whitespace-only strings.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// A profile holds at most one skill per name.
fn unique_skill_names(skills: &[Skill]) -> Result<(), ValidationError> {
    let mut seen = HashSet::with_capacity(skills.len());
    for skill in skills {
        if !seen.insert(skill.name.as_str()) {
            return Err(ValidationError::new("duplicate_skill")
                .with_message(Cow::Owned(format!("duplicate skill name '{}'", skill.name))));
        }
    }
    Ok(())
}

fn profile_skills_unique(profile: &UserProfile) -> Result<(), ValidationError> {
    unique_skill_names(&profile.skills)
}

fn update_skills_unique(update: &ProfileUpdate) -> Result<(), ValidationError> {
    match &update.skills {
        Some(skills) => unique_skill_names(skills),
        None => Ok(()),
    }
}

/// A stored user, including the password hash.
///
/// Never serialize this to a client; convert with [`User::into_public`].
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub profile: UserProfile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn into_public(self) -> PublicUser {
        PublicUser {
            id: self.id,
            email: self.email,
            profile: self.profile,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// The only user representation that leaves the server. It has no field that
/// could carry the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub profile: UserProfile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a new user. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub profile: UserProfile,
}
