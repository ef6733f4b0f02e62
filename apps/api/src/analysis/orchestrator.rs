//! Job analysis pipeline.
//!
//! Flow: load profile → match analysis → score → learning plan → persist.
//! Every step depends on the previous one; any failure aborts before the write.

use tracing::info;
use uuid::Uuid;

use crate::analysis::learning_plan::generate_learning_plan;
use crate::analysis::matcher::analyze_match;
use crate::analysis::scoring::calculate_match_score;
use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::models::application::{JobApplication, NewJobApplication};
use crate::store::{load_profile, ApplicationStore, UserStore};

#[derive(Debug, Clone)]
pub struct AnalyzeJobInput {
    pub user_id: Uuid,
    pub job_description: String,
    pub job_title: String,
    pub company_name: Option<String>,
}

/// Runs the full analysis for one job posting and stores the result.
///
/// Steps:
/// 1. load the caller's profile (`NotFound` if the user is gone)
/// 2. analyze_match() → JobAnalysis
/// 3. calculate_match_score() → 0..=100
/// 4. generate_learning_plan() → LearningPlan
/// 5. INSERT the application with status `analyzed`
pub async fn analyze_job(
    users: &dyn UserStore,
    applications: &dyn ApplicationStore,
    llm: &LlmClient,
    input: AnalyzeJobInput,
) -> Result<JobApplication, AppError> {
    // Step 1: Load profile
    let profile = load_profile(users, input.user_id).await?;

    // Step 2: Match analysis
    info!("Analyzing job '{}' for user {} (model: {})", input.job_title, input.user_id, llm.model());
    let analysis = analyze_match(&profile, &input.job_description, llm).await?;
    info!(
        "Analysis complete: {} required, {} matching, {} missing",
        analysis.required_skills.len(),
        analysis.matching_skills.len(),
        analysis.missing_skills.len()
    );

    // Step 3: Score
    let match_score = calculate_match_score(&analysis);
    info!("Match score: {match_score}/100 for user {}", input.user_id);

    // Step 4: Learning plan
    let learning_plan = generate_learning_plan(&analysis, &profile, llm).await?;
    info!(
        "Learning plan generated: {} phases over {}",
        learning_plan.phases.len(),
        learning_plan.timeframe
    );

    // Step 5: Persist
    let application = applications
        .create(NewJobApplication {
            user_id: input.user_id,
            job_description: input.job_description,
            job_title: input.job_title,
            company_name: input.company_name,
            match_score,
            analysis,
            learning_plan,
        })
        .await?;

    info!("Stored job application {}", application.id);
    Ok(application)
}
