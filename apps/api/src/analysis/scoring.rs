//! Match score: a fixed weighting of skill coverage and experience gap.
//!
//! score = round(clamp(skills% × 0.7 + experience × 0.3, 0, 100))
//! where skills% is the share of required skills the candidate matches and
//! experience loses 20 points per year of gap.

use crate::analysis::matcher::JobAnalysis;

const SKILLS_WEIGHT: f64 = 0.7;
const EXPERIENCE_WEIGHT: f64 = 0.3;
const POINTS_PER_GAP_YEAR: f64 = 20.0;

/// Percentage of required skills that appear in `matching_skills`.
/// Zero when the analysis lists no required skills.
pub fn skills_match_percentage(analysis: &JobAnalysis) -> f64 {
    let total_required = analysis.required_skills.len();
    if total_required == 0 {
        return 0.0;
    }

    let matching_required = analysis
        .matching_skills
        .iter()
        .filter(|skill| analysis.required_skills.contains(skill))
        .count();

    matching_required as f64 / total_required as f64 * 100.0
}

/// 100 minus 20 per year of gap, floored at 0.
pub fn experience_score(experience_gap: i32) -> f64 {
    (100.0 - f64::from(experience_gap) * POINTS_PER_GAP_YEAR).max(0.0)
}

/// Final 0–100 match score.
pub fn calculate_match_score(analysis: &JobAnalysis) -> u8 {
    let weighted = skills_match_percentage(analysis) * SKILLS_WEIGHT
        + experience_score(analysis.experience_gap) * EXPERIENCE_WEIGHT;

    weighted.clamp(0.0, 100.0).round() as u8
}
