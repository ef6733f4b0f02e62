// LLM prompt constants for job analysis and learning-plan generation.
// Templates use `{placeholder}` markers filled by `fill_template` before sending.

/// Role description for the match analysis call.
pub const ANALYSIS_ROLE: &str = "You are an expert technical recruiter and career coach. \
    You compare a candidate profile against a job description and report the skill match precisely.";

/// Match analysis prompt.
/// Replace: {first_name}, {last_name}, {experience}, {skills}, {work_experience},
///          {education}, {job_description}
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"Analyze the job match between the user profile and job description.

User Profile:
Name: {first_name} {last_name}
Experience Level: {experience}
Skills: {skills}
Work Experience: {work_experience}
Education: {education}

Job Description:
{job_description}

Return a JSON object with this EXACT schema (no extra fields):
{
  "requiredSkills": ["skill1", "skill2"],
  "preferredSkills": ["skill1", "skill2"],
  "matchingSkills": ["skill1", "skill2"],
  "missingSkills": ["skill1", "skill2"],
  "experienceGap": 0,
  "strengthAreas": ["area1", "area2"],
  "improvementAreas": ["area1", "area2"],
  "jobLevel": "mid"
}

Rules:
- "matchingSkills" lists required or preferred skills the candidate already has, spelled exactly as in "requiredSkills" / "preferredSkills".
- "missingSkills" lists required or preferred skills the candidate lacks.
- "experienceGap" is a whole number of years the candidate is short of the role (0 if none).
- "jobLevel" is one of: "entry", "junior", "mid", "senior", "lead", "principal"."#;

/// Role description for the learning plan call.
pub const LEARNING_PLAN_ROLE: &str = "You are an experienced engineering mentor who designs \
    practical, project-driven learning plans.";

/// Learning plan prompt.
/// Replace: {experience}, {missing_skills}, {improvement_areas}, {current_skills}
pub const LEARNING_PLAN_PROMPT_TEMPLATE: &str = r#"Create a personalized learning plan for the user to improve their job match.

User Experience Level: {experience}
Missing Skills: {missing_skills}
Improvement Areas: {improvement_areas}
Current Skills: {current_skills}

Return a JSON object with this EXACT schema (no extra fields):
{
  "timeframe": "3-6 months",
  "phases": [
    {
      "name": "Foundation Phase",
      "description": "Build core skills",
      "estimatedHours": 40,
      "resources": [
        {
          "type": "video",
          "title": "Resource Title",
          "url": "https://youtube.com/example",
          "description": "Description",
          "estimatedHours": 10,
          "difficulty": "beginner",
          "provider": "YouTube",
          "isFree": true
        }
      ],
      "projects": [
        {
          "name": "Project Name",
          "description": "Project description",
          "technologies": ["tech1", "tech2"],
          "estimatedHours": 20,
          "difficulty": "beginner",
          "keyFeatures": ["feature1", "feature2"]
        }
      ],
      "milestones": ["milestone1", "milestone2"]
    }
  ],
  "totalEstimatedHours": 120,
  "priorityOrder": ["skill1", "skill2", "skill3"]
}

Resource "type" is one of: "video", "course", "tutorial", "documentation", "book", "practice".
"difficulty" is one of: "beginner", "intermediate", "advanced".

Focus on practical, hands-on learning with real projects. Include resources from:
- YouTube tutorials
- freeCodeCamp
- Coursera/edX free courses
- Official documentation
- GitHub repositories

Make sure projects are portfolio-worthy and relevant to the target job."#;
