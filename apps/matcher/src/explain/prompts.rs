// Prompt constants for match explanations.

pub const MATCH_SUMMARY_SYSTEM: &str = "You are an experienced technical recruiter. \
    Summarize how well a candidate fits a job in plain prose. \
    Base every statement on the data provided. \
    Do NOT invent experience, skills, or employers. \
    Do NOT use markdown, bullet points, or headings.";

/// Match summary prompt. Placeholders are replaced by `render_match_summary_prompt`.
pub const MATCH_SUMMARY_PROMPT_TEMPLATE: &str = r#"Write a 2-3 sentence summary of this job/candidate match for a hiring manager.

JOB
- Title: {job_title}
- Required skills: {required_skills}
- Experience required: {experience_range}

CANDIDATE
- Name: {candidate_name}
- Current role: {current_role}
- Skills: {candidate_skills}
- Years of experience: {candidate_years}

SCORES (0-100)
- Overall: {overall_score}
- Skills: {skills_match_score}
- Experience: {experience_match_score}
- Location: {location_match_score}

Mention the strongest alignment first, then the most important gap, if any."#;
