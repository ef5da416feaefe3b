// All LLM prompt constants for the interview module.

/// System prompt for question generation — enforces JSON-only output.
pub const QUESTION_SYSTEM: &str = "You are an experienced interviewer running a mock interview. \
    Ask questions a real interviewer for this specific role would ask this \
    specific candidate. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Question generation prompt template.
/// Replace: {question_type}, {question_number}, {job_posting}, {resume},
///          {transcript}
pub const QUESTION_PROMPT_TEMPLATE: &str = r#"Generate interview question #{question_number} for this mock interview.

QUESTION TYPE for this turn: {question_type}
- "technical": probe a skill or technology the job requires, anchored in what the resume claims
- "behavioral": past-experience question ("Tell me about a time..."), anchored in the resume
- "situational": hypothetical scenario drawn from the job's responsibilities

JOB POSTING:
{job_posting}

CANDIDATE RESUME:
{resume}

INTERVIEW SO FAR (do not repeat covered ground):
{transcript}

Return a JSON object with this EXACT schema:
{
  "question": "The full question text, addressed directly to the candidate."
}

HARD RULES:
1. Ask exactly ONE question
2. The question must match the QUESTION TYPE for this turn
3. Ground the question in BOTH the job posting and the resume where possible
4. Do not re-ask anything already covered in the transcript"#;

/// System prompt for feedback analysis — enforces JSON-only output.
pub const FEEDBACK_SYSTEM: &str = "You are an expert interview coach scoring a completed mock \
    interview. Be specific and reference the candidate's actual answers. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Feedback analysis prompt template.
/// Replace: {job_posting}, {resume}, {transcript}
pub const FEEDBACK_PROMPT_TEMPLATE: &str = r#"Score the following completed mock interview.

JOB POSTING:
{job_posting}

CANDIDATE RESUME:
{resume}

FULL INTERVIEW TRANSCRIPT:
{transcript}

Return a JSON object with this EXACT schema (all scores are integers 0-100):
{
  "technical_score": 75,
  "communication_score": 80,
  "problem_solving_score": 70,
  "structure_score": 65,
  "overall_score": 72,
  "technical_feedback": "Assessment of technical depth and correctness.",
  "communication_feedback": "Assessment of clarity and articulation.",
  "problem_solving_feedback": "Assessment of reasoning and approach.",
  "structure_feedback": "Assessment of answer organization (e.g. STAR usage).",
  "overall_comments": "Overall summary and the most important next step.",
  "knowledge_gaps": ["specific topic the candidate was weak on"],
  "learning_recommendations": ["concrete resource or exercise to close a gap"]
}

HARD RULES:
1. Every score must be an integer between 0 and 100
2. Ground every piece of feedback in specific answers from the transcript
3. knowledge_gaps and learning_recommendations must be arrays of strings
4. overall_score must reflect the dimension scores, not contradict them"#;
