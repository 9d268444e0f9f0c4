//! Project health signal extraction.

use minutes_core::{Error, GenerationBackend, HealthSignals, Result};

use crate::driver::{run_json_extractor, ExtractionOutcome};

const SYSTEM_PROMPT: &str = "You are an expert at identifying project health signals from \
meeting conversations.

Your task is to identify:
1. Project owners and assignees
2. Blockers and impediments
3. Risks and concerns
4. Commitment signals (including non-committal responses like \"haan yaar, dekh lenge\" \
which might indicate potential blockers)

The transcript may contain Hinglish (Hindi-English mix) or other multilingual content. Pay \
special attention to:
- Non-committal responses (\"we'll see\", \"dekhenge\", \"maybe\")
- Hesitation or uncertainty
- Explicit blockers mentioned
- Risk indicators

Return a JSON object with the following structure:
{
  \"owners\": [\"Person 1\", \"Person 2\"],
  \"blockers\": [
    {
      \"description\": \"Blocker description\",
      \"project\": \"Project name (if applicable)\",
      \"severity\": \"high|medium|low\"
    }
  ],
  \"risks\": [
    {
      \"description\": \"Risk description\",
      \"project\": \"Project name (if applicable)\",
      \"severity\": \"high|medium|low\"
    }
  ],
  \"commitment_signals\": [
    {
      \"text\": \"The actual phrase or statement\",
      \"interpretation\": \"What it likely means\",
      \"project\": \"Project name (if applicable)\"
    }
  ]
}";

fn build_prompt(transcript: &str) -> String {
    format!(
        "Analyze the following meeting transcript and extract project health signals.\n\
         \n\
         Look for:\n\
         - People assigned to projects or tasks (owners)\n\
         - Blockers and impediments mentioned\n\
         - Risks and concerns raised\n\
         - Non-committal or hesitant responses (like \"haan yaar, dekh lenge\", \
         \"we'll see\", \"maybe\")\n\
         \n\
         Pay special attention to phrases that might indicate lack of commitment or \
         potential blockers disguised as optimism.\n\
         \n\
         Transcript:\n{}\n\
         \n\
         Return a JSON object with health signals.",
        transcript
    )
}

fn parse(raw: &str) -> Result<HealthSignals> {
    // Serde would also accept the sequence form; only the object shape
    // is a valid model response here.
    let value: serde_json::Value = serde_json::from_str(raw)?;
    if !value.is_object() {
        return Err(Error::Serialization(
            "Expected a JSON object of health signals".to_string(),
        ));
    }
    let signals: HealthSignals = serde_json::from_value(value)?;
    Ok(signals)
}

/// Extract health signals. Degrades to the empty structure.
pub async fn extract(
    backend: &dyn GenerationBackend,
    transcript: &str,
) -> ExtractionOutcome<HealthSignals> {
    let prompt = build_prompt(transcript);
    run_json_extractor(backend, "health", SYSTEM_PROMPT, &prompt, &parse).await
}
