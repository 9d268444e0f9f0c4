//! External idea and scope extraction.

use serde_json::Value;

use minutes_core::{Error, ExternalIdea, GenerationBackend, Result};

use crate::driver::{run_json_extractor, ExtractionOutcome};

const SYSTEM_PROMPT: &str = "You are an expert at identifying external ideas, opportunities, \
and scope for new projects or initiatives from meeting conversations.

Your task is to identify:
1. External ideas or projects that can be built based on discussions
2. Additional scope or opportunities mentioned that are separate from the main project
3. Ideas for new initiatives, features, or products discussed
4. Opportunities that emerged from side conversations or tangential discussions
5. Potential projects that could be created based on the meeting content

IMPORTANT: Focus on EXTERNAL ideas - things that are ADDITIONAL to the main project being \
discussed. These should be:
- New initiatives or projects that could be built
- Additional features or products mentioned
- Opportunities for expansion or new work
- Ideas that emerged from discussions but aren't part of the main project

The transcript may contain Hinglish (Hindi-English mix) or other multilingual content. \
Understand and process it correctly.

Return a JSON object with an \"ideas\" key containing an array with the following structure:
{
  \"ideas\": [
    {
      \"idea\": \"Name or title of the idea/project\",
      \"description\": \"Detailed description of what could be built\",
      \"scope\": \"The scope and potential of this idea\",
      \"feasibility\": \"high|medium|low\",
      \"potential_value\": \"Why this idea is valuable or what problem it solves\",
      \"suggested_by\": \"Person who suggested it (if mentioned)\",
      \"related_to\": \"How it relates to the main discussion (if applicable)\"
    }
  ]
}

If no external ideas or scope are identified, return {\"ideas\": []}.";

fn build_prompt(transcript: &str) -> String {
    format!(
        "Analyze the following meeting transcript and identify EXTERNAL ideas, \
         opportunities, and scope for new projects or initiatives that can be built.\n\
         \n\
         Focus on:\n\
         - Ideas for NEW projects or initiatives (separate from the main project)\n\
         - Additional scope or opportunities mentioned\n\
         - Features or products that could be created\n\
         - Opportunities that emerged from discussions\n\
         - Side conversations that suggest new work\n\
         \n\
         IMPORTANT: Only extract EXTERNAL ideas - things that are ADDITIONAL to the main \
         project. These should be opportunities for NEW work, not part of the current \
         project scope.\n\
         \n\
         Look for:\n\
         - \"We could also build...\"\n\
         - \"What if we created...\"\n\
         - \"Another idea would be...\"\n\
         - Side discussions about new features or products\n\
         - Opportunities for expansion\n\
         - Ideas that go beyond the main project scope\n\
         \n\
         Transcript:\n{}\n\
         \n\
         Return a JSON object with an \"ideas\" key containing an array of external \
         ideas/scope. If no external ideas are found, return {{\"ideas\": []}}.",
        transcript
    )
}

fn parse(raw: &str) -> Result<Vec<ExternalIdea>> {
    let value: Value = serde_json::from_str(raw)?;

    let entries = match value {
        Value::Array(items) => Value::Array(items),
        Value::Object(ref obj) => {
            let nested = ["ideas", "scope", "external_ideas", "data"]
                .iter()
                .find_map(|key| obj.get(*key))
                .cloned();
            match nested {
                Some(inner @ Value::Array(_)) => inner,
                Some(_) | None => {
                    return Err(Error::Serialization(
                        "response has no recognizable ideas payload".to_string(),
                    ))
                }
            }
        }
        _ => {
            return Err(Error::Serialization(
                "expected a JSON object with an ideas array".to_string(),
            ))
        }
    };

    let ideas: Vec<ExternalIdea> = serde_json::from_value(entries)?;
    Ok(ideas)
}

/// Extract external ideas. Degrades to an empty list.
pub async fn extract(
    backend: &dyn GenerationBackend,
    transcript: &str,
) -> ExtractionOutcome<Vec<ExternalIdea>> {
    let prompt = build_prompt(transcript);
    run_json_extractor(backend, "external_ideas", SYSTEM_PROMPT, &prompt, &parse).await
}
