//! Pain point extraction.

use minutes_core::{GenerationBackend, PainPoints, Result};

use crate::driver::{run_json_extractor, ExtractionOutcome};

const SYSTEM_PROMPT: &str = "You are an expert at identifying pain points, challenges, and \
problems mentioned in meeting conversations.

Your task is to identify:
1. Project-specific pain points (challenges related to specific projects or initiatives)
2. General pain points (organizational, process, or team-level issues)
3. Pain point details: description, affected project/area, severity, impact

The transcript may contain Hinglish (Hindi-English mix) or other multilingual content. \
Understand phrases that indicate problems, frustrations, or challenges.

Return a JSON object with the following structure:
{
  \"project_specific\": [
    {
      \"project\": \"Project name (if mentioned)\",
      \"pain_point\": \"Description of the pain point\",
      \"severity\": \"high|medium|low\",
      \"impact\": \"Description of impact\"
    }
  ],
  \"general\": [
    {
      \"pain_point\": \"Description of the pain point\",
      \"category\": \"process|tool|team|resource|other\",
      \"severity\": \"high|medium|low\",
      \"impact\": \"Description of impact\"
    }
  ]
}";

fn build_prompt(transcript: &str) -> String {
    format!(
        "Analyze the following meeting transcript and identify all pain points, challenges, \
         and problems mentioned.\n\
         \n\
         Look for:\n\
         - Project-specific challenges or blockers\n\
         - General organizational or process issues\n\
         - Frustrations or concerns expressed\n\
         - Problems that need to be addressed\n\
         - Areas of difficulty or struggle\n\
         \n\
         Be thorough in identifying pain points, even if they're mentioned briefly or \
         indirectly.\n\
         \n\
         Transcript:\n{}\n\
         \n\
         Return a JSON object with pain points analysis.",
        transcript
    )
}

fn parse(raw: &str) -> Result<PainPoints> {
    let points: PainPoints = serde_json::from_str(raw)?;
    Ok(points)
}

/// Extract pain points. Degrades to the empty structure.
pub async fn extract(
    backend: &dyn GenerationBackend,
    transcript: &str,
) -> ExtractionOutcome<PainPoints> {
    let prompt = build_prompt(transcript);
    run_json_extractor(backend, "pain_points", SYSTEM_PROMPT, &prompt, &parse).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_both_sections() {
        let raw = r#"{
            "project_specific": [
                {"project": "Portal", "pain_point": "flaky deploys", "severity": "high", "impact": "slow releases"}
            ],
            "general": [
                {"pain_point": "too many meetings", "category": "process"}
            ]
        }"#;
        let points = parse(raw).unwrap();
        assert_eq!(points.project_specific.len(), 1);
        assert_eq!(points.project_specific[0].severity, "high");
        assert_eq!(points.general[0].category, "process");
        assert_eq!(points.general[0].severity, "medium");
    }

    #[test]
    fn test_parse_empty_object() {
        let points = parse("{}").unwrap();
        assert!(points.project_specific.is_empty());
        assert!(points.general.is_empty());
    }
}
