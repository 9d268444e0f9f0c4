//! Main project name extraction.

use minutes_core::{GenerationBackend, Result};

use crate::driver::{run_text_extractor, ExtractionOutcome};

const SYSTEM_PROMPT: &str = "You are an expert at identifying the main project or initiative \
being discussed in a meeting transcript.

Your task is to identify:
1. The primary project or initiative name that this meeting is about
2. Extract the project name directly from the transcript content
3. If multiple projects are discussed, identify the MAIN or PRIMARY project
4. If you are unsure or cannot clearly identify a project name from the transcript, return \
\"UNSURE\" (exactly this word)

The transcript may contain Hinglish (Hindi-English mix) or other multilingual content. \
Understand and process it correctly.

Return ONLY the project name as a string. Be concise - typically 2-5 words maximum.
Examples: \"Mobile App Launch\", \"Q4 Roadmap Planning\", \"API Integration Project\", \
\"Customer Portal Redesign\".
If unsure, return exactly \"UNSURE\".";

/// Answers that count as "no usable project name".
const UNSURE_ANSWERS: &[&str] = &["unsure", "unknown", "unnamed project", "general discussion"];

fn build_prompt(transcript: &str, meeting_title: Option<&str>) -> String {
    let title_context = match meeting_title {
        Some(title) => format!(
            "\n\nMeeting Title: {}\n(If you are unsure about the project name from the \
             transcript, return 'UNSURE' and the title will be used as fallback)",
            title
        ),
        None => String::new(),
    };

    format!(
        "Analyze the following meeting transcript and identify the MAIN project or \
         initiative name that this meeting is about.\n\
         \n\
         Extract the project name directly from the transcript content itself.\n\
         Look for:\n\
         - Project names explicitly mentioned in the transcript\n\
         - Primary project being discussed\n\
         - Main initiative or work item mentioned in conversations\n\
         - If multiple projects, identify the PRIMARY one\n\
         \n\
         Be concise - return only the project name (2-5 words typically).\n\
         If you are unsure or cannot clearly identify a project name from the transcript, \
         return exactly \"UNSURE\".\n\
         {}\n\
         \n\
         Transcript:\n{}\n\
         \n\
         Main Project Name:",
        title_context, transcript
    )
}

fn parse(raw: &str) -> Result<Option<String>> {
    let mut name = raw.trim().trim_matches('"').trim_matches('\'').to_string();
    if name.len() > 100 {
        name.truncate(100);
    }
    if name.is_empty() || UNSURE_ANSWERS.contains(&name.to_lowercase().as_str()) {
        return Ok(None);
    }
    Ok(Some(name))
}

/// Extract the main project name.
///
/// `None` means the model answered UNSURE (or an equivalent); the caller
/// falls back to the meeting title or the unnamed-project default.
/// Degrades to `None`.
pub async fn extract(
    backend: &dyn GenerationBackend,
    transcript: &str,
    meeting_title: Option<&str>,
) -> ExtractionOutcome<Option<String>> {
    let prompt = build_prompt(transcript, meeting_title);
    run_text_extractor(backend, "project_name", SYSTEM_PROMPT, &prompt, &parse).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use minutes_inference::MockInferenceBackend;

    #[test]
    fn test_parse_plain_name() {
        assert_eq!(
            parse("Customer Portal Redesign").unwrap(),
            Some("Customer Portal Redesign".to_string())
        );
    }

    #[test]
    fn test_parse_strips_quotes() {
        assert_eq!(
            parse("\"Mobile App Launch\"").unwrap(),
            Some("Mobile App Launch".to_string())
        );
        assert_eq!(parse("'API Project'").unwrap(), Some("API Project".to_string()));
    }

    #[test]
    fn test_parse_unsure_variants() {
        assert_eq!(parse("UNSURE").unwrap(), None);
        assert_eq!(parse("unsure").unwrap(), None);
        assert_eq!(parse("Unknown").unwrap(), None);
        assert_eq!(parse("Unnamed Project").unwrap(), None);
        assert_eq!(parse("General Discussion").unwrap(), None);
        assert_eq!(parse("").unwrap(), None);
    }

    #[test]
    fn test_parse_truncates_long_names() {
        let long = "A".repeat(300);
        let parsed = parse(&long).unwrap().unwrap();
        assert_eq!(parsed.len(), 100);
    }

    #[tokio::test]
    async fn test_extract_with_title_context() {
        let backend = MockInferenceBackend::new()
            .with_canned_response("Meeting Title: Standup", "UNSURE");
        let outcome = extract(&backend, "Alice: hello", Some("Standup")).await;
        assert_eq!(outcome.value, None);
        assert!(!outcome.degraded);
    }

    #[tokio::test]
    async fn test_extract_name() {
        let backend = MockInferenceBackend::new()
            .with_canned_response("Main Project Name", "Portal Redesign");
        let outcome = extract(&backend, "Alice: portal work", None).await;
        assert_eq!(outcome.value, Some("Portal Redesign".to_string()));
    }
}
