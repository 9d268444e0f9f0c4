//! Executive summary extraction.

use minutes_core::{GenerationBackend, Result};

use crate::driver::{run_text_extractor, ExtractionOutcome};

const SYSTEM_PROMPT: &str = "You are an expert at analyzing meeting transcripts and creating \
sharp, short executive summaries.

Your task is to extract:
1. Key decisions made
2. Main outcomes and action items
3. Important discussions and context
4. Critical information that executives need to know

The transcript may contain Hinglish (Hindi-English mix) or other multilingual content. \
Understand and process it correctly, including phrases like \"haan yaar, dekh lenge\" \
(yes, we'll see) and other mixed-language expressions.

Create a SHARP, SHORT summary - be concise, direct, and impactful. Aim for 2-3 paragraphs \
maximum. Focus on what matters most.";

fn build_prompt(transcript: &str) -> String {
    format!(
        "Analyze the following meeting transcript and create a SHARP, SHORT executive summary.\n\
         \n\
         Focus on:\n\
         - Key decisions and commitments\n\
         - Important outcomes\n\
         - Critical action items\n\
         - Significant discussions\n\
         \n\
         Be direct and concise. Extract only the most important information that executives \
         need to know.\n\
         \n\
         The transcript may contain Hinglish (Hindi-English mix) or other multilingual \
         content - process it correctly.\n\
         \n\
         Transcript:\n{}\n\
         \n\
         Executive Summary (keep it sharp and short):",
        transcript
    )
}

fn parse(raw: &str) -> Result<String> {
    Ok(raw.trim().to_string())
}

/// Extract an executive summary. Degrades to an empty string.
pub async fn extract(backend: &dyn GenerationBackend, transcript: &str) -> ExtractionOutcome<String> {
    let prompt = build_prompt(transcript);
    run_text_extractor(backend, "summary", SYSTEM_PROMPT, &prompt, &parse).await
}
