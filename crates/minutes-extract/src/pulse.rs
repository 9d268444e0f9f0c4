//! Meeting pulse extraction (sentiment, tone, behavioral cues).

use minutes_core::{GenerationBackend, Pulse, Result};

use crate::driver::{run_json_extractor, ExtractionOutcome};

const SYSTEM_PROMPT: &str = "You are an expert at analyzing meeting dynamics and extracting \
company pulse indicators.

Your task is to analyze:
1. Overall sentiment (positive, neutral, negative)
2. Tone detection (optimistic, cautious, frustrated, enthusiastic)
3. Behavioral cues (engagement levels, participation patterns)
4. Per-speaker sentiment (if speakers are identified)
5. Team dynamics and collaboration signals

The transcript may contain Hinglish (Hindi-English mix) or other multilingual content. \
Understand cultural context and communication patterns.

Return a JSON object with the following structure:
{
  \"overall_sentiment\": \"positive|neutral|negative\",
  \"sentiment_score\": 0.0 to 1.0 (0 = very negative, 1 = very positive),
  \"tone\": [\"optimistic\", \"cautious\", \"frustrated\", etc.],
  \"speaker_sentiments\": [
    {
      \"speaker\": \"Speaker name\",
      \"sentiment\": \"positive|neutral|negative\",
      \"sentiment_score\": 0.0 to 1.0,
      \"engagement_level\": \"high|medium|low\"
    }
  ],
  \"behavioral_cues\": [
    {
      \"cue\": \"Description of behavioral pattern\",
      \"type\": \"engagement|collaboration|conflict|alignment\"
    }
  ],
  \"key_insights\": [\"Insight 1\", \"Insight 2\"]
}";

fn build_prompt(transcript: &str, speakers: &[String]) -> String {
    let speakers_context = if speakers.is_empty() {
        String::new()
    } else {
        format!(
            "\n\nSpeakers identified in the meeting: {}",
            speakers.join(", ")
        )
    };

    format!(
        "Analyze the following meeting transcript and extract company pulse indicators.\n\
         \n\
         Analyze:\n\
         - Overall sentiment and tone\n\
         - Individual speaker sentiments and engagement (if speakers are identified)\n\
         - Behavioral patterns and team dynamics\n\
         - Key insights about team morale and collaboration\n\
         {}\n\
         \n\
         Transcript:\n{}\n\
         \n\
         Return a JSON object with pulse analysis.",
        speakers_context, transcript
    )
}

fn parse(raw: &str) -> Result<Pulse> {
    let mut pulse: Pulse = serde_json::from_str(raw)?;
    pulse.clamp_scores();
    Ok(pulse)
}

/// Extract the meeting pulse. Degrades to the neutral default.
pub async fn extract(
    backend: &dyn GenerationBackend,
    transcript: &str,
    speakers: &[String],
) -> ExtractionOutcome<Pulse> {
    let prompt = build_prompt(transcript, speakers);
    run_json_extractor(backend, "pulse", SYSTEM_PROMPT, &prompt, &parse).await
}
