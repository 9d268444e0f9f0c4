//! Main-project detail extraction.

use serde_json::Value;

use minutes_core::{Error, GenerationBackend, ProjectDetail, Result};

use crate::driver::{run_json_extractor, ExtractionOutcome};

const SYSTEM_PROMPT: &str = "You are an expert at extracting detailed information about the \
MAIN project being discussed in a meeting.

Your task is to extract detailed information ONLY about the PRIMARY/MAIN project that this \
meeting is about.
DO NOT extract information about other projects that are mentioned in passing or discussed \
briefly.
Focus ONLY on the main project that this transcript is specifically about.

Extract:
1. Project name (should match the main project)
2. Detailed description of what this project involves
3. Owner or person responsible (if mentioned)
4. Current status: Proposed, In Progress, Blocked, or Completed (capitalize first letter)
5. Timeline hints or deadlines mentioned
6. Any side-chats or brief mentions related to THIS main project

The transcript may contain Hinglish (Hindi-English mix) or other multilingual content. \
Understand phrases like \"haan yaar, dekh lenge\" (yes, we'll see) which might indicate \
tentative commitments.

If the same initiative is referred to by slightly different names, report it ONCE.

IMPORTANT: Only extract details about the MAIN project. Ignore other projects that are \
mentioned but are not the focus of this meeting.

Return a JSON array with ONE project object (the main project) with the following structure:
[
  {
    \"name\": \"Main project name\",
    \"description\": \"Detailed description of the main project\",
    \"owner\": \"Person responsible (if mentioned)\",
    \"status\": \"Proposed|In Progress|Blocked|Completed\",
    \"timeline_hints\": \"Any timeline information mentioned\"
  }
]

If the main project cannot be clearly identified, return an empty array [].";

fn build_prompt(transcript: &str) -> String {
    format!(
        "Analyze the following meeting transcript and identify all project candidates.\n\
         \n\
         Look for:\n\
         - Explicit project mentions\n\
         - Implicit projects from discussions\n\
         - Side conversations that might indicate projects\n\
         - Any work items or initiatives discussed\n\
         \n\
         Be thorough - even brief mentions or side-chats can be important projects.\n\
         \n\
         Transcript:\n{}\n\
         \n\
         Return a JSON array of projects. If no projects are found, return an empty array [].",
        transcript
    )
}

/// Canonicalize a status string: `in_progress` becomes `In Progress`,
/// unknown values are title-cased.
pub fn normalize_status(status: &str) -> String {
    let lowered = status.trim().to_lowercase().replace('_', " ");
    match lowered.as_str() {
        "" => String::new(),
        "in progress" => "In Progress".to_string(),
        "proposed" => "Proposed".to_string(),
        "blocked" => "Blocked".to_string(),
        "completed" => "Completed".to_string(),
        other => other
            .split_whitespace()
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" "),
    }
}

fn detail_from_value(value: &Value) -> Option<ProjectDetail> {
    let obj = value.as_object()?;
    let text = |key: &str| {
        obj.get(key)
            .and_then(Value::as_str)
            .unwrap_or("")
            .trim()
            .to_string()
    };
    let name = {
        let n = text("name");
        if n.is_empty() {
            minutes_core::defaults::UNNAMED_PROJECT.to_string()
        } else {
            n
        }
    };
    Some(ProjectDetail {
        name,
        description: text("description"),
        owner: text("owner"),
        status: normalize_status(&text("status")),
        timeline_hints: text("timeline_hints"),
        blockers: Vec::new(),
        risks: Vec::new(),
    })
}

/// Collapse entries naming the same initiative (case-insensitive name match),
/// keeping the first entry's position and filling its empty fields from
/// later duplicates.
pub fn merge_duplicates(details: Vec<ProjectDetail>) -> Vec<ProjectDetail> {
    let mut merged: Vec<ProjectDetail> = Vec::new();
    for detail in details {
        let key = detail.name.to_lowercase();
        match merged.iter_mut().find(|d| d.name.to_lowercase() == key) {
            Some(existing) => {
                if existing.description.is_empty() {
                    existing.description = detail.description;
                }
                if existing.owner.is_empty() {
                    existing.owner = detail.owner;
                }
                if existing.status.is_empty() {
                    existing.status = detail.status;
                }
                if existing.timeline_hints.is_empty() {
                    existing.timeline_hints = detail.timeline_hints;
                }
                existing.blockers.extend(detail.blockers);
                existing.risks.extend(detail.risks);
            }
            None => merged.push(detail),
        }
    }
    merged
}

fn parse(raw: &str) -> Result<Vec<ProjectDetail>> {
    let value: Value = serde_json::from_str(raw)?;

    // Accept a bare array, a wrapper object, or a single project object.
    let entries: Vec<Value> = match value {
        Value::Array(items) => items,
        Value::Object(ref obj) => {
            if let Some(Value::Array(items)) = obj.get("projects").or_else(|| obj.get("data")) {
                items.clone()
            } else if obj.contains_key("name") || obj.contains_key("description") {
                vec![value]
            } else {
                return Err(Error::Serialization(
                    "response has no recognizable project payload".to_string(),
                ));
            }
        }
        _ => {
            return Err(Error::Serialization(
                "expected a JSON array of projects".to_string(),
            ))
        }
    };

    let details: Vec<ProjectDetail> = entries.iter().filter_map(detail_from_value).collect();
    Ok(merge_duplicates(details))
}

/// Extract details of the main project. Degrades to an empty list.
pub async fn extract(
    backend: &dyn GenerationBackend,
    transcript: &str,
) -> ExtractionOutcome<Vec<ProjectDetail>> {
    let prompt = build_prompt(transcript);
    run_json_extractor(backend, "project", SYSTEM_PROMPT, &prompt, &parse).await
}
