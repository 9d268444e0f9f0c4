//! Shared extraction driver: call, parse, retry once, degrade.
//!
//! Every extraction pass runs through this module. A pass that fails to
//! produce parseable output after one corrective retry yields its
//! default-shaped value instead of failing the whole run; a hung model
//! call is converted into the same degraded outcome by a timeout.

use std::time::Duration;

use tracing::{debug, warn};

use minutes_core::{Error, GenerationBackend, Result};

/// Appended to the prompt on the retry attempt.
const CORRECTIVE_INSTRUCTION: &str = "\n\nYour previous output was not valid JSON with the \
required structure. Respond again with ONLY the JSON object or array requested, with no \
prose, no explanation, and no code fences.";

/// Result of one extraction pass.
#[derive(Debug, Clone)]
pub struct ExtractionOutcome<T> {
    pub value: T,
    /// True when the pass exhausted its retry and fell back to the default.
    pub degraded: bool,
}

impl<T> ExtractionOutcome<T> {
    pub fn ok(value: T) -> Self {
        Self {
            value,
            degraded: false,
        }
    }

    pub fn degraded(value: T) -> Self {
        Self {
            value,
            degraded: true,
        }
    }
}

/// Strip Markdown code fences some models wrap around JSON output.
pub(crate) fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop an optional language tag on the fence line.
    let inner = match inner.split_once('\n') {
        Some((_tag, rest)) => rest,
        None => inner,
    };
    inner.trim_end().strip_suffix("```").unwrap_or(inner).trim()
}

async fn attempt<T>(
    backend: &dyn GenerationBackend,
    system: &str,
    prompt: &str,
    json: bool,
    timeout: Duration,
    parse: &(dyn Fn(&str) -> Result<T> + Sync),
) -> Result<T> {
    let call = async {
        if json {
            backend.generate_json_with_system(system, prompt).await
        } else {
            backend.generate_with_system(system, prompt).await
        }
    };
    let raw = tokio::time::timeout(timeout, call)
        .await
        .map_err(|_| Error::Inference("generation timed out".to_string()))??;
    parse(strip_code_fences(&raw))
}

async fn run<T: Default>(
    backend: &dyn GenerationBackend,
    kind: &str,
    system: &str,
    prompt: &str,
    json: bool,
    parse: &(dyn Fn(&str) -> Result<T> + Sync),
) -> ExtractionOutcome<T> {
    let timeout = Duration::from_secs(minutes_core::defaults::EXTRACT_TIMEOUT_SECS);

    match attempt(backend, system, prompt, json, timeout, parse).await {
        Ok(value) => {
            debug!(extractor = kind, "Extraction pass complete");
            ExtractionOutcome::ok(value)
        }
        Err(first_err) => {
            warn!(
                extractor = kind,
                error = %first_err,
                "Extraction attempt failed, retrying with corrective instruction"
            );
            let corrected = format!("{}{}", prompt, CORRECTIVE_INSTRUCTION);
            match attempt(backend, system, &corrected, json, timeout, parse).await {
                Ok(value) => {
                    debug!(extractor = kind, "Extraction retry succeeded");
                    ExtractionOutcome::ok(value)
                }
                Err(second_err) => {
                    warn!(
                        extractor = kind,
                        error = %second_err,
                        degraded = true,
                        "Extraction retry failed, using default result"
                    );
                    ExtractionOutcome::degraded(T::default())
                }
            }
        }
    }
}

/// Run a JSON-constrained extraction pass.
pub(crate) async fn run_json_extractor<T: Default>(
    backend: &dyn GenerationBackend,
    kind: &str,
    system: &str,
    prompt: &str,
    parse: &(dyn Fn(&str) -> Result<T> + Sync),
) -> ExtractionOutcome<T> {
    run(backend, kind, system, prompt, true, parse).await
}

/// Run a free-text extraction pass.
pub(crate) async fn run_text_extractor<T: Default>(
    backend: &dyn GenerationBackend,
    kind: &str,
    system: &str,
    prompt: &str,
    parse: &(dyn Fn(&str) -> Result<T> + Sync),
) -> ExtractionOutcome<T> {
    run(backend, kind, system, prompt, false, parse).await
}
