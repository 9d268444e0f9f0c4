//! Mock inference backend for deterministic testing.
//!
//! Provides a mock implementation of the inference traits that generates
//! deterministic embeddings and canned responses for testing purposes.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use minutes_inference::mock::MockInferenceBackend;
//!
//! let backend = MockInferenceBackend::new()
//!     .with_dimension(64)
//!     .with_canned_response("summary", r#"{"summary": "Short."}"#);
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use minutes_core::{
    EmbeddingBackend, Error, GenerationBackend, InferenceBackend, Result, Vector,
};

/// Mock inference backend for testing.
///
/// Generation responses are selected by substring match against the prompt,
/// so tests can key canned outputs on a distinctive phrase in each
/// extractor's prompt without reproducing the whole prompt text.
#[derive(Clone)]
pub struct MockInferenceBackend {
    config: Arc<MockConfig>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
    scripted_failures: Arc<Mutex<HashMap<String, usize>>>,
}

#[derive(Debug, Clone)]
struct MockConfig {
    dimension: usize,
    canned_responses: Vec<(String, String)>,
    default_response: String,
    latency_ms: u64,
    failure_rate: f64,
}

#[derive(Debug, Clone)]
pub struct MockCall {
    pub operation: String,
    pub input: String,
    pub timestamp: std::time::Instant,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            dimension: 32,
            canned_responses: Vec::new(),
            default_response: "{}".to_string(),
            latency_ms: 0,
            failure_rate: 0.0,
        }
    }
}

impl MockInferenceBackend {
    /// Create a new mock backend with default configuration.
    pub fn new() -> Self {
        Self {
            config: Arc::new(MockConfig::default()),
            call_log: Arc::new(Mutex::new(Vec::new())),
            scripted_failures: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Set the embedding dimension.
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        Arc::make_mut(&mut self.config).dimension = dimension;
        self
    }

    /// Set the fallback response for prompts with no canned match.
    pub fn with_default_response(mut self, response: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).default_response = response.into();
        self
    }

    /// Add a canned response returned when the prompt contains `key`.
    /// Earlier registrations win when several keys match.
    pub fn with_canned_response(
        mut self,
        key: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        Arc::make_mut(&mut self.config)
            .canned_responses
            .push((key.into(), response.into()));
        self
    }

    /// Fail the next `times` generation calls whose prompt contains `key`.
    /// Subsequent matching calls behave normally.
    pub fn with_failing_matcher(self, key: impl Into<String>, times: usize) -> Self {
        self.scripted_failures
            .lock()
            .unwrap()
            .insert(key.into(), times);
        self
    }

    /// Set simulated latency for all operations.
    pub fn with_latency_ms(mut self, latency_ms: u64) -> Self {
        Arc::make_mut(&mut self.config).latency_ms = latency_ms;
        self
    }

    /// Set failure rate (0.0 - 1.0) for testing error handling.
    pub fn with_failure_rate(mut self, rate: f64) -> Self {
        Arc::make_mut(&mut self.config).failure_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Get all logged calls for assertion.
    pub fn get_calls(&self) -> Vec<MockCall> {
        self.call_log.lock().unwrap().clone()
    }

    /// Clear the call log.
    pub fn clear_calls(&self) {
        self.call_log.lock().unwrap().clear()
    }

    /// Get number of embed calls (one per batch).
    pub fn embed_call_count(&self) -> usize {
        self.call_log
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.operation == "embed")
            .count()
    }

    /// Get number of generation calls.
    pub fn generate_call_count(&self) -> usize {
        self.call_log
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.operation == "generate")
            .count()
    }

    /// Total calls of any kind.
    pub fn total_call_count(&self) -> usize {
        self.call_log.lock().unwrap().len()
    }

    fn log_call(&self, operation: &str, input: &str) {
        self.call_log.lock().unwrap().push(MockCall {
            operation: operation.to_string(),
            input: input.to_string(),
            timestamp: std::time::Instant::now(),
        });
    }

    fn should_fail(&self) -> bool {
        use rand::Rng;
        if self.config.failure_rate > 0.0 {
            rand::thread_rng().gen::<f64>() < self.config.failure_rate
        } else {
            false
        }
    }

    fn take_scripted_failure(&self, prompt: &str) -> bool {
        let mut failures = self.scripted_failures.lock().unwrap();
        for (key, remaining) in failures.iter_mut() {
            if prompt.contains(key.as_str()) && *remaining > 0 {
                *remaining -= 1;
                return true;
            }
        }
        false
    }

    async fn simulate_latency(&self) {
        if self.config.latency_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(self.config.latency_ms)).await;
        }
    }

    fn respond(&self, prompt: &str) -> Result<String> {
        if self.take_scripted_failure(prompt) {
            return Err(Error::Inference("scripted mock failure".to_string()));
        }
        if self.should_fail() {
            return Err(Error::Inference("simulated mock failure".to_string()));
        }
        for (key, response) in &self.config.canned_responses {
            if prompt.contains(key.as_str()) {
                return Ok(response.clone());
            }
        }
        Ok(self.config.default_response.clone())
    }
}

impl Default for MockInferenceBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingBackend for MockInferenceBackend {
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vector>> {
        self.log_call("embed", &texts.join("\n"));
        self.simulate_latency().await;

        if self.should_fail() {
            return Err(Error::Embedding("simulated mock failure".to_string()));
        }

        Ok(texts
            .iter()
            .map(|t| MockEmbeddingGenerator::generate(t, self.config.dimension))
            .collect())
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }

    fn model_version(&self) -> &str {
        "mock-embed"
    }
}

#[async_trait]
impl GenerationBackend for MockInferenceBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.log_call("generate", prompt);
        self.simulate_latency().await;
        self.respond(prompt)
    }

    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        let combined = format!("{}\n{}", system, prompt);
        self.log_call("generate", &combined);
        self.simulate_latency().await;
        self.respond(&combined)
    }

    async fn generate_json(&self, prompt: &str) -> Result<String> {
        self.generate(prompt).await
    }

    async fn generate_json_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        self.generate_with_system(system, prompt).await
    }

    fn model_name(&self) -> &str {
        "mock-gen"
    }
}

#[async_trait]
impl InferenceBackend for MockInferenceBackend {
    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }
}

/// Mock embedding generator with deterministic output.
pub struct MockEmbeddingGenerator;

impl MockEmbeddingGenerator {
    /// Generate a deterministic embedding from text.
    ///
    /// Uses character-based hashing for reproducibility. The same text
    /// will always produce the same embedding, and texts sharing words
    /// produce nearby vectors.
    pub fn generate(text: &str, dimension: usize) -> Vector {
        let mut vec = vec![0.0; dimension];

        for (i, c) in text.chars().enumerate() {
            let idx = (c as usize + i) % dimension;
            vec[idx] += 0.1;
        }

        Self::normalize(&mut vec);
        vec
    }

    fn normalize(vec: &mut [f32]) {
        let magnitude: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            vec.iter_mut().for_each(|x| *x /= magnitude);
        }
    }

    /// Calculate cosine similarity between two vectors.
    pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        assert_eq!(a.len(), b.len(), "Vectors must have same dimension");

        let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

        if mag_a > 0.0 && mag_b > 0.0 {
            dot / (mag_a * mag_b)
        } else {
            0.0
        }
    }
}
