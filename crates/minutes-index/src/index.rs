//! In-memory embedding index with scoped cosine retrieval.
//!
//! Vectors are grouped per meeting and swapped in wholesale: an upsert
//! replaces the meeting's entire vector set behind an `Arc`, so a query
//! running concurrently either sees the old complete set or the new one,
//! never a partial state.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use minutes_core::{EmbeddingBackend, Error, Result};

use crate::chunking::Chunk;

/// Retrieval boundary for a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchScope {
    /// All indexed meetings.
    Global,
    /// Meetings tagged with this project name.
    Project(String),
    /// A single meeting.
    Meeting(Uuid),
}

/// A retrieval hit.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

/// Complete vector set for one meeting. Replaced atomically on upsert.
struct MeetingVectors {
    project_name: Option<String>,
    model_version: String,
    entries: Vec<(Chunk, Vec<f32>)>,
}

/// Embedding index over meeting chunks.
pub struct EmbeddingIndex {
    backend: Arc<dyn EmbeddingBackend>,
    meetings: RwLock<HashMap<Uuid, Arc<MeetingVectors>>>,
}

impl EmbeddingIndex {
    pub fn new(backend: Arc<dyn EmbeddingBackend>) -> Self {
        Self {
            backend,
            meetings: RwLock::new(HashMap::new()),
        }
    }

    /// Embed and index a meeting's chunks, replacing any previous set.
    ///
    /// The embedding calls happen outside the write lock; only the final
    /// map insertion takes it.
    #[instrument(skip(self, chunks), fields(subsystem = "index", component = "embedding_index", op = "upsert", meeting_id = %meeting_id, chunk_count = chunks.len()))]
    pub async fn upsert(
        &self,
        meeting_id: Uuid,
        project_name: Option<String>,
        chunks: Vec<Chunk>,
    ) -> Result<()> {
        if chunks.is_empty() {
            self.meetings.write().await.remove(&meeting_id);
            return Ok(());
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = self.backend.embed_texts(&texts).await?;
        if vectors.len() != chunks.len() {
            return Err(Error::Embedding(format!(
                "Expected {} vectors, got {}",
                chunks.len(),
                vectors.len()
            )));
        }

        let set = Arc::new(MeetingVectors {
            project_name,
            model_version: self.backend.model_version().to_string(),
            entries: chunks.into_iter().zip(vectors).collect(),
        });

        self.meetings.write().await.insert(meeting_id, set);
        debug!("Meeting vectors indexed");
        Ok(())
    }

    /// Retrieve the `top_k` most similar chunks within `scope`.
    ///
    /// Returns an empty list without calling the embedding backend when
    /// the scope holds no vectors. Vector sets produced by a different
    /// embedding model are skipped with a warning.
    #[instrument(skip(self, text), fields(subsystem = "index", component = "embedding_index", op = "query", top_k = top_k))]
    pub async fn query(
        &self,
        text: &str,
        top_k: usize,
        scope: &SearchScope,
    ) -> Result<Vec<ScoredChunk>> {
        let candidates: Vec<(Uuid, Arc<MeetingVectors>)> = {
            let meetings = self.meetings.read().await;
            meetings
                .iter()
                .filter(|(id, set)| match scope {
                    SearchScope::Global => true,
                    SearchScope::Project(name) => set.project_name.as_deref() == Some(name),
                    SearchScope::Meeting(target) => *id == target,
                })
                .map(|(id, set)| (*id, Arc::clone(set)))
                .collect()
        };

        if candidates.is_empty() || top_k == 0 {
            debug!(result_count = 0, "No vectors in scope");
            return Ok(vec![]);
        }

        let query_vec = self
            .backend
            .embed_texts(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Embedding("Backend returned no query vector".to_string()))?;

        let current_version = self.backend.model_version();
        let mut scored: Vec<ScoredChunk> = Vec::new();
        for (meeting_id, set) in &candidates {
            if set.model_version != current_version {
                warn!(
                    meeting_id = %meeting_id,
                    stored_model = %set.model_version,
                    model = current_version,
                    "Skipping vectors from a different embedding model"
                );
                continue;
            }
            for (chunk, vector) in &set.entries {
                scored.push(ScoredChunk {
                    chunk: chunk.clone(),
                    score: cosine_similarity(&query_vec, vector),
                });
            }
        }

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.chunk.meeting_id.cmp(&b.chunk.meeting_id))
                .then_with(|| a.chunk.chunk_index.cmp(&b.chunk.chunk_index))
        });
        scored.truncate(top_k);

        debug!(result_count = scored.len(), "Query complete");
        Ok(scored)
    }

    /// Remove a meeting's vectors.
    pub async fn delete(&self, meeting_id: Uuid) {
        self.meetings.write().await.remove(&meeting_id);
    }

    /// Number of meetings currently indexed.
    pub async fn meeting_count(&self) -> usize {
        self.meetings.read().await.len()
    }
}

/// Cosine similarity between two vectors of equal dimension.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if mag_a > 0.0 && mag_b > 0.0 {
        dot / (mag_a * mag_b)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minutes_inference::MockInferenceBackend;

    fn chunk(meeting_id: Uuid, index: usize, text: &str) -> Chunk {
        Chunk {
            meeting_id,
            chunk_index: index,
            text: text.to_string(),
            utterance_span: (index, index + 1),
        }
    }

    fn index() -> (EmbeddingIndex, Arc<MockInferenceBackend>) {
        let backend = Arc::new(MockInferenceBackend::new().with_dimension(64));
        let idx = EmbeddingIndex::new(backend.clone());
        (idx, backend)
    }

    #[tokio::test]
    async fn test_upsert_and_query() {
        let (idx, _) = index();
        let id = Uuid::new_v4();

        idx.upsert(
            id,
            Some("Portal".to_string()),
            vec![
                chunk(id, 0, "Alice: the portal login flow is broken"),
                chunk(id, 1, "Bob: the cafeteria menu changed today"),
            ],
        )
        .await
        .unwrap();

        let hits = idx
            .query("portal login flow", 5, &SearchScope::Global)
            .await
            .unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits[0].score >= hits[1].score);
        let texts: Vec<&str> = hits.iter().map(|h| h.chunk.text.as_str()).collect();
        assert!(texts.contains(&"Alice: the portal login flow is broken"));
        assert!(texts.contains(&"Bob: the cafeteria menu changed today"));
    }

    #[tokio::test]
    async fn test_empty_scope_returns_empty_without_embedding() {
        let (idx, backend) = index();

        let hits = idx.query("anything", 5, &SearchScope::Global).await.unwrap();
        assert!(hits.is_empty());
        assert_eq!(backend.embed_call_count(), 0);
    }

    #[tokio::test]
    async fn test_project_scope_isolation() {
        let (idx, _) = index();
        let alpha = Uuid::new_v4();
        let beta = Uuid::new_v4();

        idx.upsert(
            alpha,
            Some("Alpha".to_string()),
            vec![chunk(alpha, 0, "alpha content about deadlines")],
        )
        .await
        .unwrap();
        idx.upsert(
            beta,
            Some("Beta".to_string()),
            vec![chunk(beta, 0, "beta content about deadlines")],
        )
        .await
        .unwrap();

        let hits = idx
            .query(
                "deadlines",
                5,
                &SearchScope::Project("Alpha".to_string()),
            )
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].chunk.meeting_id, alpha);
    }

    #[tokio::test]
    async fn test_meeting_scope() {
        let (idx, _) = index();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        idx.upsert(a, None, vec![chunk(a, 0, "first meeting text")])
            .await
            .unwrap();
        idx.upsert(b, None, vec![chunk(b, 0, "second meeting text")])
            .await
            .unwrap();

        let hits = idx
            .query("meeting text", 5, &SearchScope::Meeting(b))
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].chunk.meeting_id, b);
    }

    #[tokio::test]
    async fn test_unknown_project_scope_empty() {
        let (idx, _) = index();
        let id = Uuid::new_v4();
        idx.upsert(
            id,
            Some("Alpha".to_string()),
            vec![chunk(id, 0, "content")],
        )
        .await
        .unwrap();

        let hits = idx
            .query("content", 5, &SearchScope::Project("Nonexistent".to_string()))
            .await
            .unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_upsert_replaces_previous_set() {
        let (idx, _) = index();
        let id = Uuid::new_v4();

        idx.upsert(id, None, vec![chunk(id, 0, "old content about cats")])
            .await
            .unwrap();
        idx.upsert(id, None, vec![chunk(id, 0, "new content about dogs")])
            .await
            .unwrap();

        let hits = idx.query("content", 10, &SearchScope::Global).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].chunk.text, "new content about dogs");
    }

    #[tokio::test]
    async fn test_upsert_idempotent_ranking() {
        let (idx, _) = index();
        let id = Uuid::new_v4();
        let chunks = vec![
            chunk(id, 0, "budget discussion for the quarter"),
            chunk(id, 1, "hiring plan for the platform team"),
        ];

        idx.upsert(id, None, chunks.clone()).await.unwrap();
        let first = idx
            .query("hiring plan", 5, &SearchScope::Global)
            .await
            .unwrap();

        idx.upsert(id, None, chunks).await.unwrap();
        let second = idx
            .query("hiring plan", 5, &SearchScope::Global)
            .await
            .unwrap();

        let order = |hits: &[ScoredChunk]| {
            hits.iter().map(|h| h.chunk.chunk_index).collect::<Vec<_>>()
        };
        assert_eq!(order(&first), order(&second));
    }

    #[tokio::test]
    async fn test_delete_removes_meeting() {
        let (idx, _) = index();
        let id = Uuid::new_v4();
        idx.upsert(id, None, vec![chunk(id, 0, "content")])
            .await
            .unwrap();
        assert_eq!(idx.meeting_count().await, 1);

        idx.delete(id).await;
        assert_eq!(idx.meeting_count().await, 0);

        let hits = idx.query("content", 5, &SearchScope::Global).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_empty_chunks_clears_meeting() {
        let (idx, _) = index();
        let id = Uuid::new_v4();
        idx.upsert(id, None, vec![chunk(id, 0, "content")])
            .await
            .unwrap();
        idx.upsert(id, None, vec![]).await.unwrap();
        assert_eq!(idx.meeting_count().await, 0);
    }

    #[tokio::test]
    async fn test_model_version_mismatch_skipped() {
        let (idx, _) = index();
        let id = Uuid::new_v4();

        // Simulate vectors left behind by an older embedding model.
        let stale = Arc::new(MeetingVectors {
            project_name: None,
            model_version: "old-model".to_string(),
            entries: vec![(chunk(id, 0, "stale content"), vec![0.1; 64])],
        });
        idx.meetings.write().await.insert(id, stale);

        let fresh = Uuid::new_v4();
        idx.upsert(fresh, None, vec![chunk(fresh, 0, "fresh content")])
            .await
            .unwrap();

        let hits = idx.query("content", 10, &SearchScope::Global).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].chunk.meeting_id, fresh);
    }

    #[tokio::test]
    async fn test_top_k_truncation() {
        let (idx, _) = index();
        let id = Uuid::new_v4();
        let chunks: Vec<Chunk> = (0..10)
            .map(|i| chunk(id, i, &format!("statement number {}", i)))
            .collect();
        idx.upsert(id, None, chunks).await.unwrap();

        let hits = idx
            .query("statement", 3, &SearchScope::Global)
            .await
            .unwrap();
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn test_cosine_similarity_basics() {
        let a = vec![1.0, 0.0];
        let b = vec![1.0, 0.0];
        let c = vec![0.0, 1.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&a, &c).abs() < 1e-6);
        assert_eq!(cosine_similarity(&a, &[]), 0.0);
    }
}
