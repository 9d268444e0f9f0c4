//! Retrieval-augmented chatbot over indexed meeting transcripts.

use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use minutes_core::{
    defaults, ChatScope, ConversationTurn, GenerationBackend, MeetingStore, Result, TurnRole,
};
use minutes_index::{EmbeddingIndex, ScoredChunk, SearchScope};

const SYSTEM_PROMPT: &str = "You are a helpful assistant that answers questions about meeting \
transcripts.

You have access to relevant meeting chunks that have been retrieved based on the user's query.
Use the provided context to answer questions accurately. If the context doesn't contain enough \
information, say so.

Be concise but comprehensive. Focus on:
- Specific details mentioned in meetings
- Decisions and commitments
- Project status and health
- People and responsibilities
- Timeline and deadlines";

/// Fixed answer when retrieval produces no context.
pub const NO_CONTEXT_ANSWER: &str =
    "I couldn't find any relevant information in the meeting transcripts to answer your question.";

/// One conversation with a fixed retrieval scope.
///
/// Turns are session-local and are only recorded for answers that were
/// actually grounded in retrieved context.
#[derive(Debug, Clone)]
pub struct ChatSession {
    scope: ChatScope,
    turns: Vec<ConversationTurn>,
}

impl ChatSession {
    pub fn new(scope: ChatScope) -> Self {
        Self {
            scope,
            turns: Vec::new(),
        }
    }

    pub fn scope(&self) -> &ChatScope {
        &self.scope
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    /// Switch scope. A changed scope clears the conversation so answers
    /// never mix context from two scopes.
    pub fn set_scope(&mut self, scope: ChatScope) {
        if self.scope != scope {
            self.turns.clear();
            self.scope = scope;
        }
    }

    fn record(&mut self, question: &str, answer: &str) {
        self.turns.push(ConversationTurn {
            role: TurnRole::User,
            content: question.to_string(),
        });
        self.turns.push(ConversationTurn {
            role: TurnRole::Assistant,
            content: answer.to_string(),
        });
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new(ChatScope::Global)
    }
}

/// Chatbot answering questions about stored meetings via RAG.
pub struct MeetingChatbot {
    backend: Arc<dyn GenerationBackend>,
    index: Arc<EmbeddingIndex>,
    store: Arc<dyn MeetingStore>,
    top_k: usize,
}

impl MeetingChatbot {
    pub fn new(
        backend: Arc<dyn GenerationBackend>,
        index: Arc<EmbeddingIndex>,
        store: Arc<dyn MeetingStore>,
    ) -> Self {
        Self {
            backend,
            index,
            store,
            top_k: defaults::CHAT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Answer a question within the session's scope.
    ///
    /// Only model-generated answers become part of the session history.
    /// The canned replies for an unknown project and for empty retrieval
    /// ([`NO_CONTEXT_ANSWER`]) are returned without recording the
    /// exchange, so an ungrounded detour never leaks into later prompts.
    #[instrument(skip(self, session, question), fields(subsystem = "chatbot", op = "answer"))]
    pub async fn answer(&self, session: &mut ChatSession, question: &str) -> Result<String> {
        let (search_scope, sole_meeting) = match session.scope() {
            ChatScope::Global => (SearchScope::Global, None),
            ChatScope::Project(name) => {
                let ids = self.store.meeting_ids_for_project(name).await?;
                if ids.is_empty() {
                    info!(project = %name, "No meetings recorded for requested project");
                    return Ok(format!(
                        "I couldn't find any meetings for the project '{}'.",
                        name
                    ));
                }
                if ids.len() == 1 {
                    (SearchScope::Meeting(ids[0]), Some(ids[0]))
                } else {
                    (SearchScope::Project(name.clone()), None)
                }
            }
        };

        let chunks = self.index.query(question, self.top_k, &search_scope).await?;
        if chunks.is_empty() {
            info!(scope = %session.scope(), "Retrieval produced no context");
            return Ok(NO_CONTEXT_ANSWER.to_string());
        }

        let context = build_context(&chunks);
        let prompt = build_prompt(
            session.scope(),
            sole_meeting,
            &context,
            session.turns(),
            question,
        );

        let answer = self.backend.generate_with_system(SYSTEM_PROMPT, &prompt).await?;
        let answer = answer.trim().to_string();
        info!(
            scope = %session.scope(),
            chunk_count = chunks.len(),
            "Answered chat question"
        );
        session.record(question, &answer);
        Ok(answer)
    }
}

fn build_context(chunks: &[ScoredChunk]) -> String {
    chunks
        .iter()
        .enumerate()
        .map(|(i, scored)| {
            format!(
                "[Meeting {}, Chunk {}]:\n{}",
                scored.chunk.meeting_id,
                i + 1,
                scored.chunk.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn build_prompt(
    scope: &ChatScope,
    sole_meeting: Option<Uuid>,
    context: &str,
    turns: &[ConversationTurn],
    question: &str,
) -> String {
    let header = match (scope, sole_meeting) {
        (ChatScope::Project(_), Some(id)) => format!(
            "Based on the following meeting transcript chunks, answer the user's question.\n\
             \n\
             Context from Meeting {}:\n{}",
            id, context
        ),
        (ChatScope::Project(name), None) => format!(
            "Based on the following meeting transcript chunks from meetings related to \
             project '{}', answer the user's question.\n\
             \n\
             Context from meetings:\n{}",
            name, context
        ),
        (ChatScope::Global, _) => format!(
            "Based on the following meeting transcript chunks from various meetings, \
             answer the user's question.\n\
             \n\
             Context from meetings:\n{}",
            context
        ),
    };

    let mut prompt = header;
    if !turns.is_empty() {
        prompt.push_str("\n\nPrevious conversation:\n");
        for turn in turns {
            let role = match turn.role {
                TurnRole::User => "User",
                TurnRole::Assistant => "Assistant",
            };
            prompt.push_str(&format!("{}: {}\n", role, turn.content));
        }
    }
    prompt.push_str(&format!("\nQuestion: {}\n\nAnswer:", question));
    prompt
}
