use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::application::RagService;
use crate::domain::{
    ports::{CompletionService, ConversationStore, EmbeddingService},
    ChatTurn, Completion, DomainError, Embedding, Message, SearchResult,
};

const CONTEXT_HEADER: &str = "Context information:\n\n";

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub system_prompt: String,
    pub fallback_answer: String,
    pub max_history: usize,
    pub timeout: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            system_prompt: "You are a helpful assistant. Use the following context information \
                            to answer the user's question, if relevant: "
                .to_string(),
            fallback_answer: "I'm sorry, I'm having trouble processing your request right now. \
                              Please try again later."
                .to_string(),
            max_history: 10,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Answers one user turn: embed, persist, retrieve, assemble, complete, persist.
///
/// Upstream and write-path storage failures are logged and degraded; they never
/// abort the answer.
pub struct QueryPipeline {
    embedding: Arc<dyn EmbeddingService>,
    conversations: Arc<dyn ConversationStore>,
    rag: Arc<RagService>,
    completion: Arc<dyn CompletionService>,
    settings: PipelineSettings,
}

impl QueryPipeline {
    pub fn new(
        embedding: Arc<dyn EmbeddingService>,
        conversations: Arc<dyn ConversationStore>,
        rag: Arc<RagService>,
        completion: Arc<dyn CompletionService>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            embedding,
            conversations,
            rag,
            completion,
            settings,
        }
    }

    /// Runs [`answer`](Self::answer), creating a new session when none is given.
    pub async fn send_message(
        &self,
        session_id: Option<&str>,
        query: &str,
    ) -> Result<(String, Completion), DomainError> {
        let session_id = match session_id.map(str::trim).filter(|s| !s.is_empty()) {
            Some(id) => id.to_string(),
            None => {
                let id = Uuid::new_v4().to_string();
                info!(session_id = %id, "created new session");
                id
            }
        };

        let completion = self.answer(&session_id, query).await?;
        Ok((session_id, completion))
    }

    #[instrument(skip(self, query), fields(query_len = query.len()))]
    pub async fn answer(&self, session_id: &str, query: &str) -> Result<Completion, DomainError> {
        if session_id.trim().is_empty() {
            return Err(DomainError::validation("session_id is required"));
        }
        if query.trim().is_empty() {
            return Err(DomainError::validation("query is required"));
        }

        let embedding = match self.embedding.embed(query).await {
            Ok(embedding) => embedding,
            Err(e) => {
                warn!(error = %e, "failed to embed query, continuing without retrieval");
                Embedding::default()
            }
        };

        self.save_best_effort(ChatTurn::user(session_id, query, embedding.clone()))
            .await;

        let documents = self.retrieve(&embedding).await;
        let (preamble, sources) = build_preamble(&self.settings.system_prompt, &documents);

        let history = match self.conversations.list_turns(session_id).await {
            Ok(history) => history,
            Err(e) => {
                warn!(error = %e, "failed to load conversation history");
                Vec::new()
            }
        };

        let messages = build_messages(&preamble, &history, query, self.settings.max_history);
        let answer = self.complete(&messages).await;

        // The assistant turn reuses the query embedding; the answer itself is not embedded.
        self.save_best_effort(ChatTurn::assistant(session_id, &answer, embedding))
            .await;

        Ok(Completion::new(answer, sources))
    }

    #[instrument(skip(self))]
    pub async fn history(&self, session_id: &str) -> Result<Vec<ChatTurn>, DomainError> {
        if session_id.trim().is_empty() {
            return Err(DomainError::validation("session_id is required"));
        }
        self.conversations.list_turns(session_id).await
    }

    async fn retrieve(&self, embedding: &Embedding) -> Vec<SearchResult> {
        if embedding.is_empty() {
            return Vec::new();
        }
        match self.rag.retrieve_for(embedding).await {
            Ok(results) => results,
            Err(e) => {
                warn!(error = %e, "context retrieval failed");
                Vec::new()
            }
        }
    }

    async fn complete(&self, messages: &[Message]) -> String {
        let result = tokio::time::timeout(self.settings.timeout, self.completion.complete(messages))
            .await
            .map_err(|_| DomainError::timeout("completion provider"))
            .and_then(|r| r);

        match result {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                error!("completion provider returned an empty answer");
                self.settings.fallback_answer.clone()
            }
            Err(e) => {
                error!(error = %e, "failed to get completion");
                self.settings.fallback_answer.clone()
            }
        }
    }

    async fn save_best_effort(&self, turn: ChatTurn) {
        let role = turn.role;
        if let Err(e) = self.conversations.save_turn(turn).await {
            error!(error = %e, role = role.as_str(), "failed to save chat turn");
        }
    }
}

/// System prompt plus retrieved context, and the `source` of each document.
pub fn build_preamble(system_prompt: &str, documents: &[SearchResult]) -> (String, Vec<String>) {
    let mut preamble = system_prompt.to_string();
    let mut sources = Vec::new();

    if !documents.is_empty() {
        preamble.push_str(CONTEXT_HEADER);
        for result in documents {
            preamble.push_str(&result.document.content);
            preamble.push_str("\n\n");
            if let Some(source) = result.document.source() {
                sources.push(source.to_string());
            }
        }
    }

    (preamble, sources)
}

/// System message, the last `max_history` turns, then the query unless it
/// already ends the history.
pub fn build_messages(
    preamble: &str,
    history: &[ChatTurn],
    query: &str,
    max_history: usize,
) -> Vec<Message> {
    let recent = &history[history.len().saturating_sub(max_history)..];

    let mut messages = Vec::with_capacity(recent.len() + 2);
    messages.push(Message::system(preamble));
    messages.extend(recent.iter().map(Message::from));

    let already_sent = recent.last().is_some_and(|last| last.content == query);
    if !already_sent {
        messages.push(Message::user(query));
    }

    messages
}
