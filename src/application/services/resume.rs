use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::application::QueryPipeline;
use crate::domain::{
    compose,
    layout::PageSpec,
    ports::{ConversationStore, DocumentWriter},
    extract, DomainError, ResumeRecord,
};

/// Words that make a chat message worth a "generate your résumé" hint.
const RESUME_KEYWORDS: &[&str] = &[
    "resume",
    "cv",
    "experience",
    "job",
    "work",
    "skill",
    "education",
    "qualification",
    "degree",
    "university",
    "college",
    "project",
];

pub fn is_resume_related(query: &str) -> bool {
    let lower = query.to_lowercase();
    RESUME_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// `ATS_Resume_{name}.pdf` with whitespace replaced by underscores.
pub fn resume_filename(name: &str) -> String {
    let safe: String = name
        .trim()
        .chars()
        .filter(|c| !matches!(c, '"' | '/' | '\\') && !c.is_control())
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();
    format!("ATS_Resume_{safe}.pdf")
}

#[derive(Debug, Clone)]
pub struct ResumeSettings {
    pub output_dir: PathBuf,
    pub cleanup_delay: Duration,
    pub page: PageSpec,
}

impl Default for ResumeSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output/resume_pdfs"),
            cleanup_delay: Duration::from_secs(5),
            page: PageSpec::a4(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeneratedResume {
    pub record: ResumeRecord,
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

pub struct ResumeService {
    pipeline: Arc<QueryPipeline>,
    conversations: Arc<dyn ConversationStore>,
    writer: Arc<dyn DocumentWriter>,
    settings: ResumeSettings,
}

impl ResumeService {
    pub fn new(
        pipeline: Arc<QueryPipeline>,
        conversations: Arc<dyn ConversationStore>,
        writer: Arc<dyn DocumentWriter>,
        settings: ResumeSettings,
    ) -> Self {
        Self {
            pipeline,
            conversations,
            writer,
            settings,
        }
    }

    /// Extracts a résumé from the session transcript and renders it.
    ///
    /// A non-empty `query` is answered first so it becomes part of the
    /// transcript; a failure there is logged and does not stop generation.
    #[instrument(skip(self, query))]
    pub async fn generate(
        &self,
        session_id: &str,
        query: Option<&str>,
    ) -> Result<GeneratedResume, DomainError> {
        if session_id.trim().is_empty() {
            return Err(DomainError::validation("session_id is required"));
        }

        if let Some(query) = query.map(str::trim).filter(|q| !q.is_empty()) {
            if let Err(e) = self.pipeline.answer(session_id, query).await {
                warn!(error = %e, "failed to process query before resume generation");
            }
        }

        let transcript = self.conversations.list_turns(session_id).await?;
        if transcript.is_empty() {
            return Err(DomainError::validation(
                "No chat history found for this session",
            ));
        }

        let record = extract(&transcript);
        let layout = compose(&record, self.settings.page);
        let bytes = self.writer.write(&layout)?;
        info!(
            turns = transcript.len(),
            skills = record.skills.len(),
            size = bytes.len(),
            "resume rendered"
        );

        let path = self.persist(&bytes).await?;
        self.schedule_cleanup(path);

        Ok(GeneratedResume {
            filename: resume_filename(&record.basic_info.name),
            content_type: self.writer.content_type(),
            record,
            bytes,
        })
    }

    /// An output directory that cannot be created or written is a render failure.
    async fn persist(&self, bytes: &[u8]) -> Result<PathBuf, DomainError> {
        let dir = &self.settings.output_dir;
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| DomainError::render(format!("create {}: {e}", dir.display())))?;

        let path = dir.join(format!("resume_{}.pdf", Uuid::new_v4()));
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| DomainError::render(format!("write {}: {e}", path.display())))?;

        debug!(path = %path.display(), "resume written");
        Ok(path)
    }

    fn schedule_cleanup(&self, path: PathBuf) {
        let delay = self.settings.cleanup_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            remove_output(&path).await;
        });
    }
}

async fn remove_output(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!(path = %path.display(), "resume file removed"),
        Err(e) => warn!(error = %e, path = %path.display(), "failed to remove resume file"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{PipelineSettings, RagService};
    use crate::domain::{
        layout::PageLayout, ports::CompletionService, ChatTurn, Embedding, Message,
    };
    use crate::infrastructure::{HashedEmbedding, InMemoryContextStore, InMemoryConversationStore};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct EchoCompletion;

    #[async_trait]
    impl CompletionService for EchoCompletion {
        async fn complete(&self, messages: &[Message]) -> Result<String, DomainError> {
            Ok(format!("noted: {}", messages.len()))
        }
    }

    struct StubWriter;

    impl DocumentWriter for StubWriter {
        fn write(&self, layout: &PageLayout) -> Result<Vec<u8>, DomainError> {
            Ok(layout.title.clone().into_bytes())
        }

        fn content_type(&self) -> &'static str {
            "application/pdf"
        }
    }

    #[derive(Default)]
    struct CountingStore {
        inner: InMemoryConversationStore,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ConversationStore for CountingStore {
        async fn save_turn(&self, turn: ChatTurn) -> Result<ChatTurn, DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.save_turn(turn).await
        }

        async fn list_turns(&self, session_id: &str) -> Result<Vec<ChatTurn>, DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.list_turns(session_id).await
        }
    }

    fn service(store: Arc<CountingStore>, output_dir: &Path) -> ResumeService {
        let embedding = Arc::new(HashedEmbedding::new(32));
        let rag = Arc::new(RagService::new(
            embedding.clone(),
            Arc::new(InMemoryContextStore::new()),
            5,
        ));
        let pipeline = Arc::new(QueryPipeline::new(
            embedding,
            store.clone(),
            rag,
            Arc::new(EchoCompletion),
            PipelineSettings::default(),
        ));
        ResumeService::new(
            pipeline,
            store,
            Arc::new(StubWriter),
            ResumeSettings {
                output_dir: output_dir.to_path_buf(),
                cleanup_delay: Duration::from_millis(50),
                page: PageSpec::a4(),
            },
        )
    }

    #[test]
    fn test_resume_keywords_case_insensitive() {
        assert!(is_resume_related("Here is my CV"));
        assert!(is_resume_related("I worked on a PROJECT"));
        assert!(!is_resume_related("What's the weather like?"));
    }

    #[test]
    fn test_filename_replaces_spaces() {
        assert_eq!(resume_filename("Jane Smith"), "ATS_Resume_Jane_Smith.pdf");
        assert_eq!(resume_filename("Job Applicant"), "ATS_Resume_Job_Applicant.pdf");
        assert_eq!(resume_filename("A \"B\""), "ATS_Resume_A_B.pdf");
    }

    #[tokio::test]
    async fn test_blank_session_rejected_before_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(CountingStore::default());
        let svc = service(store.clone(), dir.path());

        let err = svc.generate("  ", Some("My name is Jane.")).await.unwrap_err();

        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_transcript_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(Arc::new(CountingStore::default()), dir.path());

        let err = svc.generate("unknown", None).await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "Validation error: No chat history found for this session"
        );
    }

    #[tokio::test]
    async fn test_generate_from_transcript() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(CountingStore::default());
        store
            .save_turn(ChatTurn::user(
                "s1",
                "My name is Jane Smith. I know Go, React, and Docker.",
                Embedding::default(),
            ))
            .await
            .unwrap();
        let svc = service(store, dir.path());

        let resume = svc.generate("s1", None).await.unwrap();

        assert_eq!(resume.filename, "ATS_Resume_Jane_Smith.pdf");
        assert_eq!(resume.content_type, "application/pdf");
        assert_eq!(resume.bytes, b"Resume - Jane Smith".to_vec());
        assert_eq!(resume.record.skill_names(), vec!["Go", "React", "Docker"]);
    }

    #[tokio::test]
    async fn test_query_is_added_to_transcript() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(CountingStore::default());
        let svc = service(store.clone(), dir.path());

        let resume = svc
            .generate("s2", Some("My email is ada@example.com."))
            .await
            .unwrap();

        assert_eq!(resume.record.basic_info.email, "ada@example.com");
        assert_eq!(store.inner.list_turns("s2").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_unwritable_output_dir_is_render_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"not a directory").unwrap();
        let store = Arc::new(CountingStore::default());
        store
            .save_turn(ChatTurn::user("s4", "My name is Bo.", Embedding::default()))
            .await
            .unwrap();
        let svc = service(store, &blocker.join("sub"));

        let err = svc.generate("s4", None).await.unwrap_err();

        assert!(matches!(err, DomainError::Render(_)));
        assert_eq!(err.code(), "RENDER_ERROR");
    }

    #[tokio::test]
    async fn test_output_file_removed_after_delay() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(CountingStore::default());
        store
            .save_turn(ChatTurn::user("s3", "My name is Bo.", Embedding::default()))
            .await
            .unwrap();
        let svc = service(store, dir.path());

        svc.generate("s3", None).await.unwrap();
        let count = || std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(count(), 1);

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(count(), 0);
    }
}
