mod pipeline;
mod rag;
mod resume;

pub use pipeline::{build_messages, build_preamble, PipelineSettings, QueryPipeline};
pub use rag::RagService;
pub use resume::{is_resume_related, resume_filename, GeneratedResume, ResumeService, ResumeSettings};
