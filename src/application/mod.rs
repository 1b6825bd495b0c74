//! Application layer - Use cases and orchestration.
//!
//! Services here depend on domain ports (traits) rather than concrete
//! implementations, and are wired together by the binary.

pub mod services;

pub use services::{
    build_messages, is_resume_related, GeneratedResume, PipelineSettings, QueryPipeline,
    RagService, ResumeService, ResumeSettings,
};
