//! Résumé assistant: a retrieval-augmented chat pipeline that collects facts
//! about a user and renders them into a PDF résumé on request.

pub mod api;
pub mod application;
pub mod domain;
pub mod infrastructure;
