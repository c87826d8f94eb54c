//! careerpath-core: RIASEC assessment model, scoring, and quiz sessions.
//!
//! This crate holds the data model, the question bank loader, the pure
//! scoring and matching functions, and the session state machine that the
//! rest of careerpath builds on. Remote collaborators are reached only
//! through the traits in [`traits`].

pub mod catalog;
pub mod error;
pub mod matcher;
pub mod model;
pub mod parser;
pub mod report;
pub mod scoring;
pub mod session;
pub mod traits;
