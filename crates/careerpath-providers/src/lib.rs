//! careerpath-providers: remote collaborators and configuration.
//!
//! Implements the question bank, recommendation service, and achievement
//! notifier traits over HTTP, plus in-memory mocks and the TOML
//! configuration that wires them together.

pub mod achievements;
pub mod config;
pub mod error;
pub mod mock;
pub mod questions;
pub mod recommendations;

pub use config::{
    create_notifier, create_question_bank, create_recommendation_service, load_config,
    load_config_from, AchievementsConfig, CareerPathConfig, QuestionBankConfig, ServiceConfig,
};
