//! The `careerpath validate` command.

use std::path::PathBuf;

use anyhow::Result;

use careerpath_core::parser::{lint_questions, parse_question_set};

pub fn execute(bank_path: PathBuf) -> Result<()> {
    let set = parse_question_set(&bank_path)?;

    println!("Question bank: {} ({} questions)", set.name, set.questions.len());

    let warnings = lint_questions(&set.questions);
    for w in &warnings {
        let prefix = w
            .question_id
            .as_ref()
            .map(|id| format!("  [{id}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("Question bank valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
