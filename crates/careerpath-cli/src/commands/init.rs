//! The `careerpath init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("careerpath.toml").exists() {
        println!("careerpath.toml already exists, skipping.");
    } else {
        std::fs::write("careerpath.toml", SAMPLE_CONFIG)?;
        println!("Created careerpath.toml");
    }

    std::fs::create_dir_all("question-banks")?;
    let bank_path = std::path::Path::new("question-banks/example.toml");
    if bank_path.exists() {
        println!("question-banks/example.toml already exists, skipping.");
    } else {
        std::fs::write(bank_path, EXAMPLE_BANK)?;
        println!("Created question-banks/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit careerpath.toml with your service URL and user id");
    println!("  2. Run: careerpath validate --bank question-banks/example.toml");
    println!("  3. Run: careerpath take --bank question-banks/example.toml");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# careerpath configuration

user_id = "${USER}"
remote_timeout_secs = 30
notify_timeout_secs = 5
# catalog_path = "careers.toml"

[question_bank]
type = "file"
path = "question-banks/example.toml"

# Or fetch questions from the backend:
# [question_bank]
# type = "http"
# base_url = "http://localhost:3001"

[service]
base_url = "http://localhost:3001"
# api_key = "${CAREERPATH_API_KEY}"
timeout_secs = 30

[achievements]
# base_url = "http://localhost:3001"
timeout_secs = 5
"#;

const EXAMPLE_BANK: &str = r#"[question_bank]
id = "example"
name = "Example Question Bank"
description = "A short question bank to get started"

[[questions]]
id = "hands_on"
text = "I enjoy working with tools and machines"
category = "psychometric"

[[questions.options]]
id = "hands_on_yes"
text = "Agree"
scores = { R = 3, C = 1 }

[[questions.options]]
id = "hands_on_no"
text = "Disagree"
scores = { S = 1, A = 1 }

[[questions]]
id = "puzzles"
text = "I like solving complex puzzles"
category = "aptitude"

[[questions.options]]
id = "puzzles_yes"
text = "Agree"
scores = { I = 3 }

[[questions.options]]
id = "puzzles_no"
text = "Disagree"
scores = { E = 2 }
"#;
