//! Table rendering shared by `take` and `score`.

use comfy_table::{Cell, Table};

use careerpath_core::matcher::{dominant_dimensions, DOMINANT_COUNT};
use careerpath_core::model::{AptitudeVector, CareerRecommendation, PersonalityProfile};
use careerpath_core::report::QuizResult;

/// How many careers to show.
pub const TOP_CAREERS: usize = 5;

pub fn recommendations_table(recommendations: &[CareerRecommendation]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["#", "Career", "Type", "Match"]);
    for (rank, rec) in recommendations.iter().take(TOP_CAREERS).enumerate() {
        table.add_row(vec![
            Cell::new(rank + 1),
            Cell::new(&rec.career),
            Cell::new(&rec.type_name),
            Cell::new(format!("{:.1}%", rec.match_percentage)),
        ]);
    }
    table
}

pub fn profile_table(profile: &PersonalityProfile) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Type", "Score", "Share", "Description"]);
    for (dimension, entry) in profile.top_insights() {
        table.add_row(vec![
            Cell::new(format!("{} ({dimension})", entry.name)),
            Cell::new(entry.score),
            Cell::new(format!("{:.1}%", entry.percentage)),
            Cell::new(&entry.description),
        ]);
    }
    table
}

pub fn dominant_code(aptitude: &AptitudeVector) -> String {
    dominant_dimensions(aptitude, DOMINANT_COUNT)
        .iter()
        .map(|d| d.letter())
        .collect()
}

pub fn print_scores(
    aptitude: &AptitudeVector,
    recommendations: &[CareerRecommendation],
    profile: &PersonalityProfile,
) {
    println!("Aptitude: {aptitude}");
    println!("Holland code: {}", dominant_code(aptitude));
    println!("\nTop careers\n{}", recommendations_table(recommendations));
    if profile.top_insights().is_empty() {
        println!("\nNo personality insights: no dimension reached 5% of the total score.");
    } else {
        println!("\nPersonality profile\n{}", profile_table(profile));
    }
}

pub fn print_result(result: &QuizResult) {
    print_scores(
        &result.aptitude,
        &result.recommendations,
        &result.personality_profile,
    );
    println!(
        "\nAttempt {} completed at {} ({} answers, scored {})",
        result.id,
        result.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
        result.answers.len(),
        result.source
    );
}
