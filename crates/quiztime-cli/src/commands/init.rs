//! The `quiztime init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create quiztime.toml
    if std::path::Path::new("quiztime.toml").exists() {
        println!("quiztime.toml already exists, skipping.");
    } else {
        std::fs::write("quiztime.toml", SAMPLE_CONFIG)?;
        println!("Created quiztime.toml");
    }

    // Create example catalog
    std::fs::create_dir_all("questions")?;
    let example_path = std::path::Path::new("questions/example.json");
    if example_path.exists() {
        println!("questions/example.json already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_CATALOG)?;
        println!("Created questions/example.json");
    }

    println!("\nNext steps:");
    println!("  1. Set QUIZTIME_GEMINI_KEY or run `quiztime set-key` to enable AI grading");
    println!("  2. Run: quiztime validate --catalog questions/example.json");
    println!("  3. Run: quiztime play --catalog questions/example.json --mode challenge-5");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quiztime configuration

# catalog = "questions/example.json"
# data_dir = "/home/you/.local/share/quiztime"
default_mode = "continuous"
ai_grading = false

[gemini]
api_key = "${GEMINI_API_KEY}"
model = "gemini-2.5-flash-lite"
timeout_secs = 30
"#;

const EXAMPLE_CATALOG: &str = r#"{
  "questions": [
    {
      "id": 1,
      "experienceLevel": 1,
      "question": "Which command creates a new Cargo package?",
      "correctAnswers": ["cargo new", "cargo init"],
      "type": "regex",
      "tags": ["rust", "tooling"]
    },
    {
      "id": 2,
      "experienceLevel": 2,
      "question": "Which keyword makes a variable binding mutable in Rust?",
      "correctAnswers": ["mut"],
      "type": "regex",
      "tags": ["rust"]
    },
    {
      "id": 3,
      "experienceLevel": 3,
      "question": "Which HTTP status code means Not Found? (200 / 404 / 500)",
      "correctAnswers": ["404"],
      "type": "multiple",
      "tags": ["web"]
    }
  ]
}
"#;
