use clap::Parser;
use monshin::prelude::*;
use serde_json::{Value, json};
use std::fs;
use std::io::{self, Write};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Walk a question schema from the terminal, or replay a file of answers against it
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the schema JSON file
    schema_path: String,

    /// Replay `{questionId: value}` answers from this JSON file instead of prompting
    #[arg(short, long)]
    answers: Option<String>,

    /// Write the final flow state to this file as JSON
    #[arg(long)]
    state_out: Option<String>,

    /// Prompt optional fields once instead of skipping them
    #[arg(long)]
    ask_optional: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let load_start = Instant::now();
    let schema_json = fs::read_to_string(&cli.schema_path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to read schema file '{}': {}",
            &cli.schema_path, e
        ))
    });
    let schema = Schema::from_json(&schema_json)
        .unwrap_or_else(|e| exit_with_error(&format!("Schema rejected: {}", e)));
    println!(
        "Loaded schema with {} fields in {:?}",
        schema.index().len(),
        load_start.elapsed()
    );

    let engine = Engine::builder(schema)
        .ask_optional_fields(cli.ask_optional)
        .build();
    let mut state = FlowState::new();

    match &cli.answers {
        Some(path) => run_replay(&engine, &mut state, path),
        None => run_interactive(&engine, &mut state),
    }

    print_summary(&engine, &mut state);

    if let Some(path) = cli.state_out {
        let json = serde_json::to_string_pretty(&state)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize state: {}", e)));
        fs::write(&path, json)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to write '{}': {}", path, e)));
        println!("  -> Wrote flow state to '{}'", path);
    }
}

/// Feeds a whole answer sheet through the engine, as an extraction step would.
fn run_replay(engine: &Engine, state: &mut FlowState, path: &str) {
    let sheet = AnswerSheet::from_file(path).unwrap_or_else(|e| {
        exit_with_error(&format!("Failed to load answers from '{}': {}", path, e))
    });
    println!("\nReplaying {} candidate answers...", sheet.len());

    for outcome in engine.store_candidates(state, sheet.into_candidates()) {
        match outcome.result {
            Ok(stored) => {
                println!(
                    "  [ok]   {} (completed: {})",
                    outcome.question_id,
                    stored.completed_ids.join(", ")
                );
                if let Some(sub_flow) = stored.new_sub_flow {
                    println!("         entered sub-flow {}", sub_flow);
                }
            }
            Err(e) => println!("  [{}] {}", e.code(), e),
        }
    }
}

/// Asks each next question on stdin until the flow completes.
fn run_interactive(engine: &Engine, state: &mut FlowState) {
    println!("--- Monshin Interactive Mode ---");
    println!("(leave an optional answer empty to skip it)");

    while let Some(field) = engine.next_question(state) {
        let value = read_answer(&field);
        match engine.store(state, &field.question_id, value) {
            Ok(outcome) => {
                if let Some(sub_flow) = outcome.new_sub_flow {
                    println!("  -> Entered {}", sub_flow);
                }
                if let Some(sub_flow) = outcome.exited_sub_flow {
                    println!("  -> Finished {}", sub_flow);
                }
            }
            Err(e) => println!("  -> {}", e),
        }
    }
}

/// Collects a value for one prompt. Group fields are asked child by child and
/// submitted together as one object.
fn read_answer(field: &Field) -> Value {
    let label = field.question.as_deref().unwrap_or(&field.question_id);
    if field.is_group() && !field.children().is_empty() {
        println!("\n{} ({})", label, field.field_type());
        let mut object = serde_json::Map::new();
        for child in field.children() {
            let value = read_answer(child);
            if !value.is_null() {
                object.insert(child.question_id.clone(), value);
            }
        }
        return Value::Object(object);
    }
    if field.holds_attachments() {
        let input = prompt_for_input(&format!("{} (comma-separated references)", label), None);
        let refs: Vec<Value> = input
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| json!(s))
            .collect();
        return if refs.is_empty() { Value::Null } else { Value::Array(refs) };
    }
    if let FieldKind::Choice { options, .. } = &field.kind {
        for option in options {
            println!("    - {} ({})", option.label, option.value);
        }
    }
    text_or_null(prompt_for_input(label, field.placeholder.as_deref()))
}

fn text_or_null(input: String) -> Value {
    if input.is_empty() { Value::Null } else { json!(input) }
}

fn print_summary(engine: &Engine, state: &mut FlowState) {
    let progress = engine.progress(state);
    println!("\n--- Progress ---");
    println!(
        "Completed {} of {} reachable fields ({}%)",
        progress.completed,
        progress.total,
        progress.percent()
    );

    match engine.next_turn(state) {
        Turn::Ask { field } => {
            println!("Next question: {} ({})", field.question_id, field.field_type())
        }
        Turn::Complete { completion } => {
            let profile = engine.profile(state);
            match completion {
                Some(completion) => println!("Complete: {}", completion.render(&profile)),
                None => println!("Complete."),
            }
        }
    }

    let profile = Value::Object(engine.profile(state));
    println!("\n--- Profile ---");
    println!(
        "{}",
        serde_json::to_string_pretty(&profile).unwrap_or_else(|_| profile.to_string())
    );
}

/// A helper function to prompt the user and read a line of input.
fn prompt_for_input(prompt_text: &str, placeholder: Option<&str>) -> String {
    let mut line = String::new();
    let hint = placeholder.map_or(String::new(), |p| format!(" [{}]", p));

    print!("> {}{}: ", prompt_text, hint);
    io::stdout().flush().unwrap();

    let read = io::stdin()
        .read_line(&mut line)
        .expect("Failed to read line");
    if read == 0 {
        exit_with_error("Input closed before the flow was complete");
    }
    line.trim().to_string()
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
