//! Interactive terminal loop
//!
//! Line-oriented: one question per line, answers and errors printed in
//! place, the loop survives failed turns.

use std::io::{self, BufRead, Write};

use anyhow::Result;

use crate::assistant::{Assistant, Turn};

/// Run the interactive loop until quit or EOF
pub async fn run(assistant: &Assistant) -> Result<()> {
    println!(
        "Ask anything about the '{}' table. Type 'quit' to exit.",
        assistant.schema().table
    );
    println!("Model: {}", assistant.model());
    println!();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("askdb> ");
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break; // EOF
        }
        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input == "quit" || input == "exit" {
            break;
        }

        run_turn(assistant, input).await;
    }

    Ok(())
}

/// One full turn, including any interactive data collection
pub async fn run_turn(assistant: &Assistant, question: &str) {
    match assistant.handle(question).await {
        Ok(Turn::Answered(text)) => {
            println!("\n{}\n", text);
        }
        Ok(Turn::NeedsData(translated)) => {
            finish_collection(assistant, &translated.response).await;
        }
        Err(e) => {
            eprintln!("Error: {}", e);
        }
    }
}

async fn finish_collection(assistant: &Assistant, intro: &str) {
    let values = match collect_values(assistant, intro) {
        Ok(Some(values)) => values,
        Ok(None) => {
            eprintln!("Error: all fields are required");
            return;
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            return;
        }
    };

    match assistant.complete_insert(&values).await {
        Ok(text) => println!("\n{}\n", text),
        Err(e) => eprintln!("Error: {}", e),
    }
}

/// Prompt for each insertable column; None when a value is left empty
fn collect_values(assistant: &Assistant, intro: &str) -> io::Result<Option<Vec<String>>> {
    if intro.is_empty() {
        println!("Adding a new record:");
    } else {
        println!("{}", intro);
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut values = Vec::new();

    for column in assistant.schema().insertable_columns() {
        print!("Enter {}: ", column);
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Ok(None); // EOF aborts the collection
        }

        let value = line.trim();
        if value.is_empty() {
            return Ok(None);
        }
        values.push(value.to_string());
    }

    Ok(Some(values))
}
