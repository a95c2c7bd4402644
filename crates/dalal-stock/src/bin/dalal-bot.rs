//! Interactive market assistant CLI
//!
//! # Usage
//!
//! ```bash
//! # Interactive REPL
//! cargo run --bin dalal-bot -p dalal-stock
//!
//! # One-shot mode, prints a JSON envelope
//! cargo run --bin dalal-bot -p dalal-stock -- process "price of reliance"
//! ```

use clap::{Parser, Subcommand};
use dalal_stock::StockBot;
use std::io::{self, BufRead, Write};

#[derive(Parser)]
#[command(name = "dalal-bot", about = "Indian stock market assistant")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Answer a single query and print a JSON envelope
    Process {
        /// The query text
        query: String,
    },
}

fn print_banner() {
    println!(
        r#"
╔══════════════════════════════════════════════════════════════╗
║                     Dalal Market Assistant                   ║
║                                                              ║
║  Ask in natural language:                                    ║
║    "what is the price of Reliance"                           ║
║    "trading signal for tata motors"                          ║
║    "sentiment for infosys"                                   ║
║    "explain market cap"                                      ║
║                                                              ║
║  Type 'quit' or 'exit' to end the conversation.              ║
╚══════════════════════════════════════════════════════════════╝
"#
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dalal_utils::init_tracing();

    let cli = Cli::parse();
    let bot = StockBot::with_defaults()?;

    if let Some(Command::Process { query }) = cli.command {
        let answer = bot.process_query(&query).await;
        let envelope = serde_json::json!({ "text": answer, "type": "text" });
        println!("{envelope}");
        return Ok(());
    }

    print_banner();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("\nYou: ");
        stdout.flush()?;

        let mut input = String::new();
        match stdin.lock().read_line(&mut input) {
            Ok(0) => {
                // EOF
                println!("\nGoodbye!");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error reading input: {e}");
                continue;
            }
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }
        if matches!(input.to_lowercase().as_str(), "quit" | "exit" | "bye") {
            println!("Goodbye!");
            break;
        }

        let answer = bot.process_query(input).await;
        println!("Bot: {answer}");
    }

    Ok(())
}
