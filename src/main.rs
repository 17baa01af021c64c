use olist_analytics::agent::{AgentReply, AnalysisResult, AnalyticsAgent};
use olist_analytics::catalog;
use olist_analytics::execution::engine::cell_text;
use olist_analytics::execution::{SqliteEngine, Table};
use olist_analytics::knowledge::Knowledge;
use olist_analytics::llm::LlmClient;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "olist-analytics")]
#[command(about = "Conversational analytics agent for the Olist e-commerce dataset")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a single analytical question
    Ask {
        /// The question in natural language
        question: String,

        /// Path to the SQLite database with the analytics views
        #[arg(short, long, default_value = "db/olist.db")]
        database: PathBuf,

        /// Path to the knowledge directory (glossary + category enrichment)
        #[arg(short, long, default_value = "knowledge")]
        knowledge_dir: PathBuf,

        /// OpenAI-compatible API key (or set OPENAI_API_KEY env var)
        #[arg(long)]
        api_key: Option<String>,

        /// Also generate an AI explanation of the result
        #[arg(long)]
        explain: bool,
    },
    /// Interactive loop sharing one session memory across questions
    Repl {
        /// Path to the SQLite database with the analytics views
        #[arg(short, long, default_value = "db/olist.db")]
        database: PathBuf,

        /// Path to the knowledge directory (glossary + category enrichment)
        #[arg(short, long, default_value = "knowledge")]
        knowledge_dir: PathBuf,

        /// OpenAI-compatible API key (or set OPENAI_API_KEY env var)
        #[arg(long)]
        api_key: Option<String>,
    },
    /// Verify the database exposes every view the intent catalog references
    Check {
        /// Path to the SQLite database with the analytics views
        #[arg(short, long, default_value = "db/olist.db")]
        database: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::fmt::init();

    let args = Args::parse();

    match args.command {
        Commands::Ask {
            question,
            database,
            knowledge_dir,
            api_key,
            explain,
        } => run_ask(question, database, knowledge_dir, api_key, explain).await,
        Commands::Repl {
            database,
            knowledge_dir,
            api_key,
        } => run_repl(database, knowledge_dir, api_key).await,
        Commands::Check { database } => run_check(database).await,
    }
}

fn build_llm(api_key: Option<String>) -> LlmClient {
    let api_key = api_key
        .or_else(|| std::env::var("OPENAI_API_KEY").ok())
        .unwrap_or_else(|| "lm-studio".to_string());
    LlmClient::new(
        api_key,
        std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "qwen2.5-7b-instruct".to_string()),
        std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "http://localhost:8000/v1".to_string()),
    )
}

async fn run_ask(
    question: String,
    database: PathBuf,
    knowledge_dir: PathBuf,
    api_key: Option<String>,
    explain: bool,
) -> Result<()> {
    let engine = Arc::new(SqliteEngine::open(&database)?);
    let knowledge = Knowledge::load(&knowledge_dir)?;
    let llm = Arc::new(build_llm(api_key));
    let mut agent = AnalyticsAgent::new(engine, knowledge).with_classifier(llm.clone());

    match agent.answer(&question).await {
        AgentReply::Message(text) => println!("{}", text),
        AgentReply::Analysis(result) => {
            let context = agent.explanation_context(&result.table);
            print_analysis(&result, &context);
            if explain {
                let text = llm.explain(&question, &result.table, &context).await;
                println!("\n### 🤖 AI Explanation\n\n{}", text);
            }
        }
    }

    Ok(())
}

async fn run_repl(database: PathBuf, knowledge_dir: PathBuf, api_key: Option<String>) -> Result<()> {
    let engine = Arc::new(SqliteEngine::open(&database)?);
    let knowledge = Knowledge::load(&knowledge_dir)?;
    let llm = Arc::new(build_llm(api_key));
    let mut agent = AnalyticsAgent::new(engine, knowledge).with_classifier(llm);

    println!("🛒 Olist analytics assistant. Ask a question; 'reset' clears memory, 'quit' exits.");
    let stdin = io::stdin();

    loop {
        print!("❓ ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if question.eq_ignore_ascii_case("quit") || question.eq_ignore_ascii_case("exit") {
            break;
        }
        if question.eq_ignore_ascii_case("reset") {
            agent.reset_memory();
            println!("Memory cleared.");
            continue;
        }

        match agent.answer(question).await {
            AgentReply::Message(text) => println!("{}\n", text),
            AgentReply::Analysis(result) => {
                let context = agent.explanation_context(&result.table);
                print_analysis(&result, &context);
                println!();
            }
        }
    }

    Ok(())
}

async fn run_check(database: PathBuf) -> Result<()> {
    let engine = SqliteEngine::open(&database)?;
    let required = catalog::referenced_views();
    let missing = engine.missing_views(&required)?;

    if missing.is_empty() {
        info!("All referenced views present");
        println!(
            "✅ All {} referenced views present in {}",
            required.len(),
            database.display()
        );
        return Ok(());
    }

    println!("⚠️ {} missing view(s) in {}:", missing.len(), database.display());
    for view in &missing {
        println!("  - {}", view);
    }
    anyhow::bail!("database is not fully provisioned")
}

fn print_analysis(result: &AnalysisResult, context: &str) {
    println!("{}\n", result.summary);
    print_table(&result.table);
    if result.table.has_column("category") {
        println!("\n### 📦 About the Categories\n\n{}", context);
    }
    if let Some(insight) = &result.insight {
        println!("\n{}", insight);
    }
}

fn print_table(table: &Table) {
    let rendered: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| row.iter().map(cell_text).collect())
        .collect();

    let mut widths: Vec<usize> = table.columns.iter().map(|c| c.chars().count()).collect();
    for row in &rendered {
        for (index, cell) in row.iter().enumerate() {
            if index < widths.len() {
                widths[index] = widths[index].max(cell.chars().count());
            }
        }
    }

    let header = table
        .columns
        .iter()
        .zip(widths.iter().copied())
        .map(|(name, width)| format!("{:<width$}", name))
        .collect::<Vec<_>>()
        .join("  ");
    println!("{}", header);
    println!(
        "{}",
        widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join("  ")
    );

    for row in &rendered {
        let line = row
            .iter()
            .zip(widths.iter().copied())
            .map(|(cell, width)| format!("{:<width$}", cell))
            .collect::<Vec<_>>()
            .join("  ");
        println!("{}", line.trim_end());
    }
}
