use std::env;
use std::io::{self, BufRead, Write};
use std::path::Path;

use ragdb_cli::args::{self, Cli, Command};
use ragdb_cli::{logging, render};
use ragdb_core::config::Config;
use ragdb_rag::RagSystem;

fn main() -> anyhow::Result<()> {
    let mut argv = env::args();
    let prog = argv.next().unwrap_or_else(|| "ragdb".to_string());
    if env::args().skip(1).any(|a| a == "-h" || a == "--help") {
        println!("{}", args::usage(&prog));
        return Ok(());
    }
    let cli = match args::parse(argv) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("{}\n\n{}", e, args::usage(&prog));
            std::process::exit(2);
        }
    };
    logging::init(cli.verbosity);
    tracing::debug!(?cli, "parsed arguments");

    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {}", e);
        e
    })?;
    let settings = config.settings()?;
    let base = env::current_dir()?;
    let rag = RagSystem::from_settings(&settings, &base)?;
    tracing::debug!(db_path = %rag.engine().db_path().display(), "ragdb ready");

    let ok = run(&rag, &cli)?;
    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

/// Returns false when the command ran but reported a failure.
fn run(rag: &RagSystem, cli: &Cli) -> anyhow::Result<bool> {
    match &cli.command {
        Command::Ingest { paths } => {
            let mut ok = true;
            for path in paths {
                ok &= ingest(rag, path, cli.json)?;
            }
            Ok(ok)
        }
        Command::Query { question, k } => {
            let outcome = rag.query(question, *k);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                println!("{}", render::query_outcome(&outcome));
            }
            Ok(outcome.is_success())
        }
        Command::Stats => {
            let stats = rag.stats();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("{}", render::stats(&stats));
            }
            Ok(stats.vector_store.is_consistent())
        }
        Command::Clear { yes } => {
            if !*yes && !confirm("Really clear the vector database? (y/N): ")? {
                println!("❌ Clear cancelled.");
                return Ok(true);
            }
            rag.clear_database()?;
            println!("✅ Vector database cleared");
            Ok(true)
        }
        Command::Interactive => {
            interactive(rag)?;
            Ok(true)
        }
    }
}

fn ingest(rag: &RagSystem, path: &Path, json: bool) -> anyhow::Result<bool> {
    if path.is_dir() {
        let report = rag.add_directory(path);
        if json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            println!("{}", render::directory_report(&report));
        }
        Ok(report.failed() == 0)
    } else {
        let outcome = rag.add_document(path);
        if json {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        } else {
            println!("{}", render::add_outcome(&outcome));
        }
        Ok(outcome.is_success())
    }
}

fn prompt_line(prompt: &str) -> io::Result<Option<String>> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn confirm(prompt: &str) -> io::Result<bool> {
    Ok(prompt_line(prompt)?.is_some_and(|a| a.eq_ignore_ascii_case("y")))
}

fn interactive(rag: &RagSystem) -> anyhow::Result<()> {
    println!("=== ragdb ===");
    println!("1. Add document");
    println!("2. Ask a question");
    println!("3. System stats");
    println!("4. Clear database");
    println!("5. Quit");

    loop {
        let Some(choice) = prompt_line("\nChoose (1-5): ")? else { break };
        match choice.as_str() {
            "1" => {
                let Some(path) = prompt_line("Document path: ")? else { break };
                let path = Path::new(&path);
                if path.exists() {
                    ingest(rag, path, false)?;
                } else {
                    println!("❌ File does not exist.");
                }
            }
            "2" => {
                let Some(question) = prompt_line("Question: ")? else { break };
                if question.is_empty() {
                    println!("❌ Please enter a question.");
                    continue;
                }
                println!("🤔 Generating answer...");
                println!("{}", render::query_outcome(&rag.query(&question, None)));
            }
            "3" => println!("\n{}", render::stats(&rag.stats())),
            "4" => {
                if confirm("Really clear the vector database? (y/N): ")? {
                    match rag.clear_database() {
                        Ok(()) => println!("✅ Vector database cleared"),
                        Err(e) => println!("❌ Clear failed: {}", e),
                    }
                } else {
                    println!("❌ Clear cancelled.");
                }
            }
            "5" | "q" | "quit" => break,
            _ => println!("❌ Invalid choice. Pick 1-5."),
        }
    }
    println!("👋 Bye.");
    Ok(())
}
