use anyhow::{anyhow, bail, Result};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ingest { paths: Vec<PathBuf> },
    Query { question: String, k: Option<usize> },
    Stats,
    Clear { yes: bool },
    Interactive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cli {
    pub command: Command,
    pub json: bool,
    pub verbosity: u8,
}

pub fn usage(prog: &str) -> String {
    format!(
        "Usage: {prog} [--json] [-v] <command>\n\n\
         Commands:\n  \
           ingest <path>...          add files or directories (txt, md, pdf)\n  \
           query \"<question>\" [--k N]  answer a question from the stored documents\n  \
           stats                     show store counts\n  \
           clear [--yes]             delete every stored chunk\n\n\
         Without a command an interactive menu is started."
    )
}

/// Parse everything after the program name.
pub fn parse<I: IntoIterator<Item = String>>(args: I) -> Result<Cli> {
    let mut json = false;
    let mut verbosity = 0u8;
    let mut yes = false;
    let mut k = None;
    let mut positional = Vec::new();

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--json" => json = true,
            "-v" | "--verbose" => verbosity = verbosity.saturating_add(1),
            "-vv" => verbosity = verbosity.saturating_add(2),
            "--yes" | "-y" => yes = true,
            "--k" | "-k" => {
                let value = iter.next().ok_or_else(|| anyhow!("--k needs a value"))?;
                k = Some(parse_k(&value)?);
            }
            s if s.starts_with("--k=") => k = Some(parse_k(&s["--k=".len()..])?),
            s if s.starts_with('-') && s.len() > 1 => bail!("Unknown option: {}", s),
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let command = match positional.next().as_deref() {
        None => Command::Interactive,
        Some("ingest") => {
            let paths: Vec<PathBuf> = positional.by_ref().map(PathBuf::from).collect();
            if paths.is_empty() {
                bail!("ingest needs at least one path");
            }
            Command::Ingest { paths }
        }
        Some("query") => {
            let question = positional.by_ref().collect::<Vec<_>>().join(" ");
            if question.trim().is_empty() {
                bail!("query needs a question");
            }
            Command::Query { question, k }
        }
        Some("stats") => Command::Stats,
        Some("clear") => Command::Clear { yes },
        Some(other) => bail!("Unknown command: {}", other),
    };
    if let Some(extra) = positional.next() {
        bail!("Unexpected argument: {}", extra);
    }
    Ok(Cli { command, json, verbosity })
}

fn parse_k(value: &str) -> Result<usize> {
    match value.parse::<usize>() {
        Ok(k) if k > 0 => Ok(k),
        _ => bail!("--k must be a positive integer, got '{}'", value),
    }
}
