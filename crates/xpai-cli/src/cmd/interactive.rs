use crate::output::print_resources;
use crate::session::Session;
use std::io::{BufRead, Write};
use xpai_core::analysis::{health_score, HEALTHY_THRESHOLD};
use xpai_core::resource::ResourceRecord;
use xpai_core::suggest::categories;

const PROMPT: &str = "crossplane-ai> ";

/// Score at or above which `health` reports "needs attention" rather than
/// "critical".
const ATTENTION_THRESHOLD: u32 = 60;

enum Flow {
    Continue,
    Exit,
}

pub fn run(session: &mut Session, banner: bool, analyze: bool) -> anyhow::Result<()> {
    if banner {
        print_banner(session);
    }
    if analyze {
        report(handle_line(session, "health"));
    }

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("{PROMPT}");
        std::io::stdout().flush()?;

        let Some(line) = lines.next() else {
            println!();
            println!("Goodbye!");
            return Ok(());
        };
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match handle_line(session, line) {
            Ok(Flow::Exit) => {
                println!("Goodbye!");
                return Ok(());
            }
            other => report(other),
        }
    }
}

/// Errors end the current line only.
fn report(result: anyhow::Result<Flow>) {
    if let Err(e) = result {
        eprintln!("error: {e:#}");
    }
}

fn all_records(session: &mut Session) -> anyhow::Result<Vec<ResourceRecord>> {
    let filter = session.filter(None, None, None);
    session.records(&filter)
}

fn handle_line(session: &mut Session, line: &str) -> anyhow::Result<Flow> {
    let mut words = line.split_whitespace();
    let command = words.next().unwrap_or_default().to_ascii_lowercase();

    match command.as_str() {
        "exit" | "quit" | "q" => return Ok(Flow::Exit),
        "help" | "?" => print_help(),
        "analyze" => {
            let records = all_records(session)?;
            let analysis = session.block_on(session.responder().analyze(&records, true));
            super::analyze::render_analysis(&records, &analysis, false, session.color);
        }
        "status" => {
            let records = all_records(session)?;
            if records.is_empty() {
                println!("No Crossplane resources found.");
            } else {
                print_resources(&records, session.color);
            }
        }
        "health" => {
            let records = all_records(session)?;
            let healthy = records.iter().filter(|r| r.status.is_ready()).count();
            let score = health_score(healthy, records.len());
            println!(
                "Health score: {score}/100 ({healthy}/{} ready) - {}",
                records.len(),
                verdict(score, records.is_empty())
            );
        }
        "suggest" => {
            let category = words.next().unwrap_or("general").to_string();
            let records = all_records(session)?;
            let limit = session.config.analysis.max_suggestions;
            let mut suggestions = session.block_on(session.responder().suggest(&category, &records));
            suggestions.truncate(limit);
            super::suggest::render_suggestions(&category, &suggestions, false);
        }
        _ => {
            let records = all_records(session)?;
            let answer = session.block_on(session.responder().answer(line, &records));
            println!("{}", answer.text);
        }
    }
    Ok(Flow::Continue)
}

fn verdict(score: u32, empty: bool) -> &'static str {
    if empty {
        "no resources found"
    } else if score >= HEALTHY_THRESHOLD {
        "healthy"
    } else if score >= ATTENTION_THRESHOLD {
        "needs attention"
    } else {
        "critical"
    }
}

fn print_banner(session: &Session) {
    println!("crossplane-ai {}", env!("CARGO_PKG_VERSION"));
    println!("Ask questions about your Crossplane resources. Type 'help' for commands.");
    if session.mock {
        println!("(mock mode: using the sample cluster)");
    }
    println!();
}

fn print_help() {
    println!("Commands:");
    println!("  status            list resources");
    println!("  health            health score");
    println!("  analyze           full analysis with recommendations");
    println!("  suggest [type]    suggestions ({})", categories().join(", "));
    println!("  help, ?           this help");
    println!("  exit, quit, q     leave");
    println!();
    println!("Anything else is answered as a question, e.g. 'what resources do I have?'");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verdict_bands() {
        assert_eq!(verdict(91, false), "healthy");
        assert_eq!(verdict(80, false), "healthy");
        assert_eq!(verdict(79, false), "needs attention");
        assert_eq!(verdict(60, false), "needs attention");
        assert_eq!(verdict(59, false), "critical");
        assert_eq!(verdict(0, true), "no resources found");
    }
}
