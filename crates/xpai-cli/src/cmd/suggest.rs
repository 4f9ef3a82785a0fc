use crate::output::print_structured;
use crate::session::Session;
use xpai_core::suggest::{resolve_category, Suggestion};

pub fn run(
    session: &mut Session,
    category: &str,
    provider: Option<String>,
    detailed: bool,
    limit: usize,
) -> anyhow::Result<()> {
    let filter = session.filter(None, provider, None);
    let records = session.records(&filter)?;
    let limit = limit.min(session.config.analysis.max_suggestions);

    let mut suggestions = session.block_on(session.responder().suggest(category, &records));
    suggestions.truncate(limit);
    tracing::debug!(category, count = suggestions.len(), "suggestions ready");

    if !print_structured(session.output, &suggestions)? {
        render_suggestions(category, &suggestions, detailed);
    }
    Ok(())
}

pub fn render_suggestions(category: &str, suggestions: &[Suggestion], detailed: bool) {
    println!("Suggestions ({}):", resolve_category(category));
    if suggestions.is_empty() {
        println!("  none");
        return;
    }
    for (i, s) in suggestions.iter().enumerate() {
        println!();
        println!("{}. {} [{}]", i + 1, s.title, s.priority);
        println!("   {}", s.description);
        if detailed {
            if let Some(category) = &s.category {
                println!("   Category: {category}");
            }
            if let Some(example) = &s.example {
                println!("   Example:");
                for line in example.lines() {
                    println!("     {line}");
                }
            }
        }
    }
}
