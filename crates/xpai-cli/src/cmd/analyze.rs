use crate::output::{print_resources, print_structured};
use crate::session::Session;
use owo_colors::OwoColorize;
use xpai_core::analysis::HEALTHY_THRESHOLD;
use xpai_core::discovery::ResourceFilter;
use xpai_core::resource::ResourceRecord;
use xpai_core::router::Analysis;
use xpai_core::types::{OutputFormat, Severity};

pub fn run(
    session: &mut Session,
    filter: &ResourceFilter,
    health_check: bool,
    summary: bool,
) -> anyhow::Result<()> {
    let records = session.records(filter)?;
    if records.is_empty() && !filter.is_empty() && session.output == OutputFormat::Table {
        println!("No Crossplane resources found matching the criteria.");
        println!("Please ensure Crossplane is installed and you have created some resources.");
        return Ok(());
    }

    let analysis = session.block_on(session.responder().analyze(&records, health_check));

    if summary {
        let top: Vec<&str> = top_recommendations(&analysis).collect();
        let value = serde_json::json!({
            "total_count": analysis.result.total_count,
            "healthy_count": analysis.result.healthy_count,
            "issue_count": analysis.result.issue_count,
            "health_score": analysis.result.health_score,
            "recommendation_count": analysis.result.recommendations.len(),
            "top_recommendations": top,
        });
        if !print_structured(session.output, &value)? {
            print_summary(&analysis, session.color);
        }
        return Ok(());
    }

    if !print_structured(session.output, &analysis)? {
        render_analysis(&records, &analysis, session.config.analysis.detailed, session.color);
    }
    Ok(())
}

/// Titles shown by `--summary`.
const SUMMARY_RECOMMENDATIONS: usize = 3;

fn top_recommendations(analysis: &Analysis) -> impl Iterator<Item = &str> {
    analysis
        .result
        .recommendations
        .iter()
        .take(SUMMARY_RECOMMENDATIONS)
        .map(|r| r.title.as_str())
}

fn print_summary(analysis: &Analysis, color: bool) {
    print_counts(analysis, color);
    println!("Recommendations: {}", analysis.result.recommendations.len());
    let mut top = top_recommendations(analysis).peekable();
    if top.peek().is_some() {
        println!();
        println!("Top recommendations:");
        for title in top {
            println!("  - {title}");
        }
    }
}

fn print_counts(analysis: &Analysis, color: bool) {
    let r = &analysis.result;
    let score = format!("{}/100", r.health_score);
    let score = if !color || r.total_count == 0 {
        score
    } else if r.health_score >= HEALTHY_THRESHOLD {
        score.green().to_string()
    } else {
        score.red().to_string()
    };
    println!(
        "Resources: {}  Healthy: {}  Issues: {}  Health score: {}",
        r.total_count, r.healthy_count, r.issue_count, score
    );
}

/// Table-mode report. The resource listing is printed only when `detailed`.
pub fn render_analysis(records: &[ResourceRecord], analysis: &Analysis, detailed: bool, color: bool) {
    println!("Crossplane Resource Analysis");
    println!();
    print_counts(analysis, color);

    if detailed && !records.is_empty() {
        println!();
        print_resources(records, color);
    }

    let r = &analysis.result;
    if !r.issues.is_empty() {
        println!();
        println!("Issues:");
        for issue in &r.issues {
            let tag = format!("[{}]", issue.severity);
            let tag = match (color, issue.severity) {
                (false, _) => tag,
                (true, Severity::Critical) => tag.red().to_string(),
                (true, Severity::Warning) => tag.yellow().to_string(),
                (true, Severity::Info) => tag.cyan().to_string(),
            };
            println!("  {tag} {}", issue.description);
            println!("      {}", issue.suggested_resolution);
        }
    }

    if !r.recommendations.is_empty() {
        println!();
        println!("Recommendations:");
        for rec in &r.recommendations {
            println!("  [{}] {}: {}", rec.priority, rec.title, rec.description);
            if let Some(impact) = &rec.impact {
                println!("      Impact: {impact}");
            }
        }
    }

    if let Some(narrative) = &analysis.narrative {
        println!();
        println!("Analysis:");
        println!("{}", narrative.trim_end());
    }
}
