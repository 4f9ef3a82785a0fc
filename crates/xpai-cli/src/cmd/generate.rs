use crate::session::Session;
use anyhow::Context;
use xpai_core::manifest;
use xpai_core::types::OutputFormat;

pub fn run(session: &Session, description: &str, provider: &str) -> anyhow::Result<()> {
    let provider = manifest::resolve_provider(provider);
    let yaml = session.block_on(session.responder().generate_manifest(description, &provider));

    match session.output {
        OutputFormat::Json => {
            let json = manifest::to_json(&yaml).context("generated manifest is not valid YAML")?;
            println!("{json}");
        }
        OutputFormat::Yaml | OutputFormat::Table => {
            print!("{yaml}");
            if !yaml.ends_with('\n') {
                println!();
            }
        }
    }
    Ok(())
}
