use crate::output::{print_structured, print_table};
use anyhow::Context;
use std::path::Path;
use xpai_core::sample::example_manifests;
use xpai_core::types::OutputFormat;

pub fn run(dir: &Path, list: bool, output: OutputFormat) -> anyhow::Result<()> {
    let examples = example_manifests();

    if list {
        let value: Vec<_> = examples
            .iter()
            .map(|e| {
                serde_json::json!({
                    "name": e.name,
                    "file": e.file_name,
                    "description": e.description,
                })
            })
            .collect();
        if !print_structured(output, &value)? {
            let rows = examples
                .iter()
                .map(|e| vec![e.name.to_string(), e.file_name.to_string(), e.description.to_string()])
                .collect();
            print_table(&["NAME", "FILE", "DESCRIPTION"], rows);
        }
        return Ok(());
    }

    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;

    let mut written = Vec::new();
    for example in examples {
        let path = dir.join(example.file_name);
        std::fs::write(&path, example.content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::debug!(path = %path.display(), "wrote example");
        written.push(path);
    }

    let paths: Vec<String> = written.iter().map(|p| p.display().to_string()).collect();
    if !print_structured(output, &serde_json::json!({ "written": paths }))? {
        println!("Wrote {} example manifests to {}:", paths.len(), dir.display());
        for path in &paths {
            println!("  {path}");
        }
        println!();
        println!("Apply them with: kubectl apply -f {}", dir.display());
    }
    Ok(())
}
