use anyhow::{Context, Result};
use std::path::Path;

use crate::report::Summary;
use crate::table::Dataset;

/// Print a summary of an enriched table without touching it.
pub fn run(file: String) -> Result<()> {
    let path = Path::new(&file);
    let dataset = Dataset::load(path).with_context(|| format!("loading {}", path.display()))?;

    println!("{}", path.display());
    println!("{}", Summary::of(&dataset));

    let missing: Vec<&str> = (0..dataset.len())
        .filter(|&row| !dataset.has_valid_result(row))
        .map(|row| dataset.company_name(row))
        .filter(|name| !name.is_empty())
        .take(10)
        .collect();
    if !missing.is_empty() {
        println!("Still missing:");
        for company in missing {
            println!("  {}", company);
        }
    }

    Ok(())
}
