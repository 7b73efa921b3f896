//! Sitemap file writer
//!
//! Writes the crawl result as a plain-text sitemap: a numbered list of every
//! URL visited with its outcome, followed by per-page asset and link
//! sections for the fetched pages.

use crate::crawler::{VisitRecord, VisitStatus};
use crate::output::CrawlReport;
use chrono::Local;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Generates the default sitemap file name from the current local time
pub fn default_sitemap_path() -> PathBuf {
    PathBuf::from(format!(
        "sitemap_{}.txt",
        Local::now().format("%H_%M_%d_%m_%y")
    ))
}

/// Writes the sitemap for a finished crawl to the given path
pub fn write_sitemap(report: &CrawlReport, path: &Path) -> std::io::Result<()> {
    let file = File::create(path)?;
    let mut out = BufWriter::new(file);

    let mut records: Vec<&VisitRecord> = report.records.values().collect();
    records.sort_by(|a, b| a.url.as_str().cmp(b.url.as_str()));

    writeln!(out, "***************** Sitemap ***************** ")?;
    for (i, record) in records.iter().enumerate() {
        writeln!(out, "{}. {}  {}", i + 1, record.url, outcome_label(record))?;
    }
    writeln!(out)?;
    writeln!(out)?;

    for record in &records {
        let VisitStatus::Fetched { links, assets, .. } = &record.status else {
            continue;
        };

        if !assets.is_empty() {
            writeln!(
                out,
                "\n\n ***************** Assets on {} ***************** ",
                record.url
            )?;
            for asset in assets {
                writeln!(out, "\n - {}", asset)?;
            }
        }

        let mut sorted_links: Vec<_> = links.iter().collect();
        sorted_links.sort_by(|a, b| a.as_str().cmp(b.as_str()));

        writeln!(
            out,
            "\n\n***************** Links on {} ***************** ",
            record.url
        )?;
        for link in sorted_links {
            writeln!(out, "\n - {}", link)?;
        }
        writeln!(out)?;
    }

    out.flush()
}

fn outcome_label(record: &VisitRecord) -> String {
    match &record.status {
        VisitStatus::Fetched { status_code, .. } => status_code.to_string(),
        other => other.kind().label().to_string(),
    }
}
