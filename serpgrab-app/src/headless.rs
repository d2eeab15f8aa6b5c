use anyhow::Result;
use serpgrab_common::ResultItem;
use serpgrab_web::request::outcome_message;
use serpgrab_web::{Collector, Download, SearchRequest};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::cli::CollectArgs;

/// What a headless run wrote.
#[derive(Debug, Default)]
pub struct Report {
    pub spreadsheet: Option<PathBuf>,
    pub articles: Vec<PathBuf>,
    pub article_failures: usize,
}

/// Collect once, print the outcome, and write the downloads into `out_dir`.
///
/// Article failures are reported and skipped; anything else aborts.
pub async fn collect(
    collector: &Collector,
    args: &CollectArgs,
    default_pages: u32,
    out_dir: &Path,
) -> Result<Report> {
    let request = SearchRequest::new(&args.query, args.pages.unwrap_or(default_pages))?;
    let results = collector.run(&request).await?;

    println!("{}", outcome_message(&results));
    let mut report = Report::default();
    if results.is_empty() {
        return Ok(report);
    }
    for (i, item) in results.iter().enumerate() {
        println!("[{}] {}\n    {}", i + 1, item.title, item.link);
    }

    let path = Download::spreadsheet(&results)?.write_into(out_dir)?;
    println!("wrote {}", path.display());
    report.spreadsheet = Some(path);

    if args.articles {
        let mut names = FileNames::default();
        for (i, item) in results.iter().enumerate() {
            match save_article(collector, item, out_dir, &mut names).await {
                Ok(path) => {
                    println!("wrote {}", path.display());
                    report.articles.push(path);
                }
                Err(e) => {
                    tracing::warn!(index = i + 1, link = %item.link, error = %e, "app.article_failed");
                    eprintln!("[{}] skipped: {e:#}", i + 1);
                    report.article_failures += 1;
                }
            }
        }
    }
    Ok(report)
}

async fn save_article(
    collector: &Collector,
    item: &ResultItem,
    out_dir: &Path,
    names: &mut FileNames,
) -> Result<PathBuf> {
    let text = collector.article_text(&item.link).await?;
    let mut download = Download::article(&item.title, &text);
    download.file_name = names.claim(&download.file_name);
    Ok(download.write_into(out_dir)?)
}

/// File names handed out during one run. Comparison ignores ASCII case so
/// case-insensitive filesystems do not merge two results either.
#[derive(Debug, Default)]
struct FileNames {
    taken: HashSet<String>,
}

impl FileNames {
    /// `name` itself if unused, else `stem (2).ext`, `stem (3).ext`, ...
    fn claim(&mut self, name: &str) -> String {
        let path = Path::new(name);
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or(name);
        let ext = path.extension().and_then(|e| e.to_str());

        let mut candidate = name.to_string();
        let mut n = 2u32;
        while !self.taken.insert(candidate.to_ascii_lowercase()) {
            candidate = match ext {
                Some(ext) => format!("{stem} ({n}).{ext}"),
                None => format!("{stem} ({n})"),
            };
            n += 1;
        }
        candidate
    }
}
