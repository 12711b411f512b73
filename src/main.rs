//! 🖼️ Rewrite image paths in Markdown documents to be relative.
//!
//! Scans a static site, then rewrites every image reference in its Markdown
//! documents that points at a file under the static folder so that it is
//! relative to the document instead.

mod config;
mod render;
mod site;

use std::fs;

use anyhow::{bail, Context as _, Result};
use camino::{Utf8Path as Path, Utf8PathBuf as PathBuf};
use clap::Parser as _;
use rayon::prelude::*;
use relative_images::{FileIndex, ProcessError, Processor};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::site::Rewrite;

#[derive(Debug, clap::Parser)]
#[command(author, version, about)]
struct Opt {
    /// The site root, holding `relimg.toml` and the static folder.
    #[clap(long, env = "RELIMG_ROOT", default_value = ".")]
    root: PathBuf,

    /// Only report documents that would change.
    #[clap(long)]
    check: bool,
}

pub struct Context {
    check: bool,
    root: PathBuf,
    config: Config,
}

enum Status {
    UpToDate,
    OutOfDate,
    Updated,
    Failed(ProcessError),
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "relative_images=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let Opt { root, check } = Opt::parse();

    let root = root
        .canonicalize_utf8()
        .with_context(|| format!("failed to resolve site root `{root}`"))?;
    let config = config::load(&root)?;

    let ctx = Context {
        check,
        root,
        config,
    };

    let files = site::scan_files(&ctx.root)?;
    info!(files = files.len(), root = %ctx.root, "scanned site");

    let mut documents = Vec::new();
    for dir in &ctx.config.content {
        documents.extend(site::markdown_files(dir)?);
    }

    let processor = Processor::new(ctx.config.options.clone());
    let failed = run(&ctx, &processor, &files, &documents);
    if failed > 0 {
        bail!("{failed} document(s) could not be rewritten");
    }
    Ok(())
}

/// Handles every document, printing one line for each, and returns the
/// number of documents that failed.
fn run(ctx: &Context, processor: &Processor, files: &FileIndex, documents: &[PathBuf]) -> usize {
    let results: Vec<_> = documents
        .par_iter()
        .map(|path| generate(ctx, processor, files, path))
        .collect();

    let mut failed = 0;
    for (path, result) in documents.iter().zip(results) {
        let name = path.strip_prefix(&ctx.root).unwrap_or(path.as_path());
        match result {
            Ok(Status::UpToDate) => println!("{name} is up to date"),
            Ok(Status::OutOfDate) => println!("{name} is out of date"),
            Ok(Status::Updated) => println!("{name} was updated"),
            Ok(Status::Failed(err)) => {
                error!("{err}");
                failed += 1;
            }
            Err(err) => {
                error!("{err:#}");
                failed += 1;
            }
        }
    }
    failed
}

fn generate(ctx: &Context, processor: &Processor, files: &FileIndex, path: &Path) -> Result<Status> {
    let current =
        fs::read_to_string(path).with_context(|| format!("failed to read from `{path}`"))?;

    let rendered = match site::rewrite(processor, files, path, &current)? {
        Rewrite::Unchanged => return Ok(Status::UpToDate),
        Rewrite::Failed(err) => return Ok(Status::Failed(err)),
        Rewrite::Changed(rendered) => rendered,
    };

    if current == rendered {
        Ok(Status::UpToDate)
    } else if ctx.check {
        Ok(Status::OutOfDate)
    } else {
        fs::write(path, rendered).with_context(|| format!("failed to write to `{path}`"))?;
        Ok(Status::Updated)
    }
}
