//! # Command-Line Interface
//!
//! ```bash
//! tagtext render page.md                 # HTML on stdout
//! tagtext render docs/*.md --out-dir site
//! tagtext render page.md --tags site/tags --no-smartypants
//! ```
//!
//! Use `--verbose` (or `-v`) for debug output, including every tag that was
//! left as literal text. `RUST_LOG` overrides the level.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand};
use tagtext_core::RenderOptions;
use tagtext_engine::TagRegistry;

use crate::batch::{BatchOptions, RenderJob, render_batch};
use crate::config::Config;

#[derive(Debug, Parser)]
#[command(name = "tagtext")]
#[command(author, version, about = "Render extended markdown with inline tags to HTML")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Render documents to HTML
    Render(RenderArgs),
}

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Documents to render
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Write `<name>.html` files into this directory
    #[arg(long, short = 'o', value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Template tag directory; may be repeated, earlier wins
    #[arg(long = "tags", value_name = "DIR")]
    pub tag_dirs: Vec<PathBuf>,

    /// YAML config file
    #[arg(long, short = 'c', value_name = "FILE", env = "TAGTEXT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Skip the markdown stage
    #[arg(long)]
    pub no_markdown: bool,

    /// Skip smart punctuation
    #[arg(long)]
    pub no_smartypants: bool,

    /// Drop the paragraph around lone images
    #[arg(long)]
    pub unwrap_images: bool,

    /// How deep tags may nest
    #[arg(long, value_name = "N")]
    pub max_tag_depth: Option<usize>,

    /// Worker threads (defaults to the number of CPUs)
    #[arg(long, short = 'j', value_name = "N")]
    pub threads: Option<usize>,

    /// Stop at the first file that fails
    #[arg(long)]
    pub fail_fast: bool,
}

impl RenderArgs {
    /// Apply the flags on top of `base`. Flags only ever switch stages off
    /// (or unwrapping on), so config values survive when a flag is absent.
    pub fn options(&self, base: RenderOptions) -> RenderOptions {
        let mut options = base;
        if self.no_markdown {
            options.markdown = false;
        }
        if self.no_smartypants {
            options.smartypants = false;
        }
        if self.unwrap_images {
            options.unwrap_images = true;
        }
        if let Some(depth) = self.max_tag_depth {
            options.max_tag_depth = depth;
        }
        options
    }

    fn jobs(&self) -> Vec<RenderJob> {
        if self.files.len() == 1 && self.out_dir.is_none() {
            return vec![RenderJob::to_stdout(&self.files[0])];
        }
        self.files
            .iter()
            .map(|file| RenderJob::to_file(file, self.out_dir.as_deref()))
            .collect()
    }
}

/// Parse arguments and run the selected command.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Render(args) => render(args),
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    // A logger may already be installed when embedded.
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .try_init();
}

fn render(args: RenderArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => {
            log::debug!("loading config from {}", path.display());
            Config::load(path)?
        }
        None => Config::default(),
    };

    let registry = args
        .tag_dirs
        .iter()
        .chain(&config.tag_dirs)
        .fold(TagRegistry::new(), |registry, dir| {
            log::debug!("tag directory {}", dir.display());
            registry.with_tag_dir(dir)
        });

    let options = BatchOptions {
        max_threads: args.threads,
        fail_fast: args.fail_fast,
        render: args.options(config.options),
    };
    log::debug!("render options: {:?}", options.render);

    let report = render_batch(args.jobs(), Arc::new(registry), options);

    let mut stdout = std::io::stdout().lock();
    for result in &report.results {
        if let Some(error) = &result.error {
            log::error!("{}", error);
            continue;
        }
        match &result.html {
            Some(html) => {
                stdout.write_all(html.as_bytes())?;
                if !html.ends_with('\n') {
                    stdout.write_all(b"\n")?;
                }
            }
            None => {
                if let crate::batch::Destination::File(output) = &result.job.destination {
                    writeln!(
                        stdout,
                        "{} -> {}",
                        result.job.input.display(),
                        output.display()
                    )?;
                }
            }
        }
    }

    log::info!(
        "rendered {} of {} files in {:.1}ms",
        report.stats.succeeded,
        report.stats.total,
        report.stats.processing_time_ms
    );

    if report.stats.failed > 0 {
        let first = report
            .failures()
            .next()
            .and_then(|r| r.error.clone())
            .unwrap_or_default();
        bail!(
            "{} of {} files failed; first error: {}",
            report.stats.failed,
            report.stats.total,
            first
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> RenderArgs {
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Commands::Render(args) => args,
        }
    }

    #[test]
    fn render_requires_files() {
        assert!(Cli::try_parse_from(["tagtext", "render"]).is_err());
    }

    #[test]
    fn flags_override_config() {
        let args = parse(&[
            "tagtext",
            "render",
            "a.md",
            "--no-markdown",
            "--unwrap-images",
            "--max-tag-depth",
            "2",
        ]);
        let options = args.options(RenderOptions::default());
        assert!(!options.markdown);
        assert!(options.smartypants);
        assert!(options.unwrap_images);
        assert_eq!(options.max_tag_depth, 2);
    }

    #[test]
    fn absent_flags_keep_config_values() {
        let args = parse(&["tagtext", "render", "a.md"]);
        let base = RenderOptions::plain().unwrap_images(true);
        assert_eq!(args.options(base), base);
    }

    #[test]
    fn single_file_goes_to_stdout() {
        let args = parse(&["tagtext", "render", "a.md"]);
        assert_eq!(args.jobs(), vec![RenderJob::to_stdout("a.md")]);
    }

    #[test]
    fn several_files_or_out_dir_write_files() {
        let args = parse(&["tagtext", "render", "a.md", "b.md"]);
        assert_eq!(
            args.jobs(),
            vec![RenderJob::to_file("a.md", None), RenderJob::to_file("b.md", None)]
        );

        let args = parse(&["tagtext", "render", "a.md", "-o", "out"]);
        assert_eq!(
            args.jobs(),
            vec![RenderJob::to_file("a.md", Some(std::path::Path::new("out")))]
        );
    }

    #[test]
    fn tag_dirs_repeat_and_verbose_is_global() {
        let cli = Cli::try_parse_from([
            "tagtext", "render", "a.md", "--tags", "one", "--tags", "two", "-v", "-j", "4",
        ])
        .unwrap();
        assert!(cli.verbose);
        let Commands::Render(args) = cli.command;
        assert_eq!(args.tag_dirs, vec![PathBuf::from("one"), PathBuf::from("two")]);
        assert_eq!(args.threads, Some(4));
    }
}
