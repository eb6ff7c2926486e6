use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use spdlog::{info, warn};

use postcheck::config::{open_config, Config, CFG_FILE_NAME};
use postcheck::content::markdown_renderer::MarkdownRenderer;
use postcheck::content::Post;
use postcheck::lint::{LintOutcome, Linter};
use postcheck::logger::configure_logger;
use postcheck::view::list_renderer::{render_list_json, render_list_text, render_taxonomy_json, render_taxonomy_text};
use postcheck::view::post_renderer::PostRenderer;
use postcheck::view::report_renderer::{render_json, render_text};

const EXIT_LINT_FAILED: u8 = 1;
const EXIT_FATAL: u8 = 2;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Config path
    #[arg(short, long)]
    config_path: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validates every post and prints a report
    Check(CheckArgs),
    /// Lists the posts, newest first
    List(ListArgs),
    /// Shows categories and tags with their post counts
    Taxonomy(ListArgs),
    /// Renders one post to HTML
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct CheckArgs {
    /// Posts directory. Defaults to paths.posts_dir from the configuration
    dir: Option<PathBuf>,

    /// Report format
    #[arg(short, long, default_value_t = ReportFormat::Text)]
    format: ReportFormat,

    /// Fail on warnings too
    #[arg(long)]
    strict: bool,
}

#[derive(Parser, Debug)]
struct ListArgs {
    /// Posts directory. Defaults to paths.posts_dir from the configuration
    dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value_t = ReportFormat::Text)]
    format: ReportFormat,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Post file, or the slug of a post in the posts directory
    post: PathBuf,

    /// Writes the page to this file instead of the stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Only the rendered body, without the page template
    #[arg(long)]
    body_only: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, ValueEnum)]
enum ReportFormat {
    /// Human readable lines
    Text,
    /// JSON document
    Json,
}

impl Display for ReportFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::Text => write!(f, "text"),
            ReportFormat::Json => write!(f, "json"),
        }
    }
}

fn lint_posts(config: &Config, dir: Option<PathBuf>) -> Result<LintOutcome> {
    let dir = dir.unwrap_or_else(|| config.paths.posts_dir.clone());
    if !dir.is_dir() {
        bail!("Posts directory {} not found", dir.display());
    }

    let today = Local::now().date_naive();
    let linter = Linter::new(&config.rules, today);
    linter.lint_dir(&dir)
        .with_context(|| format!("Error reading posts from {}", dir.display()))
}

fn check_cmd(config: &Config, args: CheckArgs) -> Result<ExitCode> {
    let outcome = lint_posts(config, args.dir)?;
    let report = outcome.report;

    match args.format {
        ReportFormat::Text => print!("{}", render_text(&report)),
        ReportFormat::Json => println!("{}", render_json(&report)?),
    }

    let strict = args.strict || config.rules.strict;
    if report.failed(strict) {
        return Ok(ExitCode::from(EXIT_LINT_FAILED));
    }
    Ok(ExitCode::SUCCESS)
}

fn list_cmd(config: &Config, args: ListArgs, taxonomy: bool) -> Result<ExitCode> {
    let outcome = lint_posts(config, args.dir)?;
    let skipped = outcome.report.files_checked.saturating_sub(outcome.posts.posts().len());
    if skipped > 0 {
        warn!("{} files could not be read as posts. Run check for details", skipped);
    }

    let posts = &outcome.posts;
    let out = match (taxonomy, args.format) {
        (false, ReportFormat::Text) => render_list_text(posts),
        (false, ReportFormat::Json) => render_list_json(posts)?,
        (true, ReportFormat::Text) => render_taxonomy_text(posts),
        (true, ReportFormat::Json) => render_taxonomy_json(posts)?,
    };
    print!("{}", out);
    if args.format == ReportFormat::Json {
        println!();
    }
    Ok(ExitCode::SUCCESS)
}

fn find_post(config: &Config, post: &Path) -> Result<Post> {
    if post.is_file() {
        return Post::from(post).with_context(|| format!("Error reading post {}", post.display()));
    }

    let slug = post.to_string_lossy();
    let outcome = lint_posts(config, None)?;
    match outcome.posts.from_slug(&slug) {
        Some(found) => Ok(found.clone()),
        None => bail!("No post file or slug {} in {}", slug, config.paths.posts_dir.display()),
    }
}

fn render_cmd(config: &Config, args: RenderArgs) -> Result<ExitCode> {
    let post = find_post(config, &args.post)?;
    let rendered = MarkdownRenderer::render(&post)?;

    let page = if args.body_only {
        format!("{}{}", rendered.toc.as_deref().unwrap_or(""), rendered.html)
    } else {
        let template = PostRenderer::load_template(config.paths.template_dir.as_deref())?;
        let renderer = PostRenderer::new(&template)?;
        renderer.render(&post, &rendered)
    };

    match args.output {
        Some(path) => {
            fs::write(&path, page).with_context(|| format!("Error writing {}", path.display()))?;
            info!("Rendered {} into {}", post.file_name.display(), path.display());
        }
        None => print!("{}", page),
    }
    Ok(ExitCode::SUCCESS)
}

fn run(args: Args) -> Result<ExitCode> {
    let (config, config_path) = open_config(args.config_path.as_deref())?;

    if let Err(err) = configure_logger(&config, args.verbose) {
        eprintln!("Error creating logger sinks. Using console instead. Desc={}", err);
    }
    match config_path {
        Some(path) => info!("Configuration read from {}", path.display()),
        None => info!("No {} found. Using defaults", CFG_FILE_NAME),
    }

    match args.command {
        Command::Check(args) => check_cmd(&config, args),
        Command::List(args) => list_cmd(&config, args, false),
        Command::Taxonomy(args) => list_cmd(&config, args, true),
        Command::Render(args) => render_cmd(&config, args),
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::from(EXIT_FATAL)
        }
    }
}
