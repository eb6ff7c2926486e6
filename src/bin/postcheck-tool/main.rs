use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};

use postcheck::config::{open_config, Config};
use postcheck::logger::configure_logger;

use crate::init::init_cmd;
use crate::post::post_cmd;
use crate::queue::queue_cmd;

mod init;
mod post;
mod queue;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
enum Args {
    /// Creating post
    Post(PostArgs),
    /// Creates the posts for today from the question queue
    Queue(QueueArgs),
    /// Writes a sample configuration file
    Init(InitArgs),
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct PostArgs {
    /// Config path
    #[arg(short, long)]
    config_path: Option<PathBuf>,

    /// Name of the author. If empty, OS user real name is being used
    #[arg(short, long)]
    name: Option<String>,

    /// Title of the post
    #[arg(short, long)]
    title: String,

    /// Category, can be repeated. Defaults to the queue category
    #[arg(long = "category")]
    categories: Vec<String>,

    /// Tag, can be repeated
    #[arg(long = "tag")]
    tags: Vec<String>,

    /// Adds `toc: true`
    #[arg(long)]
    toc: bool,

    /// Publish date, defaults to today
    #[arg(short, long)]
    date: Option<NaiveDate>,

    /// Post generation options
    #[arg(short, long, default_value_t = PostOutput::Stdout)]
    output: PostOutput,
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct QueueArgs {
    /// Config path
    #[arg(short, long)]
    config_path: Option<PathBuf>,

    /// Name of the author. If empty, OS user real name is being used
    #[arg(short, long)]
    name: Option<String>,

    /// Questions CSV. Defaults to queue.csv_path from the configuration
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Date of the run, defaults to today
    #[arg(short, long)]
    date: Option<NaiveDate>,

    /// Debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct InitArgs {
    /// Where to write the configuration
    #[arg(short, long, default_value = postcheck::config::CFG_FILE_NAME)]
    out_file: PathBuf,
}

#[derive(Clone, Copy, Debug, PartialEq, ValueEnum)]
enum PostOutput {
    /// Writes the new post content to the stdout
    Stdout,
    /// Writes the new post into the posts directory
    File,
}

impl std::fmt::Display for PostOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PostOutput::Stdout => write!(f, "stdout"),
            PostOutput::File => write!(f, "file"),
        }
    }
}

fn load_config(config_path: Option<&std::path::Path>, verbose: bool) -> Result<Config> {
    let (config, _) = open_config(config_path)?;
    if let Err(err) = configure_logger(&config, verbose) {
        eprintln!("Error creating logger sinks. Using console instead. Desc={}", err);
    }
    Ok(config)
}

fn main() -> ExitCode {
    let args = Args::parse();

    let res = match args {
        Args::Post(args) => post_cmd(args),
        Args::Queue(args) => queue_cmd(args),
        Args::Init(args) => init_cmd(args),
    };

    match res {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::from(2)
        }
    }
}
