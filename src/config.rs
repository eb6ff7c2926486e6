use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::{env, fs, io};

use serde::Deserialize;

use crate::lint::Rule;
use crate::util::toml_date::TomlDate;

pub const CFG_FILE_NAME: &str = "postcheck.toml";

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Paths {
    pub posts_dir: PathBuf,
    /// Directory holding `post.tpl` for HTML previews.
    pub template_dir: Option<PathBuf>,
}

impl Default for Paths {
    fn default() -> Self {
        Paths {
            posts_dir: PathBuf::from("_posts"),
            template_dir: None,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Rules {
    /// Expected value of the `layout` key.
    pub layout: String,
    pub allow_unknown_keys: bool,
    /// Keys accepted on top of the built-in schema.
    pub extra_keys: Vec<String>,
    /// Category vocabulary. Empty means any category is accepted.
    pub categories: Vec<String>,
    pub earliest_date: Option<TomlDate>,
    pub allow_future: bool,
    /// Warnings fail the run too.
    pub strict: bool,
    pub disabled: Vec<Rule>,
}

impl Default for Rules {
    fn default() -> Self {
        Rules {
            layout: "post".to_string(),
            allow_unknown_keys: false,
            extra_keys: vec![],
            categories: vec![],
            earliest_date: None,
            allow_future: false,
            strict: false,
            disabled: vec![],
        }
    }
}

impl Rules {
    pub fn is_enabled(&self, rule: Rule) -> bool {
        !self.disabled.contains(&rule)
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Queue {
    pub csv_path: PathBuf,
    pub weekday_target: usize,
    pub weekend_target: usize,
    pub title_prefix: String,
    pub category: String,
    pub tags: Vec<String>,
}

impl Default for Queue {
    fn default() -> Self {
        Queue {
            csv_path: PathBuf::from("data/questions.csv"),
            weekday_target: 4,
            weekend_target: 8,
            title_prefix: "Daily Learning: ".to_string(),
            category: "Daily Learning".to_string(),
            tags: vec![],
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct Log {
    pub level: LogLevel,
    #[serde(default = "default_log_to_console")]
    pub log_to_console: bool,
    pub location: Option<PathBuf>,
}

fn default_log_to_console() -> bool {
    true
}

#[derive(Deserialize, Copy, Clone, Debug, PartialEq)]
pub enum LogLevel {
    Critical = 0,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub paths: Paths,
    pub rules: Rules,
    pub queue: Queue,
    pub log: Option<Log>,
}

fn parse_path(path: PathBuf) -> PathBuf {
    if !path.starts_with("${exe_dir}") {
        return path;
    }

    let Ok(cur_exe) = env::current_exe() else {
        return path;
    };
    let (Some(exe_dir), Some(str_path)) = (cur_exe.parent().and_then(|p| p.to_str()), path.to_str()) else {
        return path;
    };
    PathBuf::from(str_path.replace("${exe_dir}", exe_dir))
}

pub fn parse_config(cfg_content: &str) -> io::Result<Config> {
    let mut cfg: Config = match toml::from_str::<Config>(cfg_content) {
        Ok(cfg) => cfg,
        Err(e) => return Err(io::Error::new(
            ErrorKind::InvalidData, format!("Error parsing configuration file: {}", e))),
    };

    cfg.paths.posts_dir = parse_path(cfg.paths.posts_dir);
    cfg.paths.template_dir = cfg.paths.template_dir.map(parse_path);
    cfg.queue.csv_path = parse_path(cfg.queue.csv_path);
    if let Some(ref mut log) = cfg.log {
        log.location = log.location.take().map(parse_path);
    }

    Ok(cfg)
}

pub fn read_config(cfg_path: &Path) -> io::Result<Config> {
    let cfg_content = match fs::read_to_string(cfg_path) {
        Ok(content) => content,
        Err(e) => return Err(io::Error::new(e.kind(), format!("Error opening configuration file {}: {}", cfg_path.display(), e))),
    };

    parse_config(&cfg_content)
}

fn get_config_path() -> Option<PathBuf> {
    let mut candidates = vec![];
    if let Some(exe_dir) = env::current_exe().ok().and_then(|exe| exe.parent().map(Path::to_path_buf)) {
        candidates.push(exe_dir);
    }
    if let Ok(cur_dir) = env::current_dir() {
        candidates.push(cur_dir);
    }
    if let Some(cfg_dir) = dirs::config_dir() {
        candidates.push(cfg_dir);
    }

    candidates.into_iter()
        .map(|dir| dir.join(CFG_FILE_NAME))
        .find(|path| path.is_file())
}

/// Reads the configuration from `cfg_path`, or from the first `postcheck.toml`
/// found next to the executable, in the current directory or in the user
/// config directory. Without any file the defaults are used. The path read is
/// returned with the configuration.
pub fn open_config(cfg_path: Option<&Path>) -> io::Result<(Config, Option<PathBuf>)> {
    let config_path = match cfg_path {
        Some(path) => Some(path.to_path_buf()),
        None => get_config_path(),
    };

    match config_path {
        Some(path) => Ok((read_config(&path)?, Some(path))),
        None => Ok((Config::default(), None)),
    }
}
