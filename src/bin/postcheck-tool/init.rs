use std::fs::OpenOptions;
use std::io::Write;

use anyhow::{Context, Result};

use crate::InitArgs;

pub const SAMPLE_CONFIG: &str = r#"[paths]
posts_dir = "_posts"
# Directory with a post.tpl used by `postcheck render`
# template_dir = "${exe_dir}/templates"

[rules]
layout = "post"
allow_unknown_keys = false
extra_keys = []
# Empty accepts any category
categories = []
# earliest_date = 2024-01-01
allow_future = false
strict = false
disabled = []

[queue]
csv_path = "data/questions.csv"
weekday_target = 4
weekend_target = 8
title_prefix = "Daily Learning: "
category = "Daily Learning"
tags = []

# [log]
# level = "Info"
# log_to_console = true
# location = "${exe_dir}/log/postcheck.log"
"#;

pub fn init_cmd(args: InitArgs) -> Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&args.out_file)
        .with_context(|| format!("Error creating {}", args.out_file.display()))?;
    file.write_all(SAMPLE_CONFIG.as_bytes())?;
    println!("Configuration written to {}", args.out_file.display());
    Ok(())
}
