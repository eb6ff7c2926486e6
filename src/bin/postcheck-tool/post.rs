use anyhow::{Context, Result};
use chrono::Local;

use postcheck::scaffold::{render_post, write_post, NewPost};
use postcheck::util::os_helper::get_author;

use crate::{load_config, PostArgs, PostOutput};

pub fn post_cmd(args: PostArgs) -> Result<()> {
    let config = load_config(args.config_path.as_deref(), false)?;

    let name = get_author(args.name.as_deref());
    let date = args.date.unwrap_or_else(|| Local::now().date_naive());
    let categories = if args.categories.is_empty() {
        vec![config.queue.category.clone()]
    } else {
        args.categories
    };

    let post = NewPost {
        title: &args.title,
        question: &args.title,
        date,
        author: &name,
        layout: &config.rules.layout,
        categories: &categories,
        tags: &args.tags,
        toc: args.toc,
    };

    match args.output {
        PostOutput::Stdout => {
            print!("{}", render_post(&post)?);
        }
        PostOutput::File => {
            let posts_dir = &config.paths.posts_dir;
            let path = write_post(posts_dir, &post)
                .with_context(|| format!("Error creating post in {}", posts_dir.display()))?;
            println!("Created file {}", path.display());
        }
    };

    Ok(())
}
