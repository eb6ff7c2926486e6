use anyhow::{Context, Result};
use chrono::Local;
use spdlog::info;

use postcheck::queue::{QuestionQueue, QueueRun};
use postcheck::util::os_helper::get_author;

use crate::{load_config, QueueArgs};

pub fn queue_cmd(args: QueueArgs) -> Result<()> {
    let config = load_config(args.config_path.as_deref(), args.verbose)?;

    let csv_path = args.csv.unwrap_or_else(|| config.queue.csv_path.clone());
    let mut questions = QuestionQueue::read(&csv_path)
        .with_context(|| format!("Error opening question queue {}", csv_path.display()))?;
    info!("{} questions in {}, {} pending", questions.len(), csv_path.display(), questions.pending().len());

    let author = get_author(args.name.as_deref());
    let run = QueueRun {
        queue: &config.queue,
        layout: &config.rules.layout,
        posts_dir: &config.paths.posts_dir,
        author: &author,
        today: args.date.unwrap_or_else(|| Local::now().date_naive()),
    };
    let outcome = run.publish(&mut questions);

    questions.write(&csv_path)
        .with_context(|| format!("Error saving question queue {}", csv_path.display()))?;

    for path in &outcome.created {
        println!("Created {}", path.display());
    }
    for path in &outcome.existing {
        println!("Already there {}", path.display());
    }
    if outcome.failed > 0 {
        println!("{} questions failed and stay in the queue", outcome.failed);
    }

    Ok(())
}
