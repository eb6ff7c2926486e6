use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::{fs, io};

use chrono::{Datelike, NaiveDate, Weekday};
use spdlog::{error, info, warn};

use crate::config::Queue;
use crate::scaffold::{post_path, write_post, NewPost};
use crate::util::fs_helper::write_atomically;

pub const QUESTION_COLUMN: &str = "Question";
pub const STATUS_COLUMN: &str = "Status";
pub const PUBLISHED: &str = "Published";

/// Questions waiting for a post, as stored in the queue CSV. Columns other
/// than `Question` and `Status` are carried through untouched.
#[derive(Debug)]
pub struct QuestionQueue {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    question_idx: usize,
    status_idx: usize,
}

fn csv_error(e: csv::Error, source: &str) -> io::Error {
    io::Error::new(ErrorKind::InvalidData, format!("Error reading questions: {} - file={}", e, source))
}

impl QuestionQueue {
    pub fn read(path: &Path) -> io::Result<QuestionQueue> {
        let file = fs::File::open(path)
            .map_err(|e| io::Error::new(e.kind(), format!("{} - file={}", e, path.display())))?;
        Self::from_reader(file, &path.display().to_string())
    }

    pub fn from_reader<R: io::Read>(reader: R, source: &str) -> io::Result<QuestionQueue> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);

        let mut headers: Vec<String> = reader.headers()
            .map_err(|e| csv_error(e, source))?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let Some(question_idx) = headers.iter().position(|h| h == QUESTION_COLUMN) else {
            return Err(io::Error::new(ErrorKind::InvalidData,
                                      format!("Column {} is missing - file={}", QUESTION_COLUMN, source)));
        };
        let status_idx = match headers.iter().position(|h| h == STATUS_COLUMN) {
            Some(idx) => idx,
            None => {
                headers.push(STATUS_COLUMN.to_string());
                headers.len() - 1
            }
        };

        let mut rows = vec![];
        for record in reader.records() {
            let record = record.map_err(|e| csv_error(e, source))?;
            let mut row: Vec<String> = record.iter().map(|f| f.to_string()).collect();
            row.resize(headers.len(), String::new());
            rows.push(row);
        }

        Ok(QuestionQueue {
            headers,
            rows,
            question_idx,
            status_idx,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn question(&self, row: usize) -> &str {
        self.rows[row][self.question_idx].trim()
    }

    pub fn is_published(&self, row: usize) -> bool {
        self.rows[row][self.status_idx].trim() == PUBLISHED
    }

    /// Row indexes still waiting for a post, in file order.
    pub fn pending(&self) -> Vec<usize> {
        (0..self.rows.len())
            .filter(|&row| !self.is_published(row) && !self.question(row).is_empty())
            .collect()
    }

    pub fn mark_published(&mut self, row: usize) {
        self.rows[row][self.status_idx] = PUBLISHED.to_string();
    }

    pub fn to_writer<W: io::Write>(&self, writer: W) -> io::Result<()> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()
    }

    /// Replaces the CSV at `path`. The old file stays intact if writing fails.
    pub fn write(&self, path: &Path) -> io::Result<()> {
        write_atomically(path, true, |file| self.to_writer(file))
    }
}

/// Number of posts to create on `date`.
pub fn daily_target(date: NaiveDate, queue: &Queue) -> usize {
    match date.weekday() {
        Weekday::Sat | Weekday::Sun => queue.weekend_target,
        _ => queue.weekday_target,
    }
}

pub struct QueueRun<'a> {
    pub queue: &'a Queue,
    pub layout: &'a str,
    pub posts_dir: &'a Path,
    pub author: &'a str,
    pub today: NaiveDate,
}

#[derive(Debug, Default)]
pub struct QueueOutcome {
    pub created: Vec<PathBuf>,
    /// Rows whose post was already on disk; marked published, not counted.
    pub existing: Vec<PathBuf>,
    pub failed: usize,
}

impl QueueRun<'_> {
    /// Scaffolds posts for the next pending questions, up to the daily target.
    pub fn publish(&self, questions: &mut QuestionQueue) -> QueueOutcome {
        let target = daily_target(self.today, self.queue);
        info!("Target for {}: {} posts", self.today, target);

        let categories = vec![self.queue.category.clone()];
        let mut outcome = QueueOutcome::default();

        for row in questions.pending() {
            if outcome.created.len() >= target {
                break;
            }

            let question = questions.question(row).to_string();
            let title = format!("{}{}", self.queue.title_prefix, question);
            let post = NewPost {
                title: &title,
                question: &question,
                date: self.today,
                author: self.author,
                layout: self.layout,
                categories: &categories,
                tags: &self.queue.tags,
                toc: false,
            };

            let path = match post_path(self.posts_dir, &post) {
                Ok(path) => path,
                Err(e) => {
                    error!("Could not create a post for '{}': {}", question, e);
                    outcome.failed += 1;
                    continue;
                }
            };

            match write_post(self.posts_dir, &post) {
                Ok(path) => {
                    questions.mark_published(row);
                    outcome.created.push(path);
                }
                // Only a post really on disk counts as published.
                Err(e) if e.kind() == ErrorKind::AlreadyExists && path.is_file() => {
                    warn!("{}", e);
                    questions.mark_published(row);
                    outcome.existing.push(path);
                }
                Err(e) => {
                    error!("Could not create a post for '{}': {}", question, e);
                    outcome.failed += 1;
                }
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use crate::content::Post;

    use super::*;

    const QUESTIONS: &str = "\
Id,Question,Source
1,How does a CDN cache content?,book
2,What is consistent hashing?,
3,???,forum
4,Why do databases use WAL?,book
";

    fn queue_cfg(weekday_target: usize) -> Queue {
        Queue {
            weekday_target,
            ..Queue::default()
        }
    }

    // 2024-05-06 is a Monday.
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 6).unwrap()
    }

    #[test]
    fn test_daily_target() {
        let queue = Queue::default();
        assert_eq!(daily_target(monday(), &queue), 4);
        assert_eq!(daily_target(NaiveDate::from_ymd_opt(2024, 5, 10).unwrap(), &queue), 4);
        assert_eq!(daily_target(NaiveDate::from_ymd_opt(2024, 5, 11).unwrap(), &queue), 8);
        assert_eq!(daily_target(NaiveDate::from_ymd_opt(2024, 5, 12).unwrap(), &queue), 8);
    }

    #[test]
    fn test_status_column_added() -> io::Result<()> {
        let mut questions = QuestionQueue::from_reader(QUESTIONS.as_bytes(), "questions.csv")?;
        assert_eq!(questions.len(), 4);
        assert_eq!(questions.pending(), [0, 1, 2, 3]);

        questions.mark_published(1);
        let mut out = vec![];
        questions.to_writer(&mut out)?;
        assert_eq!(String::from_utf8(out).unwrap(), "\
Id,Question,Source,Status
1,How does a CDN cache content?,book,
2,What is consistent hashing?,,Published
3,???,forum,
4,Why do databases use WAL?,book,
");
        Ok(())
    }

    #[test]
    fn test_published_rows_skipped() -> io::Result<()> {
        let csv = "Question,Status\nA?,Published\nB?,\n  ,\nC?,published\n";
        let questions = QuestionQueue::from_reader(csv.as_bytes(), "questions.csv")?;
        assert_eq!(questions.pending(), [1, 3]);
        Ok(())
    }

    #[test]
    fn test_missing_question_column() {
        let err = QuestionQueue::from_reader("Id,Text\n1,x\n".as_bytes(), "q.csv").err().unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
        assert!(err.to_string().contains("file=q.csv"));
    }

    #[test]
    fn test_publish() -> io::Result<()> {
        let dir = tempfile::tempdir()?;
        let posts_dir = dir.path().join("_posts");
        fs::create_dir_all(&posts_dir)?;
        // Created on an earlier run; must be kept as is.
        let existing = posts_dir.join("2024-05-06-how-does-a-cdn-cache-content.md");
        fs::write(&existing, "hand edited")?;

        let csv_path = dir.path().join("questions.csv");
        fs::write(&csv_path, QUESTIONS)?;
        let mut questions = QuestionQueue::read(&csv_path)?;

        let queue = queue_cfg(2);
        let run = QueueRun {
            queue: &queue,
            layout: "post",
            posts_dir: &posts_dir,
            author: "Bot",
            today: monday(),
        };
        let outcome = run.publish(&mut questions);

        assert_eq!(outcome.existing, [existing.clone()]);
        assert_eq!(outcome.failed, 1);
        assert_eq!(outcome.created, [
            posts_dir.join("2024-05-06-what-is-consistent-hashing.md"),
            posts_dir.join("2024-05-06-why-do-databases-use-wal.md"),
        ]);
        assert_eq!(fs::read_to_string(&existing)?, "hand edited");

        let post = Post::from(&outcome.created[0])?;
        assert_eq!(post.title(), "Daily Learning: What is consistent hashing?");
        assert_eq!(post.front_matter.categories, ["Daily Learning"]);
        assert_eq!(post.front_matter.author.as_deref(), Some("Bot"));

        questions.write(&csv_path)?;
        let questions = QuestionQueue::read(&csv_path)?;
        // Only the row that could not be turned into a file name is left.
        assert_eq!(questions.pending(), [2]);
        Ok(())
    }

    #[test]
    fn test_publish_stops_at_target() -> io::Result<()> {
        let dir = tempfile::tempdir()?;
        let mut questions = QuestionQueue::from_reader(QUESTIONS.as_bytes(), "questions.csv")?;
        let queue = queue_cfg(1);
        let run = QueueRun {
            queue: &queue,
            layout: "post",
            posts_dir: dir.path(),
            author: "Bot",
            today: monday(),
        };
        let outcome = run.publish(&mut questions);
        assert_eq!(outcome.created.len(), 1);
        assert_eq!(questions.pending(), [1, 2, 3]);
        Ok(())
    }

    #[test]
    fn test_failed_row_is_retried_not_marked() -> io::Result<()> {
        let dir = tempfile::tempdir()?;
        // A file where the posts directory should be makes every write fail.
        let posts_dir = dir.path().join("_posts");
        fs::write(&posts_dir, "not a directory")?;

        let mut questions = QuestionQueue::from_reader(QUESTIONS.as_bytes(), "questions.csv")?;
        let queue = queue_cfg(1);
        let run = QueueRun {
            queue: &queue,
            layout: "post",
            posts_dir: &posts_dir,
            author: "Bot",
            today: monday(),
        };
        let outcome = run.publish(&mut questions);
        assert!(outcome.created.is_empty());
        assert!(outcome.existing.is_empty());
        assert_eq!(outcome.failed, 4);
        assert_eq!(questions.pending(), [0, 1, 2, 3]);

        fs::remove_file(&posts_dir)?;
        let outcome = run.publish(&mut questions);
        assert!(outcome.existing.is_empty());
        assert_eq!(outcome.created, [posts_dir.join("2024-05-06-how-does-a-cdn-cache-content.md")]);
        assert_eq!(fs::read_dir(&posts_dir)?.count(), 1);
        assert_eq!(questions.pending(), [1, 2, 3]);
        Ok(())
    }

    #[test]
    fn test_write_keeps_other_columns() -> io::Result<()> {
        let dir = tempfile::tempdir()?;
        let csv_path = dir.path().join("questions.csv");
        fs::write(&csv_path, QUESTIONS)?;

        let mut questions = QuestionQueue::read(&csv_path)?;
        questions.mark_published(3);
        questions.write(&csv_path)?;

        let text = fs::read_to_string(&csv_path)?;
        assert!(text.starts_with("Id,Question,Source,Status\n"));
        assert!(text.ends_with("4,Why do databases use WAL?,book,Published\n"));
        assert_eq!(fs::read_dir(dir.path())?.count(), 1);
        Ok(())
    }
}
