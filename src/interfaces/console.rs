//! Line-oriented chat front-end on any reader/writer pair.
//!
//! Options are rendered as a numbered list; typing the number picks the
//! option, anything else is sent as free text.

use super::csv::operation_writer::OperationWriter;
use crate::application::bot::{Bot, START_COMMAND};
use crate::application::reply::Reply;
use crate::domain::user::UserId;
use crate::error::Result;
use chrono::Local;
use std::fs::File;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::info;

pub const QUIT: &str = "quit";

pub struct Console<R: BufRead, W: Write> {
    input: R,
    output: W,
    report_dir: PathBuf,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W, report_dir: impl Into<PathBuf>) -> Self {
        Self {
            input,
            output,
            report_dir: report_dir.into(),
        }
    }

    /// Runs one user's conversation until `quit` or end of input.
    pub async fn run(&mut self, bot: &Bot, user_id: UserId) -> Result<()> {
        let mut reply = bot.handle(user_id, START_COMMAND).await;
        self.render(&reply)?;

        let mut line = String::new();
        loop {
            write!(self.output, "> ")?;
            self.output.flush()?;

            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                break;
            }
            let text = line.trim_end_matches(['\r', '\n']);
            if text.trim() == QUIT {
                break;
            }

            let message = resolve_input(&reply.options, text);
            reply = bot.handle(user_id, &message).await;
            self.render(&reply)?;
        }
        Ok(())
    }

    fn render(&mut self, reply: &Reply) -> Result<()> {
        writeln!(self.output, "{}", reply.text)?;
        for (i, option) in reply.options.iter().enumerate() {
            writeln!(self.output, "  [{}] {}", i + 1, option)?;
        }
        if let Some(entries) = &reply.report {
            let name = format!("operations-{}.csv", Local::now().format("%Y%m%d-%H%M%S"));
            let path = self.report_dir.join(name);
            OperationWriter::new(File::create(&path)?).write_entries(entries)?;
            info!(path = %path.display(), rows = entries.len(), "Report written");
            writeln!(self.output, "Report saved to {}", path.display())?;
        }
        Ok(())
    }
}

/// Maps `"2"` to the second option when it exists; otherwise returns the
/// text unchanged.
pub fn resolve_input(options: &[String], text: &str) -> String {
    text.trim()
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| options.get(i))
        .cloned()
        .unwrap_or_else(|| text.to_owned())
}
