use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tracing::{debug, info};

use dorkhunter_core::ResultItem;

pub const NO_RESULTS: &str = "No results found.";
pub const ERROR_PREFIX: &str = "[ERROR]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Truncate,
    Append,
}

/// Line-oriented results file. Each query section is flushed as soon as it
/// is closed, so an interrupted run keeps everything already finished.
pub struct ResultWriter<W: Write> {
    out: W,
}

impl ResultWriter<BufWriter<File>> {
    /// Open `path`. The run header is written only when the file starts empty.
    pub fn open(path: impl AsRef<Path>, mode: WriteMode, backend: &str) -> io::Result<Self> {
        let path = path.as_ref();
        let file = match mode {
            WriteMode::Truncate => File::create(path)?,
            WriteMode::Append => OpenOptions::new().create(true).append(true).open(path)?,
        };
        let fresh = file.metadata()?.len() == 0;
        info!(path = %path.display(), ?mode, fresh, "opened output file");

        Self::new(BufWriter::new(file), fresh, backend)
    }
}

impl<W: Write> ResultWriter<W> {
    pub fn new(out: W, fresh: bool, backend: &str) -> io::Result<Self> {
        let mut writer = Self { out };
        if fresh {
            writeln!(
                writer.out,
                "# Dork Hunter Results ({}) | {}",
                backend,
                chrono::Utc::now().to_rfc3339()
            )?;
            writer.out.flush()?;
        }
        Ok(writer)
    }

    /// One per run, before the first query section.
    pub fn write_target(&mut self, label: &str) -> io::Result<()> {
        write!(self.out, "\n# === Target: {} ===\n", label)?;
        self.out.flush()
    }

    pub fn begin_query(&mut self, query: &str) -> io::Result<()> {
        writeln!(self.out, "--- Dork: {} ---", query)
    }

    pub fn write_items(&mut self, items: &[ResultItem]) -> io::Result<()> {
        if items.is_empty() {
            return writeln!(self.out, "{}", NO_RESULTS);
        }
        for item in items {
            writeln!(self.out, "{}", item.link)?;
        }
        Ok(())
    }

    /// Error lines always carry the `[ERROR]` prefix.
    pub fn write_error(&mut self, message: &str) -> io::Result<()> {
        if message.starts_with(ERROR_PREFIX) {
            writeln!(self.out, "{}", message)
        } else {
            writeln!(self.out, "{} {}", ERROR_PREFIX, message)
        }
    }

    /// Close the section with a blank line and push it to disk.
    pub fn end_query(&mut self) -> io::Result<()> {
        writeln!(self.out)?;
        self.out.flush()?;
        debug!("query section flushed");
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
