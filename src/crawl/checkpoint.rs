// src/crawl/checkpoint.rs
// =============================================================================
// Checkpoints: snapshots of the crawl result list written while it runs.
//
// A checkpoint is fire-and-forget. If writing fails we log a warning and keep
// crawling. Nothing reads checkpoints back, a crashed crawl starts again from
// its seeds.
// =============================================================================

use chrono::Local;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Receives snapshots of the channels found so far.
pub trait CheckpointSink {
    fn write(&mut self, snapshot: &[String]);
}

/// Discards every snapshot. Used when checkpointing is off.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCheckpoints;

impl CheckpointSink for NoCheckpoints {
    fn write(&mut self, _snapshot: &[String]) {}
}

/// Appends each snapshot to `<dir>/checkpoint_<YYYYmmdd_HHMMSS>.txt`,
/// one channel id per line. Two snapshots taken within the same second end
/// up one after the other in the same file.
#[derive(Debug, Clone)]
pub struct FileCheckpointSink {
    dir: PathBuf,
}

impl FileCheckpointSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileCheckpointSink { dir: dir.into() }
    }

    fn try_write(&self, path: &Path, snapshot: &[String]) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        // One id per line, newline-terminated: snapshots landing in the same
        // second share a file and must not run into each other
        for id in snapshot {
            writeln!(file, "{}", id)?;
        }
        Ok(())
    }
}

impl CheckpointSink for FileCheckpointSink {
    fn write(&mut self, snapshot: &[String]) {
        let name = format!("checkpoint_{}.txt", Local::now().format("%Y%m%d_%H%M%S"));
        let path = self.dir.join(name);

        match self.try_write(&path, snapshot) {
            Ok(()) => {
                tracing::info!(path = %path.display(), channels = snapshot.len(), "checkpoint written");
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to write checkpoint");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_checkpoint_writes_snapshot() {
        let dir = std::env::temp_dir().join(format!("checkpoint-test-{}", std::process::id()));
        let mut sink = FileCheckpointSink::new(&dir);

        sink.write(&["UCa".to_string(), "UCb".to_string()]);

        let files: Vec<_> = fs::read_dir(&dir).unwrap().map(|e| e.unwrap().path()).collect();
        assert_eq!(files.len(), 1);
        let name = files[0].file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("checkpoint_") && name.ends_with(".txt"));
        let content = fs::read_to_string(&files[0]).unwrap();
        assert_eq!(content, "UCa\nUCb\n");

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_back_to_back_snapshots_stay_separate() {
        let dir = std::env::temp_dir().join(format!("checkpoint-twice-{}", std::process::id()));
        let mut sink = FileCheckpointSink::new(&dir);

        sink.write(&["UCa".to_string(), "UCb".to_string()]);
        sink.write(&["UCa".to_string(), "UCb".to_string(), "UCc".to_string()]);

        // Usually one file, two if the clock ticked over between writes
        let mut files: Vec<_> = fs::read_dir(&dir).unwrap().map(|e| e.unwrap().path()).collect();
        files.sort();
        let content: String = files
            .iter()
            .map(|f| fs::read_to_string(f).unwrap())
            .collect();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines, vec!["UCa", "UCb", "UCa", "UCb", "UCc"]);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_unwritable_dir_does_not_panic() {
        // A regular file where the directory should be
        let blocker = std::env::temp_dir().join(format!("checkpoint-blocker-{}", std::process::id()));
        fs::write(&blocker, "x").unwrap();

        let mut sink = FileCheckpointSink::new(blocker.join("nested"));
        sink.write(&["UCa".to_string()]);
        assert!(!blocker.join("nested").exists());

        fs::remove_file(&blocker).ok();
    }
}
