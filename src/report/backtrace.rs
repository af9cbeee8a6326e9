//! Backtrace post-processing for failure reports

use std::path::Path;

/// Reduces raw backtrace frames to the ones worth showing
///
/// Any `Fn(&[String]) -> Vec<String>` is a filter.
pub trait BacktraceFilter {
    fn filtered_backtrace(&self, frames: &[String]) -> Vec<String>;
}

impl<F> BacktraceFilter for F
where
    F: Fn(&[String]) -> Vec<String>,
{
    fn filtered_backtrace(&self, frames: &[String]) -> Vec<String> {
        self(frames)
    }
}

/// Keeps frames that mention the project root
///
/// When no frame does, every frame is kept.
#[derive(Debug, Clone)]
pub struct ProjectFrames {
    root: String,
}

impl ProjectFrames {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_string_lossy().to_string(),
        }
    }
}

impl BacktraceFilter for ProjectFrames {
    fn filtered_backtrace(&self, frames: &[String]) -> Vec<String> {
        let root = self.root.trim_start_matches("./");
        if root.is_empty() || root == "." {
            return frames.to_vec();
        }
        let kept: Vec<String> = frames
            .iter()
            .filter(|frame| frame.contains(root))
            .cloned()
            .collect();
        if kept.is_empty() {
            frames.to_vec()
        } else {
            kept
        }
    }
}
