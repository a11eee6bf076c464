/// Clipboard placement for finished templates.
///
/// The system clipboard is tried first. If that fails, the text is piped into a
/// clipboard command (`wl-copy`, `xclip`, ...). Copying never fails from the caller's
/// point of view: the outcome only says which path worked.
use std::io::Write;
use std::process::{Command, Stdio};
use std::sync::Arc;

use tracing::{error, warn};

const FALLBACK_COMMANDS: &[&str] = &[
    "wl-copy",
    "xclip -selection clipboard",
    "xsel --clipboard --input",
    "pbcopy",
    "clip",
];

#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error("system clipboard unavailable: {0}")]
    System(String),

    #[error("clipboard command failed: {0}")]
    Command(String),
}

pub trait ClipboardWriter: Send + Sync {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// The platform clipboard via `arboard`.
pub struct SystemClipboard;

impl ClipboardWriter for SystemClipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| ClipboardError::System(e.to_string()))?;
        clipboard
            .set_text(text)
            .map_err(|e| ClipboardError::System(e.to_string()))
    }
}

/// Pipes text into an external clipboard command.
pub struct CommandClipboard {
    commands: Vec<String>,
}

impl CommandClipboard {
    /// Use `command` when given, otherwise try the well-known clipboard tools in order.
    pub fn new(command: Option<&str>) -> Self {
        let commands = match command {
            Some(cmd) => vec![cmd.to_string()],
            None => FALLBACK_COMMANDS.iter().map(|c| c.to_string()).collect(),
        };
        Self { commands }
    }
}

impl ClipboardWriter for CommandClipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let mut failures = Vec::new();
        for command_line in &self.commands {
            match pipe_to_command(command_line, text) {
                Ok(()) => return Ok(()),
                Err(e) => failures.push(format!("{command_line}: {e}")),
            }
        }
        Err(ClipboardError::Command(failures.join("; ")))
    }
}

fn pipe_to_command(command_line: &str, text: &str) -> Result<(), String> {
    let mut parts = command_line.split_whitespace();
    let program = parts.next().ok_or_else(|| "empty command".to_string())?;

    let mut child = Command::new(program)
        .args(parts)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| e.to_string())?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(text.as_bytes()).map_err(|e| e.to_string())?;
    }

    let status = child.wait().map_err(|e| e.to_string())?;
    if status.success() {
        Ok(())
    } else {
        Err(format!("exited with {status}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyMethod {
    System,
    Fallback,
    Failed,
}

impl CopyMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Fallback => "fallback",
            Self::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyOutcome {
    pub text: String,
    pub method: CopyMethod,
}

impl CopyOutcome {
    /// Only the primary path shows the "Copied!" acknowledgment.
    pub fn acknowledged(&self) -> bool {
        self.method == CopyMethod::System
    }
}

pub struct Clipboard {
    primary: Box<dyn ClipboardWriter>,
    fallback: Box<dyn ClipboardWriter>,
}

impl Clipboard {
    pub fn new(primary: Box<dyn ClipboardWriter>, fallback: Box<dyn ClipboardWriter>) -> Self {
        Self { primary, fallback }
    }

    pub fn system(fallback_command: Option<&str>) -> Self {
        Self::new(
            Box::new(SystemClipboard),
            Box::new(CommandClipboard::new(fallback_command)),
        )
    }

    /// Blocking copy with fallback. Failures are logged, never returned.
    pub fn copy(&self, text: String) -> CopyOutcome {
        let method = match self.primary.write_text(&text) {
            Ok(()) => CopyMethod::System,
            Err(e) => {
                warn!(error = %e, "failed to copy text, trying fallback");
                match self.fallback.write_text(&text) {
                    Ok(()) => CopyMethod::Fallback,
                    Err(e) => {
                        error!(error = %e, "fallback copy failed");
                        CopyMethod::Failed
                    }
                }
            }
        };
        CopyOutcome { text, method }
    }
}

/// Place `text` on the clipboard from a blocking task.
pub async fn copy_to_clipboard(clipboard: Arc<Clipboard>, text: String) -> CopyOutcome {
    let for_task = text.clone();
    match tokio::task::spawn_blocking(move || clipboard.copy(for_task)).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(error = %e, "clipboard task failed");
            CopyOutcome {
                text,
                method: CopyMethod::Failed,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::model::TemplateRecord;
    use crate::render::{build_rendering, extract_plain_text};

    #[derive(Default)]
    struct Recorder {
        fail: bool,
        written: Arc<Mutex<Vec<String>>>,
    }

    impl ClipboardWriter for Recorder {
        fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
            if self.fail {
                return Err(ClipboardError::System("no display".to_string()));
            }
            self.written.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    type Written = Arc<Mutex<Vec<String>>>;

    fn clipboard(primary_fails: bool, fallback_fails: bool) -> (Clipboard, Written, Written) {
        let primary = Recorder {
            fail: primary_fails,
            ..Default::default()
        };
        let fallback = Recorder {
            fail: fallback_fails,
            ..Default::default()
        };
        let (p, f) = (Arc::clone(&primary.written), Arc::clone(&fallback.written));
        (Clipboard::new(Box::new(primary), Box::new(fallback)), p, f)
    }

    #[test]
    fn primary_success_is_acknowledged() {
        let (clipboard, primary, fallback) = clipboard(false, false);
        let outcome = clipboard.copy("hello".to_string());
        assert_eq!(outcome.method, CopyMethod::System);
        assert!(outcome.acknowledged());
        assert_eq!(*primary.lock().unwrap(), vec!["hello".to_string()]);
        assert!(fallback.lock().unwrap().is_empty());
    }

    #[test]
    fn primary_failure_uses_fallback_without_acknowledgment() {
        let (clipboard, _, fallback) = clipboard(true, false);
        let outcome = clipboard.copy("hello".to_string());
        assert_eq!(outcome.method, CopyMethod::Fallback);
        assert!(!outcome.acknowledged());
        assert_eq!(*fallback.lock().unwrap(), vec!["hello".to_string()]);
    }

    #[test]
    fn double_failure_is_reported_not_raised() {
        let (clipboard, _, _) = clipboard(true, true);
        let outcome = clipboard.copy("hello".to_string());
        assert_eq!(outcome.method, CopyMethod::Failed);
        assert_eq!(outcome.text, "hello");
    }

    #[test]
    fn missing_command_is_an_error() {
        let writer = CommandClipboard::new(Some("definitely-not-a-clipboard-tool-xyz"));
        assert!(matches!(writer.write_text("x"), Err(ClipboardError::Command(_))));
    }

    #[tokio::test]
    async fn copies_flattened_rendering() {
        let (clipboard, primary, _) = clipboard(false, false);
        let record = TemplateRecord {
            id: 1,
            title: "Grade Inquiry".to_string(),
            category: "academic".to_string(),
            description: "Ask about a grade.".to_string(),
            subject: None,
            body: Some("Dear [Teacher's Name],\n\nThanks.".to_string()),
        };
        let mut rendering = build_rendering(&record);
        rendering.edit(0, "Ms. Rivera").unwrap();

        let outcome = copy_to_clipboard(Arc::new(clipboard), extract_plain_text(&rendering)).await;
        assert_eq!(outcome.text, "Dear Ms. Rivera,\n\nThanks.");
        assert_eq!(*primary.lock().unwrap(), vec![outcome.text.clone()]);
    }
}
