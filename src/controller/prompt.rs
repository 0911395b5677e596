use std::io::Write;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, Mutex};

/// Asks the user to confirm a destructive action
#[async_trait]
pub trait Confirm: Send + Sync {
    async fn confirm(&self, message: &str) -> bool;
}

/// Answers every prompt the same way (`--yes`, tests)
#[derive(Debug, Clone, Copy)]
pub struct AssumeYes(pub bool);

#[async_trait]
impl Confirm for AssumeYes {
    async fn confirm(&self, message: &str) -> bool {
        tracing::debug!("Auto-answering '{}' with {}", message, self.0);
        self.0
    }
}

/// `y/N` prompt on the terminal
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinConfirm;

#[async_trait]
impl Confirm for StdinConfirm {
    async fn confirm(&self, message: &str) -> bool {
        eprint!("{} [y/N] ", message);
        let _ = std::io::stderr().flush();

        let mut line = String::new();
        let mut reader = BufReader::new(tokio::io::stdin());
        match reader.read_line(&mut line).await {
            Ok(_) => is_yes(&line),
            Err(e) => {
                tracing::warn!("Failed to read confirmation: {}", e);
                false
            }
        }
    }
}

/// Reads the answer from a shared line channel, so prompts and commands can
/// come from the same input stream.
#[derive(Clone)]
pub struct ChannelConfirm {
    lines: Arc<Mutex<mpsc::UnboundedReceiver<String>>>,
}

impl ChannelConfirm {
    pub fn new(lines: Arc<Mutex<mpsc::UnboundedReceiver<String>>>) -> Self {
        Self { lines }
    }
}

#[async_trait]
impl Confirm for ChannelConfirm {
    async fn confirm(&self, message: &str) -> bool {
        println!("{} [y/N]", message);
        let mut lines = self.lines.lock().await;
        match lines.recv().await {
            Some(line) => is_yes(&line),
            None => false,
        }
    }
}

pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
