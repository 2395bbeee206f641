//! In-memory doubles for the transport and prompt seams

use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use uvm_core::{Error, Result};
use uvm_update::{ConfirmationPrompt, Transport};

/// Transport serving canned bodies by URL
#[derive(Debug, Default)]
pub struct FakeTransport {
    bodies: Mutex<HashMap<String, Vec<u8>>>,
    hanging: Mutex<HashSet<String>>,
    text_calls: AtomicUsize,
    file_calls: AtomicUsize,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` at `url`
    pub fn serve(&self, url: &str, body: impl Into<Vec<u8>>) {
        self.bodies
            .lock()
            .unwrap()
            .insert(url.to_string(), body.into());
    }

    /// Requests for `url` never complete
    pub fn hang(&self, url: &str) {
        self.hanging.lock().unwrap().insert(url.to_string());
    }

    pub fn text_calls(&self) -> usize {
        self.text_calls.load(Ordering::SeqCst)
    }

    pub fn file_calls(&self) -> usize {
        self.file_calls.load(Ordering::SeqCst)
    }

    async fn body(&self, url: &str) -> Result<Vec<u8>> {
        let hangs = self.hanging.lock().unwrap().contains(url);
        if hangs {
            std::future::pending::<()>().await;
        }
        self.bodies
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| Error::remote_rejected(url, "HTTP 404 Not Found"))
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        self.text_calls.fetch_add(1, Ordering::SeqCst);
        let body = self.body(url).await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    async fn fetch_to_file(&self, url: &str, dest: &Path) -> Result<()> {
        self.file_calls.fetch_add(1, Ordering::SeqCst);
        let body = self.body(url).await?;
        tokio::fs::write(dest, body).await?;
        Ok(())
    }
}

/// Prompt that replays scripted answers and records the questions asked
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: Mutex<VecDeque<bool>>,
    questions: Mutex<Vec<String>>,
}

impl ScriptedPrompt {
    pub fn new(answers: &[bool]) -> Self {
        Self {
            answers: Mutex::new(answers.iter().copied().collect()),
            questions: Mutex::new(Vec::new()),
        }
    }

    pub fn questions(&self) -> Vec<String> {
        self.questions.lock().unwrap().clone()
    }
}

impl ConfirmationPrompt for ScriptedPrompt {
    fn ask(&self, question: &str, default: bool) -> Result<bool> {
        self.questions.lock().unwrap().push(question.to_string());
        Ok(self.answers.lock().unwrap().pop_front().unwrap_or(default))
    }
}
