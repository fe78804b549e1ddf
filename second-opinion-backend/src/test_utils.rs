//! Test doubles shared by unit tests.

use actix_web::web;
use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::db::Database;
use crate::error::GenerationError;
use crate::llm::{ChatMessage, FragmentStream, TextGenerator};
use crate::relay::OpinionRelay;
use crate::AppState;

/// Sets its flag when the owning upstream stream is dropped
struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// Scripted [`TextGenerator`] that records every prompt it receives
pub struct FakeGenerator {
    fragments: Vec<String>,
    failure: Option<String>,
    refuse_status: Option<u16>,
    endless: bool,
    tag_sessions: bool,
    delay: Duration,
    sessions: AtomicUsize,
    released: Arc<AtomicBool>,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl FakeGenerator {
    /// Emit these deltas, then finish
    pub fn fragments(fragments: &[&str]) -> Self {
        Self {
            fragments: fragments.iter().map(|s| s.to_string()).collect(),
            failure: None,
            refuse_status: None,
            endless: false,
            tag_sessions: false,
            delay: Duration::ZERO,
            sessions: AtomicUsize::new(0),
            released: Arc::new(AtomicBool::new(false)),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Never finishes on its own
    pub fn endless() -> Self {
        Self {
            endless: true,
            delay: Duration::from_millis(10),
            ..Self::fragments(&[])
        }
    }

    /// Refuse the request with an HTTP status before streaming
    pub fn refusing(status: u16) -> Self {
        Self {
            refuse_status: Some(status),
            ..Self::fragments(&[])
        }
    }

    /// After the scripted deltas, fail the stream
    pub fn then_fail(mut self, msg: &str) -> Self {
        self.failure = Some(msg.to_string());
        self
    }

    /// Prefix every delta with `s{n}:` where n counts sessions from 0
    pub fn tagged_per_session(mut self) -> Self {
        self.tag_sessions = true;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Prompts received so far, one entry per session
    pub fn calls(&self) -> Vec<Vec<ChatMessage>> {
        self.calls.lock().unwrap().clone()
    }

    /// True once the most recent upstream stream has been dropped
    pub fn upstream_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    fn model(&self) -> &str {
        "fake-model"
    }

    async fn stream_chat(&self, messages: &[ChatMessage]) -> Result<FragmentStream, GenerationError> {
        self.calls.lock().unwrap().push(messages.to_vec());

        if let Some(status) = self.refuse_status {
            return Err(GenerationError::Status {
                status,
                body: "refused by fake".to_string(),
            });
        }

        let session = self.sessions.fetch_add(1, Ordering::SeqCst);
        let mut items: Vec<Result<String, GenerationError>> = self
            .fragments
            .iter()
            .map(|f| {
                if self.tag_sessions && !f.is_empty() {
                    Ok(format!("s{}:{}", session, f))
                } else {
                    Ok(f.clone())
                }
            })
            .collect();
        if let Some(msg) = &self.failure {
            items.push(Err(GenerationError::Body(msg.clone())));
        }

        self.released.store(false, Ordering::SeqCst);
        let flag = DropFlag(Arc::clone(&self.released));
        let delay = self.delay;
        let endless = self.endless;

        let stream = stream::unfold((items.into_iter(), flag, 0usize), move |(mut items, flag, n)| async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            if endless {
                return Some((Ok(format!("token{} ", n)), (items, flag, n + 1)));
            }
            items.next().map(|item| (item, (items, flag, n + 1)))
        });

        Ok(stream.boxed())
    }
}

/// Poll `check` until it holds or roughly a second has passed
pub async fn eventually<F: Fn() -> bool>(check: F) -> bool {
    for _ in 0..100 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}

/// Application state over an in-memory store and the given generator
pub fn test_state(generator: FakeGenerator) -> web::Data<AppState> {
    let db = Arc::new(Database::open_in_memory().expect("in-memory database"));
    let relay = OpinionRelay::new(Arc::clone(&db), Arc::new(generator), CancellationToken::new());

    web::Data::new(AppState {
        db,
        relay: Arc::new(relay),
        config: Config::from_lookup(|_| None),
        started_at: Instant::now(),
    })
}
