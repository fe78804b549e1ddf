//! Opinion relay: turns the stored notes into one streamed second opinion.
//!
//! Each call fetches the notes, builds the prompt, opens a generation session and streams
//! fragments until the session closes or fails. Nothing is cached; every call
//! sees the notes as they are at that moment.

pub mod prompt;
pub mod stream;

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::db::{with_store, Database};
use crate::error::RelayError;
use crate::llm::TextGenerator;

pub use stream::OpinionStream;

pub struct OpinionRelay {
    db: Arc<Database>,
    generator: Arc<dyn TextGenerator>,
    /// Parent of every per-call token; cancelled on process shutdown
    shutdown: CancellationToken,
}

impl OpinionRelay {
    pub fn new(db: Arc<Database>, generator: Arc<dyn TextGenerator>, shutdown: CancellationToken) -> Self {
        Self {
            db,
            generator,
            shutdown,
        }
    }

    pub fn model(&self) -> &str {
        self.generator.model()
    }

    /// Start a new second-opinion stream.
    ///
    /// Failures before the first fragment (store unreadable, endpoint refused
    /// the request) are returned here; later failures arrive as the stream's
    /// last item.
    pub async fn generate_opinion(&self) -> Result<OpinionStream, RelayError> {
        if self.shutdown.is_cancelled() {
            return Err(RelayError::Cancelled);
        }

        let details = with_store(&self.db, |db| db.list_medical_details()).await?;

        log::info!(
            "[RELAY] Requesting second opinion over {} note(s) from {}",
            details.len(),
            self.generator.model()
        );

        let messages = prompt::build_messages(&details);
        let upstream = self.generator.stream_chat(&messages).await?;

        Ok(OpinionStream::spawn(upstream, self.shutdown.child_token()))
    }
}
