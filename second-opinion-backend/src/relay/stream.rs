//! Fragment pump between one generation session and one consumer.
//!
//! A spawned task reads the upstream session and hands each non-empty
//! fragment to the consumer through a one-slot channel, so nothing is
//! buffered beyond the fragment in flight. Dropping the [`OpinionStream`]
//! fires its cancellation token, and the task drops the upstream session.

use futures_util::{Stream, StreamExt};
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::error::RelayError;
use crate::llm::FragmentStream;

/// How long a still-connected consumer gets to accept the cancellation notice
const CANCEL_NOTICE_TIMEOUT: Duration = Duration::from_secs(1);

/// Ordered, finite, single-use sequence of opinion fragments.
///
/// Ends with `None` after a clean finish, or with one `Err` item after a failure.
pub struct OpinionStream {
    // Field order matters: the receiver closes before the guard cancels the token
    rx: mpsc::Receiver<Result<String, RelayError>>,
    _guard: DropGuard,
}

impl OpinionStream {
    pub(crate) fn spawn(upstream: FragmentStream, token: CancellationToken) -> Self {
        let (tx, rx) = mpsc::channel(1);
        let guard = token.clone().drop_guard();

        tokio::spawn(pump(upstream, tx, token));

        Self { rx, _guard: guard }
    }
}

impl Stream for OpinionStream {
    type Item = Result<String, RelayError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().rx.poll_recv(cx)
    }
}

async fn pump(
    mut upstream: FragmentStream,
    tx: mpsc::Sender<Result<String, RelayError>>,
    token: CancellationToken,
) {
    let mut forwarded = 0usize;

    loop {
        let next = tokio::select! {
            biased;
            _ = token.cancelled() => return notify_cancelled(&tx, forwarded).await,
            next = upstream.next() => next,
        };

        let item = match next {
            Some(Ok(fragment)) if fragment.is_empty() => continue,
            Some(Ok(fragment)) => {
                log::trace!("[RELAY] fragment {:?}", fragment);
                Ok(fragment)
            }
            Some(Err(e)) => {
                log::warn!("[RELAY] Generation failed after {} fragment(s): {}", forwarded, e);
                Err(RelayError::from(e))
            }
            None => {
                log::info!("[RELAY] Generation complete ({} fragment(s))", forwarded);
                return;
            }
        };
        let terminal = item.is_err();

        tokio::select! {
            biased;
            _ = token.cancelled() => return notify_cancelled(&tx, forwarded).await,
            sent = tx.send(item) => {
                if sent.is_err() {
                    log::info!("[RELAY] Consumer went away after {} fragment(s)", forwarded);
                    return;
                }
            }
        }

        if terminal {
            return;
        }
        forwarded += 1;
    }
}

/// Upstream is dropped by the caller returning. A consumer that is still
/// attached (process shutdown rather than disconnect) gets a `Cancelled` item.
async fn notify_cancelled(tx: &mpsc::Sender<Result<String, RelayError>>, forwarded: usize) {
    if tx.is_closed() {
        log::info!("[RELAY] Consumer disconnected after {} fragment(s), aborting generation", forwarded);
        return;
    }

    log::info!("[RELAY] Generation cancelled after {} fragment(s)", forwarded);
    let _ = tokio::time::timeout(CANCEL_NOTICE_TIMEOUT, tx.send(Err(RelayError::Cancelled))).await;
}
