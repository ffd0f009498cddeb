use std::sync::Arc;

use price_core::{
    update, Effect, FetchFailure, FetchState, Msg, PricePayload, PriceState, RequestId, RequestKey,
};
use price_logging::{price_debug, price_error, price_warn};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::fetch::PriceFetcher;

struct Completion {
    request_id: RequestId,
    result: Result<PricePayload, FetchFailure>,
}

/// The one network operation the controller owns.
struct InFlightRequest {
    request_id: RequestId,
    token: CancellationToken,
    task: JoinHandle<()>,
}

/// Keeps a single [`FetchState`] in step with the most recently requested
/// key.
///
/// Spawned fetch tasks never touch the state. They report back over a
/// channel and the core update rejects anything that is no longer current.
/// Dropping the controller disposes it.
pub struct FetchController {
    state: PriceState,
    fetcher: Arc<dyn PriceFetcher>,
    in_flight: Option<InFlightRequest>,
    completion_tx: mpsc::UnboundedSender<Completion>,
    completion_rx: mpsc::UnboundedReceiver<Completion>,
}

impl FetchController {
    pub fn new(fetcher: Arc<dyn PriceFetcher>) -> Self {
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        Self {
            state: PriceState::new(),
            fetcher,
            in_flight: None,
            completion_tx,
            completion_rx,
        }
    }

    pub fn state(&self) -> &FetchState {
        self.state.fetch_state()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn is_disposed(&self) -> bool {
        self.state.is_disposed()
    }

    /// Returns whether the visible state changed since the last call.
    pub fn consume_dirty(&mut self) -> bool {
        self.state.consume_dirty()
    }

    /// Follows a new key. Must be called from within a tokio runtime when the
    /// key is non-empty.
    pub fn on_key_change(&mut self, key: impl Into<RequestKey>) {
        self.dispatch(Msg::KeyChanged(key.into()));
    }

    /// Cancels any in-flight request. Safe to call any number of times.
    pub fn dispose(&mut self) {
        self.dispatch(Msg::Disposed);
    }

    /// Applies completions that have already arrived, without waiting.
    /// Returns how many were processed.
    pub fn poll_completions(&mut self) -> usize {
        let mut processed = 0;
        while let Ok(completion) = self.completion_rx.try_recv() {
            self.apply(completion);
            processed += 1;
        }
        processed
    }

    /// Waits for the in-flight request to report back and applies the result.
    ///
    /// Returns `false` without waiting when nothing is in flight. A stale
    /// completion still queued from a superseded request counts as processed.
    /// Cancel safe: dropping the future before it resolves loses nothing.
    pub async fn next_completion(&mut self) -> bool {
        let Some(flight) = self.in_flight.as_mut() else {
            return false;
        };
        let request_id = flight.request_id;

        let completion = tokio::select! {
            biased;
            completion = self.completion_rx.recv() => completion,
            joined = &mut flight.task => match joined {
                // The task may have sent right before finishing.
                Ok(()) => self.completion_rx.try_recv().ok(),
                Err(err) => {
                    price_error!("Fetch task for request {} ended abnormally: {}", request_id, err);
                    Some(Completion {
                        request_id,
                        result: Err(FetchFailure::Transport("fetch task ended unexpectedly".into())),
                    })
                }
            },
        };

        match completion {
            Some(completion) => {
                self.apply(completion);
                true
            }
            None => {
                // Finished without reporting; the join handle is spent.
                self.in_flight = None;
                false
            }
        }
    }

    fn apply(&mut self, completion: Completion) {
        let Completion { request_id, result } = completion;
        self.dispatch(Msg::FetchCompleted { request_id, result });
        if self.state.in_flight().map(|flight| flight.request_id) != self.in_flight_id() {
            self.in_flight = None;
        }
    }

    fn in_flight_id(&self) -> Option<RequestId> {
        self.in_flight.as_ref().map(|flight| flight.request_id)
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        for effect in effects {
            match effect {
                Effect::CancelFetch { request_id } => self.cancel(request_id),
                Effect::StartFetch { request_id, key } => self.start(request_id, key),
            }
        }
    }

    fn cancel(&mut self, request_id: RequestId) {
        match self.in_flight.take() {
            Some(flight) if flight.request_id == request_id => {
                price_debug!("Cancelling request {}", request_id);
                flight.token.cancel();
            }
            Some(other) => {
                price_warn!(
                    "Cancel for request {} while {} is in flight",
                    request_id,
                    other.request_id
                );
                other.token.cancel();
            }
            None => {}
        }
    }

    fn start(&mut self, request_id: RequestId, key: RequestKey) {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(err) => {
                price_error!("Cannot start request {} for {}: {}", request_id, key, err);
                self.dispatch(Msg::FetchCompleted {
                    request_id,
                    result: Err(FetchFailure::Transport("no async runtime available".into())),
                });
                return;
            }
        };

        let token = CancellationToken::new();
        let task = runtime.spawn(run_fetch(
            self.fetcher.clone(),
            request_id,
            key,
            token.clone(),
            self.completion_tx.clone(),
        ));
        self.in_flight = Some(InFlightRequest {
            request_id,
            token,
            task,
        });
    }
}

impl Drop for FetchController {
    fn drop(&mut self) {
        self.dispose();
    }
}

async fn run_fetch(
    fetcher: Arc<dyn PriceFetcher>,
    request_id: RequestId,
    key: RequestKey,
    token: CancellationToken,
    completion_tx: mpsc::UnboundedSender<Completion>,
) {
    let outcome = tokio::select! {
        biased;
        _ = token.cancelled() => None,
        result = fetcher.fetch(&key, &token) => Some(result),
    };
    match outcome {
        Some(result) if !token.is_cancelled() => {
            // The receiver is gone once the controller is dropped.
            let _ = completion_tx.send(Completion { request_id, result });
        }
        _ => price_debug!("Dropping result of cancelled request {} for {}", request_id, key),
    }
}
