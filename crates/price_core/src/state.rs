use crate::{PricePayload, RequestId, RequestKey};

/// What the presentation layer sees for the current key.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchState<T = PricePayload> {
    /// No key provided yet, or the key is empty.
    Idle,
    /// A request for `key` is in flight.
    Loading { key: RequestKey },
    Success { key: RequestKey, data: T },
    Failed { key: RequestKey, message: String },
}

impl<T> FetchState<T> {
    pub fn key(&self) -> Option<&RequestKey> {
        match self {
            FetchState::Idle => None,
            FetchState::Loading { key }
            | FetchState::Success { key, .. }
            | FetchState::Failed { key, .. } => Some(key),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading { .. })
    }

    /// `Success` or `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, FetchState::Success { .. } | FetchState::Failed { .. })
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            FetchState::Success { data, .. } => Some(data),
            _ => None,
        }
    }
}

/// The single request this state is waiting on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InFlight {
    pub request_id: RequestId,
    pub key: RequestKey,
}

/// Owned lifecycle state: the visible [`FetchState`] plus the bookkeeping
/// needed to reject superseded completions.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceState<T = PricePayload> {
    fetch: FetchState<T>,
    in_flight: Option<InFlight>,
    next_request_id: RequestId,
    disposed: bool,
    dirty: bool,
}

impl<T> Default for PriceState<T> {
    fn default() -> Self {
        Self {
            fetch: FetchState::Idle,
            in_flight: None,
            next_request_id: 1,
            disposed: false,
            dirty: false,
        }
    }
}

impl<T> PriceState<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fetch_state(&self) -> &FetchState<T> {
        &self.fetch
    }

    pub fn in_flight(&self) -> Option<&InFlight> {
        self.in_flight.as_ref()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Returns whether the visible state changed since the last call.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn is_current(&self, request_id: RequestId) -> bool {
        self.in_flight
            .as_ref()
            .is_some_and(|flight| flight.request_id == request_id)
    }

    pub(crate) fn take_in_flight(&mut self) -> Option<InFlight> {
        self.in_flight.take()
    }

    pub(crate) fn begin_request(&mut self, key: RequestKey) -> RequestId {
        let request_id = self.next_request_id;
        self.next_request_id += 1;
        self.in_flight = Some(InFlight {
            request_id,
            key: key.clone(),
        });
        self.set_fetch(FetchState::Loading { key });
        request_id
    }

    pub(crate) fn set_idle(&mut self) {
        self.set_fetch(FetchState::Idle);
    }

    pub(crate) fn set_fetch(&mut self, fetch: FetchState<T>) {
        self.fetch = fetch;
        self.dirty = true;
    }

    pub(crate) fn mark_disposed(&mut self) {
        self.disposed = true;
    }
}
