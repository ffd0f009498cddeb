use crate::{FetchFailure, PricePayload, RequestId, RequestKey};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg<T = PricePayload> {
    /// The route's key changed (including the initial value).
    KeyChanged(RequestKey),
    /// The transport finished a request, successfully or not.
    FetchCompleted {
        request_id: RequestId,
        result: Result<T, FetchFailure>,
    },
    /// The owning scope is going away.
    Disposed,
    /// Fallback for placeholder wiring.
    NoOp,
}
