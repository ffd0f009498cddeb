use crate::{RequestId, RequestKey};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StartFetch { request_id: RequestId, key: RequestKey },
    CancelFetch { request_id: RequestId },
}
