use price_logging::{price_debug, price_warn};

use crate::{Effect, FetchFailure, FetchState, Msg, PriceState, RequestId};

/// Pure update function: applies a message to state and returns any effects.
pub fn update<T>(mut state: PriceState<T>, msg: Msg<T>) -> (PriceState<T>, Vec<Effect>) {
    let effects = match msg {
        Msg::KeyChanged(key) => {
            if state.is_disposed() {
                price_warn!("Ignoring key {:?} after dispose", key.symbol());
                return (state, Vec::new());
            }
            let mut effects = Vec::with_capacity(2);
            // Cancel before replace, even when the new key is empty.
            if let Some(previous) = state.take_in_flight() {
                effects.push(Effect::CancelFetch {
                    request_id: previous.request_id,
                });
            }
            if key.is_empty() {
                state.set_idle();
            } else {
                let request_id = state.begin_request(key.clone());
                price_debug!("Loading {} as request {}", key, request_id);
                effects.push(Effect::StartFetch { request_id, key });
            }
            effects
        }
        Msg::FetchCompleted { request_id, result } => {
            apply_completion(&mut state, request_id, result);
            Vec::new()
        }
        Msg::Disposed => {
            state.mark_disposed();
            state
                .take_in_flight()
                .map(|previous| Effect::CancelFetch {
                    request_id: previous.request_id,
                })
                .into_iter()
                .collect()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn apply_completion<T>(
    state: &mut PriceState<T>,
    request_id: RequestId,
    result: Result<T, FetchFailure>,
) {
    if !state.is_current(request_id) {
        price_debug!("Discarding completion of superseded request {}", request_id);
        return;
    }
    let Some(flight) = state.take_in_flight() else {
        return;
    };
    let key = flight.key;
    match result {
        Ok(data) => state.set_fetch(FetchState::Success { key, data }),
        Err(failure) if failure.is_cancellation() => {
            price_debug!("Request {} for {} was cancelled", request_id, key);
        }
        Err(failure) => {
            let message = failure.message();
            price_warn!("Request {} for {} failed: {}", request_id, key, message);
            state.set_fetch(FetchState::Failed { key, message });
        }
    }
}
