//! Price watch core: pure fetch lifecycle state machine, routing table and
//! view-model helpers.
mod effect;
mod failure;
mod key;
mod msg;
mod route;
mod state;
mod update;
mod view_model;

/// Opaque response body handed through to `FetchState::Success`.
pub type PricePayload = serde_json::Value;

pub use effect::Effect;
pub use failure::FetchFailure;
pub use key::{KeyGate, RequestId, RequestKey};
pub use msg::Msg;
pub use route::{coin_name, coin_path, Coin, Route, COINS};
pub use state::{FetchState, InFlight, PriceState};
pub use update::update;
pub use view_model::{price_view, CoinLink, PriceView};
