//! Price watch engine: HTTP transport and the cancellable fetch controller.
mod controller;
mod fetch;

pub use controller::FetchController;
pub use fetch::{FetchSettings, PriceFetcher, ReqwestFetcher, API_KEY_HEADER, DEFAULT_BASE_URL};
pub use tokio_util::sync::CancellationToken;
