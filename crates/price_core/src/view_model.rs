use crate::route::{coin_name, coin_path, COINS};
use crate::{FetchState, PricePayload, Route};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoinLink {
    pub symbol: &'static str,
    pub name: &'static str,
    pub path: String,
}

/// One branch per thing the renderer can show.
#[derive(Debug, Clone, PartialEq)]
pub enum PriceView {
    Home {
        coins: Vec<CoinLink>,
    },
    NotFound {
        path: String,
    },
    Idle,
    Loading {
        symbol: String,
    },
    Price {
        symbol: String,
        name: Option<&'static str>,
        quote: Option<String>,
        rate: Option<f64>,
        raw: String,
    },
    Error {
        symbol: String,
        message: String,
    },
}

pub fn price_view(route: &Route, fetch: &FetchState<PricePayload>) -> PriceView {
    match route {
        Route::Home => PriceView::Home {
            coins: COINS
                .iter()
                .map(|coin| CoinLink {
                    symbol: coin.symbol,
                    name: coin.name,
                    path: coin_path(coin.symbol),
                })
                .collect(),
        },
        Route::NotFound { path } => PriceView::NotFound { path: path.clone() },
        Route::Coin { .. } => fetch_view(fetch),
    }
}

fn fetch_view(fetch: &FetchState<PricePayload>) -> PriceView {
    match fetch {
        FetchState::Idle => PriceView::Idle,
        FetchState::Loading { key } => PriceView::Loading {
            symbol: key.symbol().to_string(),
        },
        FetchState::Success { key, data } => PriceView::Price {
            symbol: key.symbol().to_string(),
            name: coin_name(key.symbol()),
            quote: data
                .get("asset_id_quote")
                .and_then(|value| value.as_str())
                .map(ToOwned::to_owned),
            rate: data.get("rate").and_then(|value| value.as_f64()),
            raw: data.to_string(),
        },
        FetchState::Failed { key, message } => PriceView::Error {
            symbol: key.symbol().to_string(),
            message: message.clone(),
        },
    }
}
