use crate::RequestKey;

/// Routing table: `/` lists coins, `/coin/<SYMBOL>` shows one price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Coin { key: RequestKey },
    NotFound { path: String },
}

impl Route {
    pub fn parse(path: &str) -> Self {
        let trimmed = path.trim();
        let segments: Vec<&str> = trimmed.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Route::Home,
            ["coin"] => Route::Coin {
                key: RequestKey::empty(),
            },
            ["coin", symbol] => Route::Coin {
                key: RequestKey::new(symbol),
            },
            _ => Route::NotFound {
                path: trimmed.to_string(),
            },
        }
    }

    /// The key the fetch controller should follow on this route. Empty for
    /// every route without a dynamic segment.
    pub fn request_key(&self) -> RequestKey {
        match self {
            Route::Coin { key } => key.clone(),
            Route::Home | Route::NotFound { .. } => RequestKey::empty(),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Coin { key } => coin_path(key.symbol()),
            Route::NotFound { path } => path.clone(),
        }
    }
}

pub fn coin_path(symbol: &str) -> String {
    format!("/coin/{symbol}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coin {
    pub symbol: &'static str,
    pub name: &'static str,
}

/// Static list shown on the home route.
pub const COINS: &[Coin] = &[
    Coin {
        symbol: "BTC",
        name: "Bitcoin",
    },
    Coin {
        symbol: "ETH",
        name: "Ethereum",
    },
    Coin {
        symbol: "SOL",
        name: "Solana",
    },
    Coin {
        symbol: "ADA",
        name: "Cardano",
    },
    Coin {
        symbol: "DOGE",
        name: "Dogecoin",
    },
];

pub fn coin_name(symbol: &str) -> Option<&'static str> {
    COINS
        .iter()
        .find(|coin| coin.symbol.eq_ignore_ascii_case(symbol))
        .map(|coin| coin.name)
}
