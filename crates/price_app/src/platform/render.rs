use chrono::{DateTime, Utc};
use price_core::PriceView;

/// Turns a view into the lines printed for one frame.
pub fn render(path: &str, view: &PriceView, default_quote: &str, now: DateTime<Utc>) -> Vec<String> {
    let mut lines = vec![format!("[{}] {}", now.format("%H:%M:%S"), path)];
    match view {
        PriceView::Home { coins } => {
            lines.push("Coins:".to_string());
            for coin in coins {
                lines.push(format!("  {:<5} {:<10} {}", coin.symbol, coin.name, coin.path));
            }
        }
        PriceView::NotFound { path } => {
            lines.push(format!("Page not found: {path}"));
            lines.push("Try / or /coin/<SYMBOL>".to_string());
        }
        PriceView::Idle => lines.push("Pick a coin: /coin/<SYMBOL>".to_string()),
        PriceView::Loading { symbol } => lines.push(format!("Loading {symbol}...")),
        PriceView::Price {
            symbol,
            name,
            quote,
            rate,
            raw,
        } => {
            let label = match name {
                Some(name) => format!("{symbol} ({name})"),
                None => symbol.clone(),
            };
            let quote = quote.as_deref().unwrap_or(default_quote);
            match rate {
                Some(rate) => lines.push(format!("{label}: {rate:.2} {quote}")),
                None => lines.push(format!("{label}: no rate in response {raw}")),
            }
        }
        PriceView::Error { symbol, message } => {
            lines.push(format!("Error loading {symbol}: {message}"));
        }
    }
    lines
}
