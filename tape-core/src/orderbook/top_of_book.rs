//! Per-symbol best bid/ask with market and limit matching

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::core::{
    is_valid_price, Price, Quantity, QuoteEvent, Side, INVALID_PRICE, PRICE_EPSILON,
};

/// One resting level: price and remaining size, both strictly positive while
/// the level exists.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Level {
    pub px: Price,
    pub sz: Quantity,
}

/// Best bid and best ask for a single symbol. Each side is independently
/// present or absent; a consumed side clears rather than resting at zero.
#[derive(Debug, Clone, Default)]
pub struct TopOfBook {
    symbol: String,
    bid: Option<Level>,
    ask: Option<Level>,
}

impl TopOfBook {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            bid: None,
            ask: None,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bid(&self) -> Option<Level> {
        self.bid
    }

    pub fn ask(&self) -> Option<Level> {
        self.ask
    }

    /// Overwrite both sides from a quote. A side with non-positive price or
    /// zero size clears; trades never reach this store.
    pub fn update_from_quote(&mut self, quote: &QuoteEvent) {
        if quote.symbol != self.symbol {
            return;
        }

        // NaN fails the positivity check, so the invalid sentinel clears too.
        self.bid = (quote.bid_px > 0.0 && quote.bid_sz > 0).then_some(Level {
            px: quote.bid_px,
            sz: quote.bid_sz,
        });
        self.ask = (quote.ask_px > 0.0 && quote.ask_sz > 0).then_some(Level {
            px: quote.ask_px,
            sz: quote.ask_sz,
        });
    }

    /// Match a market order against the opposite top. Returns the fill price
    /// and quantity; `(INVALID_PRICE, 0)` when the required side is absent.
    /// The consumed level shrinks and clears when it reaches zero.
    pub fn match_market(&mut self, side: Side, quantity: Quantity) -> (Price, Quantity) {
        if quantity == 0 {
            return (INVALID_PRICE, 0);
        }

        let level = match side {
            Side::Buy => &mut self.ask,
            Side::Sell => &mut self.bid,
        };

        let Some(top) = level.as_mut() else {
            warn!(
                symbol = %self.symbol,
                %side,
                "cannot match market order, no liquidity on opposite side"
            );
            return (INVALID_PRICE, 0);
        };

        let fill_px = top.px;
        let fill_qty = quantity.min(top.sz);
        top.sz -= fill_qty;
        if top.sz == 0 {
            *level = None;
        }

        debug!(
            symbol = %self.symbol,
            %side,
            fill_qty,
            fill_px,
            "matched market order"
        );
        (fill_px, fill_qty)
    }

    /// Match a limit order. Aggressive limits (crossing the opposite top
    /// within epsilon) fill exactly like market orders at the resting top
    /// price, not at the limit. Passive limits return `(INVALID_PRICE, 0)`
    /// and are not retained.
    pub fn match_limit(
        &mut self,
        side: Side,
        limit_px: Price,
        quantity: Quantity,
    ) -> (Price, Quantity) {
        if quantity == 0 || !is_valid_price(limit_px) {
            return (INVALID_PRICE, 0);
        }

        let aggressive = match side {
            Side::Buy => self
                .ask
                .map(|ask| limit_px >= ask.px - PRICE_EPSILON)
                .unwrap_or(false),
            Side::Sell => self
                .bid
                .map(|bid| limit_px <= bid.px + PRICE_EPSILON)
                .unwrap_or(false),
        };

        if !aggressive {
            debug!(
                symbol = %self.symbol,
                %side,
                limit_px,
                quantity,
                "limit order is passive or unfillable"
            );
            return (INVALID_PRICE, 0);
        }

        self.match_market(side, quantity)
    }
}

/// Symbol-keyed collection of books, created lazily on first reference.
/// Single-threaded by construction: only the dispatch loop touches it.
#[derive(Debug, Default)]
pub struct BookStore {
    books: HashMap<String, TopOfBook>,
}

impl BookStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn book_mut(&mut self, symbol: &str) -> &mut TopOfBook {
        if !self.books.contains_key(symbol) {
            debug!(symbol, "creating book");
        }
        self.books
            .entry(symbol.to_string())
            .or_insert_with(|| TopOfBook::new(symbol))
    }

    pub fn book(&self, symbol: &str) -> Option<&TopOfBook> {
        self.books.get(symbol)
    }

    pub fn apply_quote(&mut self, quote: &QuoteEvent) {
        self.book_mut(&quote.symbol).update_from_quote(quote);
    }
}
