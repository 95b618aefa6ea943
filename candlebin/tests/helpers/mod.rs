#![allow(dead_code)]

use std::str::FromStr;
use std::sync::Arc;

use candlebin::{Candlebin, CandlebinBuilder, InstrumentId, PriceRecord, Symbol};
use candlebin_mock::{DynamicMockController, DynamicMockStore, MockStore};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

pub const AAPL: &str = "AAPL";
pub const MSFT: &str = "MSFT";

pub fn sym(s: &str) -> Symbol {
    Symbol::new(s).unwrap()
}

pub fn at(y: i32, m: u32, d: u32, hh: u32, mm: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(hh, mm, 0)
        .unwrap()
}

pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// A flat record (`open == high == low == close`) for readability in tests.
pub fn flat(id: InstrumentId, ts: NaiveDateTime, price: &str, volume: i64) -> PriceRecord {
    let p = dec(price);
    PriceRecord {
        instrument_id: id,
        timestamp: ts,
        open: p,
        high: p,
        low: p,
        close: p,
        volume: Decimal::from(volume),
    }
}

/// Builder wired to the static fixture store for both store and catalog.
pub fn with_fixtures() -> (CandlebinBuilder, Arc<MockStore>) {
    let store = Arc::new(MockStore::new());
    let builder = Candlebin::builder()
        .with_store(store.clone())
        .with_catalog(store.clone());
    (builder, store)
}

/// Builder wired to a scripted store; `symbol` is registered as instrument 1.
pub async fn with_dynamic(symbol: &str) -> (CandlebinBuilder, DynamicMockController) {
    let (store, controller) = DynamicMockStore::new_with_controller("dyn");
    controller.set_symbol(sym(symbol), InstrumentId(1)).await;
    let builder = Candlebin::builder()
        .with_store(store.clone())
        .with_catalog(store);
    (builder, controller)
}
