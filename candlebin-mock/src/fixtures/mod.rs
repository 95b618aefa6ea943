use candlebin_core::{Granularity, InstrumentId, PriceRecord};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

mod daily;
mod minute;

pub const CATALOG: &[(&str, i64)] = &[
    ("AAPL", 1),
    ("MSFT", 2),
    ("EMPTY", 3),
    ("FAIL", 4),
    ("SLOW", 5),
];

pub fn instrument_for(symbol: &str) -> Option<InstrumentId> {
    CATALOG
        .iter()
        .find(|(s, _)| *s == symbol)
        .map(|(_, id)| InstrumentId(*id))
}

pub fn symbol_for(id: InstrumentId) -> Option<&'static str> {
    CATALOG.iter().find(|(_, i)| *i == id.0).map(|(s, _)| *s)
}

pub fn records(id: InstrumentId, granularity: Granularity) -> Vec<PriceRecord> {
    let Some(symbol) = symbol_for(id) else {
        return Vec::new();
    };
    let rows = match granularity {
        Granularity::SubDay => minute::by_symbol(symbol),
        Granularity::Daily => daily::by_symbol(symbol),
    };
    rows.into_iter()
        .map(|(ts, o, h, l, c, v)| PriceRecord {
            instrument_id: id,
            timestamp: ts,
            open: dec(o),
            high: dec(h),
            low: dec(l),
            close: dec(c),
            volume: Decimal::from(v),
        })
        .collect()
}

pub type Row = (NaiveDateTime, &'static str, &'static str, &'static str, &'static str, i64);

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn at(date: &str, time: &str) -> NaiveDateTime {
    let d = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
    let t = chrono::NaiveTime::parse_from_str(time, "%H:%M:%S").unwrap();
    d.and_time(t)
}
