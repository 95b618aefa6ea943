use super::{Row, at};

pub fn by_symbol(s: &str) -> Vec<Row> {
    match s {
        "AAPL" => vec![
            (at("2024-03-04", "09:30:00"), "10", "10.6", "9.9", "10.5", 100),
            (at("2024-03-04", "09:31:00"), "11", "11.6", "10.9", "11.5", 200),
            (at("2024-03-04", "09:32:00"), "12", "12.7", "11.9", "12.5", 300),
            (at("2024-03-04", "09:33:00"), "12.5", "12.9", "12.2", "12.4", 150),
            (at("2024-03-04", "09:34:00"), "12.4", "12.6", "12.0", "12.1", 120),
            (at("2024-03-04", "09:35:00"), "12.1", "12.3", "11.8", "11.9", 180),
        ],
        "MSFT" => vec![
            (at("2024-03-04", "09:30:00"), "400", "401.5", "399.2", "401", 1_000),
            (at("2024-03-04", "09:31:00"), "401", "402", "400.5", "401.8", 800),
            (at("2024-03-04", "09:45:00"), "402", "403.1", "401.7", "403", 650),
        ],
        "SLOW" => vec![(at("2024-03-04", "09:30:00"), "1", "1", "1", "1", 1)],
        _ => Vec::new(),
    }
}
