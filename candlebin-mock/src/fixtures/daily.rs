use super::{Row, at};

pub fn by_symbol(s: &str) -> Vec<Row> {
    match s {
        "AAPL" => vec![
            (at("2024-03-04", "00:00:00"), "176.15", "176.9", "173.79", "175.1", 81_510_100),
            (at("2024-03-05", "00:00:00"), "170.76", "172.04", "169.62", "170.12", 95_132_400),
            (at("2024-03-06", "00:00:00"), "171.06", "171.24", "168.68", "169.12", 68_587_700),
            (at("2024-03-07", "00:00:00"), "169.15", "170.73", "168.49", "169", 71_765_100),
            (at("2024-03-08", "00:00:00"), "169", "173.7", "168.94", "170.73", 76_114_600),
        ],
        "MSFT" => vec![
            (at("2024-03-04", "00:00:00"), "413.44", "417.35", "412.32", "414.92", 17_596_000),
            (at("2024-03-05", "00:00:00"), "413.96", "414.25", "400.64", "402.65", 26_919_200),
        ],
        _ => Vec::new(),
    }
}
