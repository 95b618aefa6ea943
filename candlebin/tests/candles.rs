mod helpers;

use std::sync::Arc;
use std::time::Duration;

use candlebin::{BucketWidth, Candlebin, CandlebinError, Granularity, InstrumentId};
use candlebin_mock::{MockBehavior, MockStore};
use helpers::*;

#[test]
fn build_requires_store_and_catalog() {
    let store = Arc::new(MockStore::new());
    let err = Candlebin::builder()
        .with_catalog(store.clone())
        .build()
        .err()
        .unwrap();
    assert!(matches!(err, CandlebinError::InvalidArg(_)));

    let err = Candlebin::builder().with_store(store).build().err().unwrap();
    assert!(matches!(err, CandlebinError::InvalidArg(_)));
}

#[test]
fn interval_delegates_to_resolver() {
    let (builder, _) = with_fixtures();
    let bin = builder.build().unwrap();
    let spec = tokio_test::assert_ok!(bin.interval(4320));
    assert_eq!(spec.source, Granularity::Daily);
    assert_eq!(spec.width, BucketWidth::days(3));
    let err = tokio_test::assert_err!(bin.interval(0));
    assert!(matches!(err, CandlebinError::InvalidInterval(_)));
}

#[tokio::test]
async fn three_minute_candles_from_fixtures() {
    let (builder, _) = with_fixtures();
    let bin = builder.build().unwrap();
    let series = bin.candles(&sym(AAPL), 3).await.unwrap();

    assert_eq!(series.symbol, sym(AAPL));
    assert_eq!(series.spec.source, Granularity::SubDay);
    assert_eq!(series.len(), 2);
    let first = &series.candles[0];
    assert_eq!(first.bucket_start, at(2024, 3, 4, 9, 30));
    assert_eq!(first.open, dec("10"));
    assert_eq!(first.high, dec("12.7"));
    assert_eq!(first.low, dec("9.9"));
    assert_eq!(first.close, dec("12.5"));
    assert_eq!(first.volume, dec("600"));
    assert_eq!(series.candles[1].bucket_start, at(2024, 3, 4, 9, 33));
}

#[tokio::test]
async fn whole_day_intervals_read_the_daily_series() {
    let (builder, _) = with_fixtures();
    let bin = builder.build().unwrap();

    let daily = bin.candles(&sym(AAPL), 1440).await.unwrap();
    assert_eq!(daily.spec.source, Granularity::Daily);
    assert_eq!(daily.len(), 5);
    assert!(daily.candles.iter().all(|c| c.samples == 1));

    let whole = bin.candles(&sym(AAPL), 1440 * 365).await.unwrap();
    assert_eq!(whole.len(), 1);
    assert_eq!(whole.candles[0].open, dec("176.15"));
    assert_eq!(whole.candles[0].close, dec("170.73"));
    assert_eq!(whole.candles[0].high, dec("176.9"));
    assert_eq!(whole.candles[0].low, dec("168.49"));
}

#[tokio::test]
async fn invalid_interval_fails_before_touching_the_store() {
    let (builder, store) = with_fixtures();
    let bin = builder.build().unwrap();
    for minutes in [0, -1, -1440] {
        let err = bin.candles(&sym(AAPL), minutes).await.unwrap_err();
        assert!(matches!(err, CandlebinError::InvalidInterval(_)));
    }
    assert_eq!(store.fetch_count(), 0);
}

#[tokio::test]
async fn unknown_symbol_is_reported() {
    let (builder, store) = with_fixtures();
    let bin = builder.build().unwrap();
    let err = bin.candles(&sym("NOPE"), 5).await.unwrap_err();
    assert_eq!(err, CandlebinError::unknown_symbol("NOPE"));
    assert!(err.is_client_error());
    assert_eq!(store.fetch_count(), 0);
}

#[tokio::test]
async fn instrument_without_data_is_an_empty_series() {
    let (builder, _) = with_fixtures();
    let bin = builder.build().unwrap();
    let series = bin.candles(&sym("EMPTY"), 60).await.unwrap();
    assert!(series.is_empty());
}

#[tokio::test]
async fn corrupt_records_surface_as_data_integrity() {
    let (builder, controller) = with_dynamic("BAD").await;
    let mut bad = flat(InstrumentId(1), at(2024, 3, 4, 9, 30), "10", 1);
    bad.volume = dec("-5");
    controller
        .set_fetch_behavior(InstrumentId(1), Granularity::SubDay, MockBehavior::Return(vec![bad]))
        .await;
    let bin = builder.build().unwrap();
    let err = bin.candles(&sym("BAD"), 5).await.unwrap_err();
    assert!(matches!(err, CandlebinError::DataIntegrity(_)));
    assert!(!err.is_client_error());
}

#[tokio::test]
async fn failures_are_not_cached() {
    let (builder, store) = with_fixtures();
    let bin = builder.build().unwrap();
    for _ in 0..2 {
        let err = bin.candles(&sym("FAIL"), 5).await.unwrap_err();
        assert!(matches!(err, CandlebinError::Store { .. }));
    }
    assert_eq!(store.fetch_count(), 2);
}

#[tokio::test]
async fn results_are_cached_until_invalidated() {
    let (builder, store) = with_fixtures();
    let bin = builder.build().unwrap();

    let a = bin.candles(&sym(MSFT), 15).await.unwrap();
    let b = bin.candles(&sym(MSFT), 15).await.unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(store.fetch_count(), 1);

    // A different interval is a different key.
    bin.candles(&sym(MSFT), 30).await.unwrap();
    assert_eq!(store.fetch_count(), 2);

    bin.invalidate(&sym(MSFT), 15).await.unwrap();
    let c = bin.candles(&sym(MSFT), 15).await.unwrap();
    assert!(!Arc::ptr_eq(&a, &c));
    assert_eq!(*a, *c);
    assert_eq!(store.fetch_count(), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_share_one_fetch() {
    let (builder, controller) = with_dynamic("HOT").await;
    let rows = (0..30)
        .map(|m| flat(InstrumentId(1), at(2024, 3, 4, 10, m), "5", 10))
        .collect();
    controller
        .set_fetch_behavior(
            InstrumentId(1),
            Granularity::SubDay,
            MockBehavior::Delay(Duration::from_millis(100), rows),
        )
        .await;
    let bin = Arc::new(builder.build().unwrap());

    let tasks = (0..20).map(|_| {
        let bin = Arc::clone(&bin);
        tokio::spawn(async move { bin.candles(&sym("HOT"), 15).await })
    });
    let results = futures::future::join_all(tasks).await;

    assert_eq!(controller.fetch_count(), 1);
    for r in results {
        let series = r.unwrap().unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.candles[0].volume, dec("150"));
    }
}

#[tokio::test(start_paused = true)]
async fn slow_store_times_out() {
    let (builder, _) = with_fixtures();
    let bin = builder
        .store_timeout(Duration::from_millis(50))
        .build()
        .unwrap();
    let err = bin.candles(&sym("SLOW"), 1).await.unwrap_err();
    assert_eq!(err, CandlebinError::store_timeout("candlebin-mock", "fetch-prices"));
}

#[tokio::test(start_paused = true)]
async fn request_deadline_bounds_the_whole_call() {
    let (builder, controller) = with_dynamic("STUCK").await;
    controller
        .set_fetch_behavior(InstrumentId(1), Granularity::Daily, MockBehavior::Hang)
        .await;
    let bin = builder
        .store_timeout(Duration::from_secs(30))
        .request_timeout(Duration::from_millis(200))
        .build()
        .unwrap();
    let err = bin.candles(&sym("STUCK"), 1440).await.unwrap_err();
    assert_eq!(err, CandlebinError::request_timeout("candles"));
    assert!(err.is_timeout());
}
