use candlebin_types::{CacheConfig, CandlebinConfig, CandlebinError, Capability};

#[test]
fn candlebin_config_roundtrip() {
    let cfg = CandlebinConfig {
        store_timeout: std::time::Duration::from_millis(2500),
        request_timeout: Some(std::time::Duration::from_secs(30)),
        cache: CacheConfig {
            max_entries: 64,
            ttl: Some(std::time::Duration::from_secs(600)),
        },
    };

    let json = serde_json::to_string(&cfg).expect("serialize config");
    let de: CandlebinConfig = serde_json::from_str(&json).expect("deserialize config");

    assert_eq!(de, cfg);
    assert_eq!(de.store_timeout.as_millis(), 2500);
    assert_eq!(de.cache.max_entries, 64);
}

#[test]
fn defaults_are_conservative() {
    let cfg = CandlebinConfig::default();
    assert_eq!(cfg.store_timeout.as_secs(), 5);
    assert!(cfg.request_timeout.is_none());
    assert_eq!(cfg.cache.max_entries, 1024);
    assert!(cfg.cache.ttl.is_none());
}

#[test]
fn error_roundtrip_preserves_variant() {
    let errs = vec![
        CandlebinError::InvalidInterval("0".into()),
        CandlebinError::unknown_symbol("ZZZZ"),
        CandlebinError::DataIntegrity("negative volume".into()),
        CandlebinError::store_timeout("sqlite", Capability::FetchPrices.as_str()),
    ];
    for e in errs {
        let json = serde_json::to_string(&e).expect("serialize error");
        let de: CandlebinError = serde_json::from_str(&json).expect("deserialize error");
        assert_eq!(de, e);
    }
}

#[test]
fn capability_labels_are_kebab_case() {
    assert_eq!(Capability::FetchPrices.to_string(), "fetch-prices");
    assert_eq!(Capability::ResolveSymbol.to_string(), "resolve-symbol");
    assert_eq!(Capability::Export.as_str(), "export");
}
