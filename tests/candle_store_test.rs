use common_test_utils::*;

use market_vibe::candle_store::CandleStore;
use market_vibe::indicator::IndicatorEngine;
use market_vibe::model::Candle;

#[test]
fn test_new_empty_store() {
    let store = CandleStore::<TestCandle>::new(Vec::new(), 100);
    assert!(store.is_empty());
    assert_eq!(store.len(), 0);
    assert_eq!(store.max_size, 100);
    assert!(store.latest().is_none());
}

#[test]
fn test_new_with_items_sorted_ascending() {
    let candles = vec![
        TestCandle::new(1, 100.0, 105.0, 95.0, 102.0, 1000.0),
        TestCandle::new(3, 110.0, 115.0, 105.0, 112.0, 1000.0),
        TestCandle::new(2, 105.0, 110.0, 100.0, 107.0, 1000.0),
    ];

    let store = CandleStore::new(candles, 100);

    assert_eq!(store.len(), 3);
    assert_eq!(store.first().unwrap().timestamp(), 1);
    assert_eq!(store.get(1).unwrap().timestamp(), 2);
    assert_eq!(store.latest().unwrap().timestamp(), 3);
}

#[test]
fn test_new_drops_duplicates_keeping_first() {
    let candles = vec![
        TestCandle::new(2, 105.0, 110.0, 100.0, 107.0, 1000.0),
        TestCandle::new(1, 100.0, 105.0, 95.0, 102.0, 1000.0),
        TestCandle::new(2, 0.0, 0.0, 0.0, 0.0, 0.0),
    ];

    let store = CandleStore::new(candles, 100);

    assert_eq!(store.len(), 2);
    assert_eq!(store.latest().unwrap().close, 107.0);
}

#[test]
fn test_new_max_size_limit_keeps_latest() {
    let candles: Vec<TestCandle> = (0..10)
        .map(|i| TestCandle::new(i, 100.0, 105.0, 95.0, 102.0, 1000.0))
        .collect();

    let store = CandleStore::new(candles, 5);

    assert_eq!(store.len(), 5);
    assert_eq!(store.first().unwrap().timestamp(), 5);
    assert_eq!(store.latest().unwrap().timestamp(), 9);
}

#[test]
fn test_add_maintains_ascending_order() {
    let mut store = CandleStore::<TestCandle>::new(Vec::new(), 100);

    assert!(store.add(TestCandle::new(1, 100.0, 105.0, 95.0, 102.0, 1000.0)));
    assert!(store.add(TestCandle::new(3, 110.0, 115.0, 105.0, 112.0, 1000.0)));
    assert!(store.add(TestCandle::new(2, 105.0, 110.0, 100.0, 107.0, 1000.0)));

    let timestamps: Vec<i64> = store.items().iter().map(|c| c.timestamp()).collect();
    assert_eq!(timestamps, vec![1, 2, 3]);
}

#[test]
fn test_add_ignores_duplicate_timestamp() {
    let mut store = CandleStore::new(vec![TestCandle::new(1, 1.0, 1.0, 1.0, 1.0, 1.0)], 100);

    assert!(!store.add(TestCandle::new(1, 9.0, 9.0, 9.0, 9.0, 9.0)));
    assert_eq!(store.len(), 1);
    assert_eq!(store.latest().unwrap().close, 1.0);
}

#[test]
fn test_add_beyond_max_size_drops_oldest() {
    let mut store = CandleStore::<TestCandle>::new(Vec::new(), 3);
    for i in 0..5 {
        store.add(TestCandle::new(i, 1.0, 1.0, 1.0, 1.0, 1.0));
    }

    assert_eq!(store.len(), 3);
    assert_eq!(store.first().unwrap().timestamp(), 2);
}

#[test]
fn test_engine_computes_from_storage() {
    let mut bars = to_test_candles(&create_uptrend_candles(60, 100.0, 1.0));
    bars.reverse();
    let store = CandleStore::unbounded(bars.clone());

    let engine = IndicatorEngine::default();
    let from_store = engine.compute_from_storage(&store);
    bars.reverse();
    let from_slice = engine.compute(&bars);

    assert_eq!(from_store, from_slice);
    assert_eq!(from_store.input_len(), 60);
}
