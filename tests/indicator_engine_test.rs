use common_test_utils::*;

use market_vibe::indicator::config::IndicatorConfig;
use market_vibe::indicator::{IndicatorEngine, IndicatorFamily, IndicatorResults, compute_all};
use market_vibe::model::Ohlcv;

/// 모든 계열의 timestamp 목록
fn timestamps_of(results: &IndicatorResults, family: IndicatorFamily) -> Vec<i64> {
    fn ts<T>(series: &Option<Vec<T>>, f: impl Fn(&T) -> i64) -> Vec<i64> {
        series.iter().flatten().map(f).collect()
    }

    match family {
        IndicatorFamily::RSI => ts(&results.rsi, |p| p.timestamp),
        IndicatorFamily::MACD => ts(&results.macd, |p| p.timestamp),
        IndicatorFamily::SMA(period) => results
            .sma
            .get(&period)
            .map(|s| s.iter().map(|p| p.timestamp).collect())
            .unwrap_or_default(),
        IndicatorFamily::EMA(period) => results
            .ema
            .get(&period)
            .map(|s| s.iter().map(|p| p.timestamp).collect())
            .unwrap_or_default(),
        IndicatorFamily::BollingerBands => ts(&results.bb, |p| p.timestamp),
        IndicatorFamily::Stochastic => ts(&results.stochastic, |p| p.timestamp),
        IndicatorFamily::ADX => ts(&results.adx, |p| p.timestamp),
        IndicatorFamily::ATR => ts(&results.atr, |p| p.timestamp),
        IndicatorFamily::CCI => ts(&results.cci, |p| p.timestamp),
        IndicatorFamily::WilliamsR => ts(&results.williams_r, |p| p.timestamp),
        IndicatorFamily::OBV => ts(&results.obv, |p| p.timestamp),
        IndicatorFamily::PSAR => ts(&results.psar, |p| p.timestamp),
        IndicatorFamily::Volume => ts(&results.volume, |p| p.timestamp),
    }
}

#[test]
fn test_every_family_aligned_to_input_suffix() {
    let bars = create_sideways_candles(250, 100.0, 8.0);
    let results = compute_all(&bars);

    let families = results.available_families();
    assert_eq!(families.len(), 16);

    for family in families {
        let warm_up = results.warm_up_of(family).unwrap();
        let expected: Vec<i64> = bars[warm_up..].iter().map(|b| b.timestamp).collect();
        assert_eq!(timestamps_of(&results, family), expected, "{}", family);
    }
}

#[test]
fn test_default_warm_ups() {
    let results = compute_all(&create_uptrend_candles(250, 100.0, 1.0));

    let expected = [
        (IndicatorFamily::RSI, 14),
        (IndicatorFamily::MACD, 33),
        (IndicatorFamily::SMA(20), 19),
        (IndicatorFamily::SMA(50), 49),
        (IndicatorFamily::SMA(200), 199),
        (IndicatorFamily::EMA(12), 11),
        (IndicatorFamily::EMA(26), 25),
        (IndicatorFamily::BollingerBands, 19),
        (IndicatorFamily::Stochastic, 15),
        (IndicatorFamily::ADX, 27),
        (IndicatorFamily::ATR, 14),
        (IndicatorFamily::CCI, 19),
        (IndicatorFamily::WilliamsR, 13),
        (IndicatorFamily::OBV, 0),
        (IndicatorFamily::PSAR, 0),
        (IndicatorFamily::Volume, 19),
    ];
    for (family, warm_up) in expected {
        assert_eq!(results.warm_up_of(family), Some(warm_up), "{}", family);
    }
}

#[test]
fn test_value_ranges() {
    let bars = create_sideways_candles(120, 50.0, 6.0);
    let results = compute_all(&bars);

    for p in results.rsi.as_ref().unwrap() {
        assert!((0.0..=100.0).contains(&p.value));
    }
    for p in results.stochastic.as_ref().unwrap() {
        assert!((0.0..=100.0).contains(&p.k));
        assert!((0.0..=100.0).contains(&p.d));
    }
    for p in results.williams_r.as_ref().unwrap() {
        assert!((-100.0..=0.0).contains(&p.value));
    }
    for p in results.adx.as_ref().unwrap() {
        assert!((0.0..=100.0).contains(&p.adx));
    }
    for p in results.atr.as_ref().unwrap() {
        assert!(p.value >= 0.0);
    }
    for p in results.bb.as_ref().unwrap() {
        assert!(p.lower <= p.middle && p.middle <= p.upper);
    }
}

#[test]
fn test_bollinger_middle_equals_sma() {
    let bars = create_sideways_candles(80, 100.0, 10.0);
    let results = compute_all(&bars);

    let bb = results.bb.as_ref().unwrap();
    let sma = results.sma.get(&20).unwrap();
    assert_eq!(bb.len(), sma.len());
    for (band, ma) in bb.iter().zip(sma) {
        assert_eq!(band.timestamp, ma.timestamp);
        assert_eq!(band.middle, ma.value);
    }
}

#[test]
fn test_obv_non_decreasing_on_rising_closes() {
    let results = compute_all(&create_uptrend_candles(40, 10.0, 0.5));
    let obv = results.obv.as_ref().unwrap();

    assert_eq!(obv[0].value, 0.0);
    assert!(obv.windows(2).all(|w| w[1].value >= w[0].value));
}

#[test]
fn test_obv_non_increasing_on_falling_closes() {
    let results = compute_all(&create_downtrend_candles(40, 100.0, 0.5));
    let obv = results.obv.as_ref().unwrap();

    assert_eq!(obv[0].value, 0.0);
    assert!(obv.windows(2).all(|w| w[1].value <= w[0].value));
    assert_eq!(obv.last().unwrap().value, -39.0 * 1000.0);
}

#[test]
fn test_compute_is_idempotent() {
    let bars = create_sideways_candles(220, 100.0, 4.0);
    assert_eq!(compute_all(&bars), compute_all(&bars));
}

#[test]
fn test_generic_over_candle_type() {
    let bars = create_downtrend_candles(100, 500.0, 2.0);
    let test_bars = to_test_candles(&bars);
    assert_eq!(compute_all(&bars), compute_all(&test_bars));
}

#[test]
fn test_flat_series() {
    let results = compute_all(&create_flat_candles(60, 25.0));

    assert!(results.rsi.as_ref().unwrap().iter().all(|p| p.value == 50.0));
    assert!(results.bb.as_ref().unwrap().iter().all(|p| p.upper == p.lower));
    assert!(results.williams_r.as_ref().unwrap().iter().all(|p| p.value == -50.0));
    assert!(results.cci.as_ref().unwrap().iter().all(|p| p.value == 0.0));
    assert!(results.stochastic.as_ref().unwrap().iter().all(|p| p.k == 0.0));
    assert!(results.atr.as_ref().unwrap().iter().all(|p| p.value == 0.0));
    assert!(results.obv.as_ref().unwrap().iter().all(|p| p.value == 0.0));
}

#[test]
fn test_fourteen_bars() {
    let results = compute_all(&create_uptrend_candles(14, 100.0, 1.0));

    assert!(results.rsi.is_none());
    assert!(results.macd.is_none());
    assert!(results.sma.is_empty());
    assert!(results.bb.is_none());
    assert!(results.adx.is_none());
    assert!(results.williams_r.is_some());
    assert!(results.ema.get(&12).is_some());
    assert!(results.ema.get(&26).is_none());
}

#[test]
fn test_downtrend_indicators() {
    let results = compute_all(&create_downtrend_candles(100, 500.0, 2.0));

    assert_eq!(results.latest_rsi().unwrap().value, 0.0);
    assert!(results.latest_macd().unwrap().macd < 0.0);
    let adx = results.latest_adx().unwrap();
    assert!(adx.mdi > adx.pdi);
    assert!(results.latest_obv().unwrap().value < 0.0);
}

#[test]
fn test_custom_config_periods() {
    let mut config = IndicatorConfig::default();
    config.sma.periods = vec![5, 10];
    config.rsi.period = 7;
    let engine = IndicatorEngine::new(config).unwrap();

    let results = engine.compute(&create_uptrend_candles(30, 100.0, 1.0));
    assert_eq!(results.sma.get_keys(), &[5, 10]);
    assert_eq!(results.warm_up_of(IndicatorFamily::RSI), Some(7));
    assert_eq!(results.warm_up_of(IndicatorFamily::SMA(10)), Some(9));
}

#[test]
fn test_invalid_config_rejected() {
    let mut config = IndicatorConfig::default();
    config.macd.fast_period = 30;
    assert!(IndicatorEngine::new(config).is_err());
}

#[test]
fn test_empty_input() {
    let results = compute_all::<Ohlcv>(&[]);
    assert!(results.is_empty());
    assert!(results.latest_rsi().is_none());
}
