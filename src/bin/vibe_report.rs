use log::{debug, error, info};
use market_vibe::candle_store::CandleStore;
use market_vibe::config_loader::{ConfigFormat, ConfigLoader};
use market_vibe::indicator::config::IndicatorConfig;
use market_vibe::indicator::{IndicatorEngine, IndicatorFamily, IndicatorResults};
use market_vibe::model::{Candle, Ohlcv};
use market_vibe::sentiment::{self, MIN_SCORING_BARS};
use serde_json::{Map, Value, json};
use std::env;
use std::path::Path;
use std::process;

/// 계열별 최신 값을 JSON 으로 변환
fn latest_values(results: &IndicatorResults) -> Map<String, Value> {
    let mut latest = Map::new();

    for family in results.available_families() {
        let value = match family {
            IndicatorFamily::RSI => json!(results.latest_rsi()),
            IndicatorFamily::MACD => json!(results.latest_macd()),
            IndicatorFamily::SMA(period) => json!(results.latest_sma(period)),
            IndicatorFamily::EMA(period) => json!(results.latest_ema(period)),
            IndicatorFamily::BollingerBands => json!(results.latest_bb()),
            IndicatorFamily::Stochastic => json!(results.latest_stochastic()),
            IndicatorFamily::ADX => json!(results.latest_adx()),
            IndicatorFamily::ATR => json!(results.latest_atr()),
            IndicatorFamily::CCI => json!(results.latest_cci()),
            IndicatorFamily::WilliamsR => json!(results.latest_williams_r()),
            IndicatorFamily::OBV => json!(results.latest_obv()),
            IndicatorFamily::PSAR => json!(results.latest_psar()),
            IndicatorFamily::Volume => json!(results.latest_volume()),
        };
        latest.insert(family.to_string(), value);
    }

    latest
}

/// 계열별 워밍업 길이
fn warm_ups(results: &IndicatorResults) -> Map<String, Value> {
    results
        .available_families()
        .into_iter()
        .filter_map(|family| {
            results
                .warm_up_of(family)
                .map(|warm_up| (family.to_string(), json!(warm_up)))
        })
        .collect()
}

/// 점수를 계산할 수 없는 이유
fn skip_reason(results: &IndicatorResults, bars: &[Ohlcv], current_price: f64) -> String {
    if bars.len() < MIN_SCORING_BARS {
        format!("캔들 부족: {} < {}", bars.len(), MIN_SCORING_BARS)
    } else if current_price == 0.0 || current_price.is_nan() {
        format!("잘못된 현재가: {}", current_price)
    } else if results.rsi.is_none() && results.macd.is_none() && results.sma.is_empty() {
        "RSI/MACD/SMA 지표 없음".to_owned()
    } else {
        "알 수 없음".to_owned()
    }
}

fn load_bars(path: &Path) -> Result<Vec<Ohlcv>, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("캔들 파일 읽기 실패: {} - {}", path.display(), e))?;
    serde_json::from_str(&content).map_err(|e| format!("캔들 파일 파싱 실패: {}", e))
}

fn run(args: &[String]) -> Result<Value, String> {
    let bars_path = Path::new(&args[1]);
    let loaded = load_bars(bars_path)?;
    let loaded_len = loaded.len();
    info!("캔들 {}개 로드: {}", loaded_len, bars_path.display());

    // 시간순 정렬, 같은 timestamp 는 첫 번째만 유지
    let bars = CandleStore::unbounded(loaded).into_items();
    if bars.len() < loaded_len {
        info!("중복 timestamp 캔들 {}개 제외", loaded_len - bars.len());
    }

    let config = match args.get(2) {
        Some(path) => {
            debug!("사용자 지정 설정 파일 사용: {}", path);
            ConfigLoader::load_from_file::<IndicatorConfig>(Path::new(path), ConfigFormat::Auto)
                .map_err(|e| e.to_string())?
        }
        None => IndicatorConfig::default(),
    };
    let engine = IndicatorEngine::new(config).map_err(|e| e.to_string())?;

    let current_price = match args.get(3) {
        Some(price) => price
            .parse::<f64>()
            .map_err(|e| format!("현재가 파싱 실패: {} - {}", price, e))?,
        None => bars.last().map(|bar| bar.close).unwrap_or_default(),
    };

    let results = engine.compute(&bars);
    let vibe = sentiment::score(&results, &bars, current_price);

    let mut report = json!({
        "loaded_bars": loaded_len,
        "bars": bars.len(),
        "input_len": results.input_len(),
        "current_price": current_price,
        "last_bar": bars.last().map(|bar| bar.datetime().to_rfc3339()),
        "latest": latest_values(&results),
        "warm_up": warm_ups(&results),
        "vibe": vibe,
    });

    if vibe.is_none() {
        report["reason"] = json!(skip_reason(&results, &bars, current_price));
    }

    Ok(report)
}

fn main() {
    // 로그 초기화
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    debug!("커맨드 라인 인수: {:?}", args);

    if args.len() < 2 {
        error!("인수가 충분하지 않습니다. 캔들 파일이 필요합니다.");
        println!(
            "사용법: {} <캔들.json> [설정.(json|toml)] [현재가]",
            args.first().map(String::as_str).unwrap_or("vibe_report")
        );
        process::exit(2);
    }

    match run(&args) {
        Ok(report) => match serde_json::to_string_pretty(&report) {
            Ok(output) => println!("{}", output),
            Err(e) => {
                error!("보고서 직렬화 실패: {}", e);
                process::exit(1);
            }
        },
        Err(e) => {
            error!("{}", e);
            eprintln!("오류: {}", e);
            process::exit(1);
        }
    }
}
