// 기술적 지표 계산 엔진
// OHLCV 시계열로부터 타임스탬프가 정렬된 지표 시계열을 계산합니다.

pub mod adx;
pub mod atr;
pub mod bband;
pub mod cci;
pub mod config;
pub mod ma;
pub mod macd;
pub mod obv;
pub mod psar;
pub mod rsi;
pub mod stochastic;
pub mod utils;
pub mod volume;
pub mod williams_r;

use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::candle_store::{CandleStore, dedup_timestamps};
use crate::config_loader::{ConfigResult, ConfigValidation};
use crate::model::Candle;

use adx::{ADXBuilder, ADXPoint};
use atr::{ATRBuilder, ATRPoint};
use bband::{BollingerBandsBuilder, BollingerBandsPoint};
use cci::{CCIBuilder, CCIPoint};
use config::IndicatorConfig;
use ma::{MAPoint, MAsBuilderFactory, MAType};
use macd::{MACDBuilder, MACDPoint};
use obv::{OBVBuilder, OBVPoint};
use psar::{PSARBuilder, PSARPoint};
use rsi::{RSIBuilder, RSIPoint};
use stochastic::{StochasticBuilder, StochasticPoint};
use volume::{VolumeBuilder, VolumePoint};
use williams_r::{WilliamsRBuilder, WilliamsRPoint};

/// 단일 값 지표의 시계열 포인트
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValuePoint {
    /// 대응하는 입력 캔들의 timestamp
    pub timestamp: i64,
    pub value: f64,
}

impl Display for ValuePoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {:.4}", self.timestamp, self.value)
    }
}

/// 기술적 지표 시계열 생성 인터페이스
///
/// 구현체는 워밍업 길이를 알려야 하며, 출력 시계열의 마지막 원소는
/// 항상 입력의 마지막 캔들에 대응합니다.
pub trait TABuilder<T, C: Candle>: Send + Sync + Debug {
    /// 지표 이름
    fn name(&self) -> &'static str;

    /// 첫 출력 전에 소비되는 선행 캔들 수
    fn warm_up(&self) -> usize;

    /// 출력을 만들기 위해 필요한 최소 캔들 수
    fn min_len(&self) -> usize {
        self.warm_up() + 1
    }

    /// 지표 시계열 계산
    ///
    /// `data.len() >= self.min_len()` 이 보장된 상태에서 호출되며,
    /// `data.len() - self.warm_up()`개의 포인트를 반환해야 합니다.
    fn calculate(&self, data: &[C]) -> Vec<T>;

    /// 데이터가 충분하면 지표 시계열을 계산합니다.
    ///
    /// # Returns
    /// * `Option<Vec<T>>` - 데이터가 부족하면 None
    fn build(&self, data: &[C]) -> Option<Vec<T>> {
        if data.len() < self.min_len() {
            log::debug!(
                "{} 계산 생략: 데이터 부족 ({} < {})",
                self.name(),
                data.len(),
                self.min_len()
            );
            return None;
        }

        let series = self.calculate(data);
        if series.len() + self.warm_up() != data.len() {
            log::warn!(
                "{} 계산 실패: 출력 {}개, 워밍업 {}, 입력 {}개",
                self.name(),
                series.len(),
                self.warm_up(),
                data.len()
            );
            return None;
        }
        log::trace!("{} 계산 완료: {}개", self.name(), series.len());
        Some(series)
    }
}

/// 키별 기술적 지표 컬렉션
///
/// 기간별 이동평균처럼 여러 파라미터로 계산한 지표를 순서를 유지하며 보관합니다.
/// 계산할 수 없었던 키는 포함되지 않습니다.
#[derive(Debug, Clone, PartialEq)]
pub struct TAs<K, T>
where
    K: PartialEq + Eq + Hash + Debug,
{
    /// 이 컬렉션의 이름
    name: String,
    /// 순서가 유지되는 키 목록
    keys: Vec<K>,
    /// 키-값 쌍으로 저장된 기술적 지표
    data: HashMap<K, T>,
}

impl<K, T> Default for TAs<K, T>
where
    K: PartialEq + Eq + Hash + Debug,
{
    fn default() -> Self {
        TAs {
            name: String::new(),
            keys: Vec::new(),
            data: HashMap::new(),
        }
    }
}

impl<K, T> Display for TAs<K, T>
where
    K: PartialEq + Eq + Hash + Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TAs({}: {:?})", self.name, self.keys)
    }
}

impl<K, T> TAs<K, T>
where
    K: PartialEq + Eq + Hash + Debug,
{
    /// 새로운 TAs 인스턴스 생성
    ///
    /// `data`에 없는 키는 키 목록에서 제외됩니다.
    pub fn new(name: String, keys: Vec<K>, data: HashMap<K, T>) -> TAs<K, T> {
        let keys = keys
            .into_iter()
            .filter(|key| data.contains_key(key))
            .collect();
        TAs { name, keys, data }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 키 목록 참조 반환
    pub fn get_keys(&self) -> &[K] {
        &self.keys
    }

    /// 지정된 키에 해당하는 값 참조 반환
    pub fn get(&self, key: &K) -> Option<&T> {
        self.data.get(key)
    }

    /// 키 순서대로 모든 값의 참조 반환
    pub fn get_all(&self) -> Vec<&T> {
        self.keys.iter().filter_map(|key| self.get(key)).collect()
    }

    /// 키 순서대로 (키, 값) 순회
    pub fn iter(&self) -> impl Iterator<Item = (&K, &T)> {
        self.keys
            .iter()
            .filter_map(|key| self.data.get(key).map(|value| (key, value)))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// 여러 기술적 지표 빌더를 관리하는 구조체
pub struct TAsBuilder<K, T, C: Candle> {
    /// 이 빌더 컬렉션의 이름
    name: String,
    /// 순서가 유지되는 키 목록
    keys: Vec<K>,
    /// 각 키에 대응하는 개별 빌더
    builders: HashMap<K, Box<dyn TABuilder<T, C>>>,
}

impl<K, T, C> TAsBuilder<K, T, C>
where
    K: PartialEq + Eq + Hash + Clone + Debug,
    C: Candle,
{
    /// 새 TAsBuilder 인스턴스 생성
    ///
    /// # Arguments
    /// * `name` - 빌더 이름
    /// * `keys` - 키 목록
    /// * `gen_builder` - 각 키에 대한 빌더 생성 함수
    pub fn new(
        name: String,
        keys: &[K],
        gen_builder: impl Fn(&K) -> Box<dyn TABuilder<T, C>>,
    ) -> TAsBuilder<K, T, C> {
        let mut builders: HashMap<K, Box<dyn TABuilder<T, C>>> = HashMap::new();
        let mut ordered_keys = Vec::with_capacity(keys.len());
        for key in keys {
            if builders.contains_key(key) {
                continue;
            }
            builders.insert(key.clone(), gen_builder(key));
            ordered_keys.push(key.clone());
        }

        TAsBuilder {
            name,
            keys: ordered_keys,
            builders,
        }
    }

    /// 데이터에서 기술적 지표 컬렉션 생성
    ///
    /// 데이터가 부족한 키는 결과에서 생략됩니다.
    pub fn build(&self, data: &[C]) -> TAs<K, Vec<T>> {
        let mut tas: HashMap<K, Vec<T>> = HashMap::new();
        for (key, builder) in self.builders.iter() {
            if let Some(series) = builder.build(data) {
                tas.insert(key.clone(), series);
            }
        }

        TAs::new(self.name.to_owned(), self.keys.clone(), tas)
    }

    /// 특정 키의 워밍업 길이
    pub fn warm_up(&self, key: &K) -> Option<usize> {
        self.builders.get(key).map(|builder| builder.warm_up())
    }
}

impl<K: Debug, T, C> Debug for TAsBuilder<K, T, C>
where
    C: Candle,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TAsBuilder")
            .field("name", &self.name)
            .field("keys", &self.keys)
            .field("builders", &format!("<{} builders>", self.builders.len()))
            .finish()
    }
}

/// 기간별 이동평균 시계열
pub type MASeries = TAs<usize, Vec<MAPoint>>;

/// 지표 계열 식별자
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorFamily {
    RSI,
    MACD,
    SMA(usize),
    EMA(usize),
    BollingerBands,
    Stochastic,
    ADX,
    ATR,
    CCI,
    WilliamsR,
    OBV,
    PSAR,
    Volume,
}

impl Display for IndicatorFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndicatorFamily::RSI => write!(f, "rsi"),
            IndicatorFamily::MACD => write!(f, "macd"),
            IndicatorFamily::SMA(period) => write!(f, "sma{}", period),
            IndicatorFamily::EMA(period) => write!(f, "ema{}", period),
            IndicatorFamily::BollingerBands => write!(f, "bb"),
            IndicatorFamily::Stochastic => write!(f, "stochastic"),
            IndicatorFamily::ADX => write!(f, "adx"),
            IndicatorFamily::ATR => write!(f, "atr"),
            IndicatorFamily::CCI => write!(f, "cci"),
            IndicatorFamily::WilliamsR => write!(f, "williamsr"),
            IndicatorFamily::OBV => write!(f, "obv"),
            IndicatorFamily::PSAR => write!(f, "psar"),
            IndicatorFamily::Volume => write!(f, "volume"),
        }
    }
}

/// 모든 지표 계산 결과
///
/// 계산할 수 없었던 계열(데이터 부족 또는 설정에서 비활성화)은 `None`,
/// 이동평균은 계산 가능한 기간만 포함합니다.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorResults {
    /// 계산에 사용된 (중복 제거 후) 캔들 수
    input_len: usize,
    pub rsi: Option<Vec<RSIPoint>>,
    pub macd: Option<Vec<MACDPoint>>,
    pub sma: MASeries,
    pub ema: MASeries,
    pub bb: Option<Vec<BollingerBandsPoint>>,
    pub stochastic: Option<Vec<StochasticPoint>>,
    pub adx: Option<Vec<ADXPoint>>,
    pub atr: Option<Vec<ATRPoint>>,
    pub cci: Option<Vec<CCIPoint>>,
    pub williams_r: Option<Vec<WilliamsRPoint>>,
    pub obv: Option<Vec<OBVPoint>>,
    pub psar: Option<Vec<PSARPoint>>,
    pub volume: Option<Vec<VolumePoint>>,
}

fn last_of<T>(series: &Option<Vec<T>>) -> Option<&T> {
    series.as_ref().and_then(|points| points.last())
}

impl IndicatorResults {
    /// 계산에 사용된 캔들 수
    pub fn input_len(&self) -> usize {
        self.input_len
    }

    /// 어떤 계열도 계산되지 않았는지 여부
    pub fn is_empty(&self) -> bool {
        self.rsi.is_none()
            && self.macd.is_none()
            && self.sma.is_empty()
            && self.ema.is_empty()
            && self.bb.is_none()
            && self.stochastic.is_none()
            && self.adx.is_none()
            && self.atr.is_none()
            && self.cci.is_none()
            && self.williams_r.is_none()
            && self.obv.is_none()
            && self.psar.is_none()
            && self.volume.is_none()
    }

    /// 계열의 출력 길이 (계산되지 않았으면 None)
    pub fn series_len(&self, family: IndicatorFamily) -> Option<usize> {
        match family {
            IndicatorFamily::RSI => self.rsi.as_ref().map(Vec::len),
            IndicatorFamily::MACD => self.macd.as_ref().map(Vec::len),
            IndicatorFamily::SMA(period) => self.sma.get(&period).map(Vec::len),
            IndicatorFamily::EMA(period) => self.ema.get(&period).map(Vec::len),
            IndicatorFamily::BollingerBands => self.bb.as_ref().map(Vec::len),
            IndicatorFamily::Stochastic => self.stochastic.as_ref().map(Vec::len),
            IndicatorFamily::ADX => self.adx.as_ref().map(Vec::len),
            IndicatorFamily::ATR => self.atr.as_ref().map(Vec::len),
            IndicatorFamily::CCI => self.cci.as_ref().map(Vec::len),
            IndicatorFamily::WilliamsR => self.williams_r.as_ref().map(Vec::len),
            IndicatorFamily::OBV => self.obv.as_ref().map(Vec::len),
            IndicatorFamily::PSAR => self.psar.as_ref().map(Vec::len),
            IndicatorFamily::Volume => self.volume.as_ref().map(Vec::len),
        }
    }

    /// 계열이 워밍업으로 소비한 선행 캔들 수
    ///
    /// 입력 길이 - 출력 길이로 계산합니다.
    pub fn warm_up_of(&self, family: IndicatorFamily) -> Option<usize> {
        self.series_len(family).map(|len| self.input_len - len)
    }

    /// 계산된 모든 계열 목록
    pub fn available_families(&self) -> Vec<IndicatorFamily> {
        let mut families = vec![IndicatorFamily::RSI, IndicatorFamily::MACD];
        families.extend(self.sma.get_keys().iter().map(|p| IndicatorFamily::SMA(*p)));
        families.extend(self.ema.get_keys().iter().map(|p| IndicatorFamily::EMA(*p)));
        families.extend([
            IndicatorFamily::BollingerBands,
            IndicatorFamily::Stochastic,
            IndicatorFamily::ADX,
            IndicatorFamily::ATR,
            IndicatorFamily::CCI,
            IndicatorFamily::WilliamsR,
            IndicatorFamily::OBV,
            IndicatorFamily::PSAR,
            IndicatorFamily::Volume,
        ]);

        families
            .into_iter()
            .filter(|family| self.series_len(*family).is_some())
            .collect()
    }

    pub fn latest_rsi(&self) -> Option<&RSIPoint> {
        last_of(&self.rsi)
    }

    pub fn latest_macd(&self) -> Option<&MACDPoint> {
        last_of(&self.macd)
    }

    pub fn latest_sma(&self, period: usize) -> Option<&MAPoint> {
        self.sma.get(&period).and_then(|points| points.last())
    }

    pub fn latest_ema(&self, period: usize) -> Option<&MAPoint> {
        self.ema.get(&period).and_then(|points| points.last())
    }

    pub fn latest_bb(&self) -> Option<&BollingerBandsPoint> {
        last_of(&self.bb)
    }

    pub fn latest_stochastic(&self) -> Option<&StochasticPoint> {
        last_of(&self.stochastic)
    }

    pub fn latest_adx(&self) -> Option<&ADXPoint> {
        last_of(&self.adx)
    }

    pub fn latest_atr(&self) -> Option<&ATRPoint> {
        last_of(&self.atr)
    }

    pub fn latest_cci(&self) -> Option<&CCIPoint> {
        last_of(&self.cci)
    }

    pub fn latest_williams_r(&self) -> Option<&WilliamsRPoint> {
        last_of(&self.williams_r)
    }

    pub fn latest_obv(&self) -> Option<&OBVPoint> {
        last_of(&self.obv)
    }

    pub fn latest_psar(&self) -> Option<&PSARPoint> {
        last_of(&self.psar)
    }

    pub fn latest_volume(&self) -> Option<&VolumePoint> {
        last_of(&self.volume)
    }
}

/// 설정된 파라미터로 모든 지표를 계산하는 엔진
///
/// 호출 간 상태를 갖지 않으므로 여러 스레드에서 공유해도 됩니다.
#[derive(Debug, Clone, Default)]
pub struct IndicatorEngine {
    config: IndicatorConfig,
}

fn when_enabled<T>(enabled: bool, compute: impl FnOnce() -> Option<T>) -> Option<T> {
    if enabled { compute() } else { None }
}

impl IndicatorEngine {
    /// 설정을 검증한 뒤 엔진 생성
    pub fn new(config: IndicatorConfig) -> ConfigResult<IndicatorEngine> {
        config.validate()?;
        Ok(IndicatorEngine { config })
    }

    pub fn config(&self) -> &IndicatorConfig {
        &self.config
    }

    /// 저장소의 캔들로 모든 지표 계산
    pub fn compute_from_storage<C: Candle + 'static>(
        &self,
        storage: &CandleStore<C>,
    ) -> IndicatorResults {
        self.compute(storage.items())
    }

    /// 캔들 시계열로 모든 지표 계산
    ///
    /// 같은 timestamp 의 연속된 캔들은 첫 번째만 사용합니다.
    /// 비유한(NaN/Infinity) 입력값은 정제하지 않고 그대로 전파됩니다.
    pub fn compute<C: Candle + 'static>(&self, bars: &[C]) -> IndicatorResults {
        let data = dedup_timestamps(bars);
        let data: &[C] = data.as_ref();

        if data.is_empty() {
            log::debug!("빈 입력: 지표 계산 생략");
            return IndicatorResults::default();
        }

        let cfg = &self.config;
        log::debug!("지표 계산 시작: 캔들 {}개", data.len());

        let sma = if cfg.sma.enabled {
            MAsBuilderFactory::build::<C>(&MAType::SMA, &cfg.sma.periods).build(data)
        } else {
            MASeries::default()
        };
        let ema = if cfg.ema.enabled {
            MAsBuilderFactory::build::<C>(&MAType::EMA, &cfg.ema.periods).build(data)
        } else {
            MASeries::default()
        };

        IndicatorResults {
            input_len: data.len(),
            rsi: when_enabled(cfg.rsi.enabled, || {
                RSIBuilder::<C>::new(cfg.rsi.period).build(data)
            }),
            macd: when_enabled(cfg.macd.enabled, || {
                MACDBuilder::<C>::new(cfg.macd.params()).build(data)
            }),
            sma,
            ema,
            bb: when_enabled(cfg.bollinger.enabled, || {
                BollingerBandsBuilder::<C>::new(cfg.bollinger.period, cfg.bollinger.std_dev)
                    .build(data)
            }),
            stochastic: when_enabled(cfg.stochastic.enabled, || {
                StochasticBuilder::<C>::new(cfg.stochastic.period, cfg.stochastic.signal_period)
                    .build(data)
            }),
            adx: when_enabled(cfg.adx.enabled, || {
                ADXBuilder::<C>::new(cfg.adx.period).build(data)
            }),
            atr: when_enabled(cfg.atr.enabled, || {
                ATRBuilder::<C>::new(cfg.atr.period).build(data)
            }),
            cci: when_enabled(cfg.cci.enabled, || {
                CCIBuilder::<C>::new(cfg.cci.period).build(data)
            }),
            williams_r: when_enabled(cfg.williams_r.enabled, || {
                WilliamsRBuilder::<C>::new(cfg.williams_r.period).build(data)
            }),
            obv: when_enabled(cfg.obv.enabled, || OBVBuilder::<C>::new().build(data)),
            psar: when_enabled(cfg.psar.enabled, || {
                PSARBuilder::<C>::new(cfg.psar.step, cfg.psar.max).build(data)
            }),
            volume: when_enabled(cfg.volume.enabled, || {
                VolumeBuilder::<C>::new(cfg.volume.period).build(data)
            }),
        }
    }
}

/// 기본 파라미터로 모든 지표 계산
///
/// 빈 입력이면 모든 계열이 비어 있는 결과를 반환합니다.
pub fn compute_all<C: Candle + 'static>(bars: &[C]) -> IndicatorResults {
    IndicatorEngine::default().compute(bars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Ohlcv;

    fn rising_bars(count: usize) -> Vec<Ohlcv> {
        (0..count)
            .map(|i| {
                let close = 100.0 + i as f64;
                Ohlcv::new(i as i64 * 60_000, close - 0.5, close + 1.0, close - 1.0, close, 1000.0)
            })
            .collect()
    }

    #[test]
    fn test_empty_input_yields_empty_results() {
        let results = compute_all::<Ohlcv>(&[]);
        assert!(results.is_empty());
        assert_eq!(results.input_len(), 0);
        assert!(results.available_families().is_empty());
    }

    #[test]
    fn test_fourteen_bars_skip_long_warm_up_families() {
        let results = compute_all(&rising_bars(14));
        assert!(results.rsi.is_none());
        assert!(results.sma.get(&20).is_none());
        assert!(results.sma.get(&50).is_none());
        assert!(results.sma.get(&200).is_none());
        assert!(results.macd.is_none());
        assert!(results.adx.is_none());
        // 워밍업이 짧은 계열은 계산됨
        assert!(results.williams_r.is_some());
        assert!(results.ema.get(&12).is_some());
        assert!(results.obv.is_some());
        assert!(results.psar.is_some());
    }

    #[test]
    fn test_warm_up_of_matches_input_minus_output() {
        let results = compute_all(&rising_bars(250));
        assert_eq!(results.warm_up_of(IndicatorFamily::RSI), Some(14));
        assert_eq!(results.warm_up_of(IndicatorFamily::MACD), Some(33));
        assert_eq!(results.warm_up_of(IndicatorFamily::SMA(200)), Some(199));
        assert_eq!(results.warm_up_of(IndicatorFamily::EMA(26)), Some(25));
        assert_eq!(results.warm_up_of(IndicatorFamily::Stochastic), Some(15));
        assert_eq!(results.warm_up_of(IndicatorFamily::ADX), Some(27));
        assert_eq!(results.warm_up_of(IndicatorFamily::OBV), Some(0));
        assert_eq!(results.warm_up_of(IndicatorFamily::SMA(7)), None);
    }

    #[test]
    fn test_duplicate_timestamps_are_dropped() {
        let mut bars = rising_bars(30);
        let duplicate = Ohlcv {
            close: 9999.0,
            ..bars[10]
        };
        bars.insert(11, duplicate);

        let results = compute_all(&bars);
        assert_eq!(results.input_len(), 30);
        assert_eq!(results, compute_all(&rising_bars(30)));
    }

    #[test]
    fn test_disabled_family_is_absent() {
        let mut config = IndicatorConfig::default();
        config.rsi.enabled = false;
        config.sma.enabled = false;
        let engine = IndicatorEngine::new(config).unwrap();

        let results = engine.compute(&rising_bars(60));
        assert!(results.rsi.is_none());
        assert!(results.sma.is_empty());
        assert!(results.macd.is_some());
    }

    #[test]
    fn test_tas_skips_missing_keys() {
        let tas = TAs::new(
            "test".to_owned(),
            vec![1, 2, 3],
            HashMap::from([(1, 10.0), (3, 30.0)]),
        );
        assert_eq!(tas.get_keys(), &[1, 3]);
        assert_eq!(tas.get_all(), vec![&10.0, &30.0]);
        assert!(tas.get(&2).is_none());
    }
}
