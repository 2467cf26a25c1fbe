use crate::config_loader::{ConfigError, ConfigResult, ConfigValidation};
use crate::indicator::macd::MACDParams;
use serde::{Deserialize, Serialize};

/// 단일 기간 지표 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodConfig {
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    pub period: usize,
}

impl PeriodConfig {
    pub fn new(period: usize) -> Self {
        PeriodConfig {
            enabled: true,
            period,
        }
    }
}

/// 여러 기간을 갖는 이동평균 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiPeriodConfig {
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    pub periods: Vec<usize>,
}

/// MACD 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MACDConfig {
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    pub fast_period: usize,
    pub slow_period: usize,
    pub signal_period: usize,
}

impl MACDConfig {
    pub fn params(&self) -> MACDParams {
        MACDParams {
            fast_period: self.fast_period,
            slow_period: self.slow_period,
            signal_period: self.signal_period,
        }
    }
}

/// 볼린저 밴드 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BollingerConfig {
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    pub period: usize,
    /// 표준편차 승수
    pub std_dev: f64,
}

/// 스토캐스틱 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StochasticConfig {
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    pub period: usize,
    /// %D 이동평균 기간
    pub signal_period: usize,
}

/// 파라볼릭 SAR 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PSARConfig {
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    /// 가속 계수 증가폭
    pub step: f64,
    /// 가속 계수 상한
    pub max: f64,
}

/// 파라미터가 없는 지표 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToggleConfig {
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

fn default_rsi() -> PeriodConfig {
    PeriodConfig::new(14)
}

fn default_macd() -> MACDConfig {
    MACDConfig {
        enabled: true,
        fast_period: 12,
        slow_period: 26,
        signal_period: 9,
    }
}

fn default_sma() -> MultiPeriodConfig {
    MultiPeriodConfig {
        enabled: true,
        periods: vec![20, 50, 200],
    }
}

fn default_ema() -> MultiPeriodConfig {
    MultiPeriodConfig {
        enabled: true,
        periods: vec![12, 26],
    }
}

fn default_bollinger() -> BollingerConfig {
    BollingerConfig {
        enabled: true,
        period: 20,
        std_dev: 2.0,
    }
}

fn default_stochastic() -> StochasticConfig {
    StochasticConfig {
        enabled: true,
        period: 14,
        signal_period: 3,
    }
}

fn default_adx() -> PeriodConfig {
    PeriodConfig::new(14)
}

fn default_atr() -> PeriodConfig {
    PeriodConfig::new(14)
}

fn default_cci() -> PeriodConfig {
    PeriodConfig::new(20)
}

fn default_williams_r() -> PeriodConfig {
    PeriodConfig::new(14)
}

fn default_obv() -> ToggleConfig {
    ToggleConfig { enabled: true }
}

fn default_psar() -> PSARConfig {
    PSARConfig {
        enabled: true,
        step: 0.02,
        max: 0.2,
    }
}

fn default_volume() -> PeriodConfig {
    PeriodConfig::new(20)
}

/// 지표 엔진 설정
///
/// 파일에 없는 항목은 기본 파라미터를 사용합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorConfig {
    #[serde(default = "default_rsi")]
    pub rsi: PeriodConfig,
    #[serde(default = "default_macd")]
    pub macd: MACDConfig,
    #[serde(default = "default_sma")]
    pub sma: MultiPeriodConfig,
    #[serde(default = "default_ema")]
    pub ema: MultiPeriodConfig,
    #[serde(default = "default_bollinger")]
    pub bollinger: BollingerConfig,
    #[serde(default = "default_stochastic")]
    pub stochastic: StochasticConfig,
    #[serde(default = "default_adx")]
    pub adx: PeriodConfig,
    #[serde(default = "default_atr")]
    pub atr: PeriodConfig,
    #[serde(default = "default_cci")]
    pub cci: PeriodConfig,
    #[serde(default = "default_williams_r")]
    pub williams_r: PeriodConfig,
    #[serde(default = "default_obv")]
    pub obv: ToggleConfig,
    #[serde(default = "default_psar")]
    pub psar: PSARConfig,
    #[serde(default = "default_volume")]
    pub volume: PeriodConfig,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        IndicatorConfig {
            rsi: default_rsi(),
            macd: default_macd(),
            sma: default_sma(),
            ema: default_ema(),
            bollinger: default_bollinger(),
            stochastic: default_stochastic(),
            adx: default_adx(),
            atr: default_atr(),
            cci: default_cci(),
            williams_r: default_williams_r(),
            obv: default_obv(),
            psar: default_psar(),
            volume: default_volume(),
        }
    }
}

fn require_period(name: &str, period: usize) -> ConfigResult<()> {
    if period == 0 {
        return Err(ConfigError::ValidationError(format!(
            "{} 기간은 0보다 커야 합니다",
            name
        )));
    }
    Ok(())
}

impl ConfigValidation for IndicatorConfig {
    fn validate(&self) -> ConfigResult<()> {
        require_period("RSI", self.rsi.period)?;
        require_period("ADX", self.adx.period)?;
        if self.adx.period < 2 {
            return Err(ConfigError::ValidationError(
                "ADX 기간은 2 이상이어야 합니다".to_string(),
            ));
        }
        require_period("ATR", self.atr.period)?;
        require_period("CCI", self.cci.period)?;
        require_period("Williams %R", self.williams_r.period)?;
        require_period("볼륨", self.volume.period)?;
        require_period("볼린저 밴드", self.bollinger.period)?;
        require_period("스토캐스틱", self.stochastic.period)?;
        require_period("스토캐스틱 시그널", self.stochastic.signal_period)?;

        for &period in self.sma.periods.iter().chain(self.ema.periods.iter()) {
            require_period("이동평균", period)?;
        }

        require_period("MACD 빠른", self.macd.fast_period)?;
        require_period("MACD 시그널", self.macd.signal_period)?;
        if self.macd.fast_period >= self.macd.slow_period {
            return Err(ConfigError::ValidationError(format!(
                "MACD 빠른 기간({})은 느린 기간({})보다 작아야 합니다",
                self.macd.fast_period, self.macd.slow_period
            )));
        }

        if !(self.bollinger.std_dev > 0.0) {
            return Err(ConfigError::ValidationError(
                "볼린저 밴드 승수는 0보다 커야 합니다".to_string(),
            ));
        }

        if !(self.psar.step > 0.0) || !(self.psar.max > 0.0) || self.psar.step > self.psar.max {
            return Err(ConfigError::ValidationError(format!(
                "PSAR 가속 계수가 올바르지 않습니다: step={}, max={}",
                self.psar.step, self.psar.max
            )));
        }

        Ok(())
    }
}
