pub mod ema;
pub mod sma;

use crate::indicator::{TABuilder, TAsBuilder, ValuePoint};
use crate::model::Candle;
use ema::EMABuilder;
use serde::Deserialize;
use sma::SMABuilder;
use std::fmt::Display;

/// 이동평균 시계열 포인트
pub type MAPoint = ValuePoint;

/// 이동평균 계산 방식
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MAType {
    /// 지수이동평균 (Exponential Moving Average)
    /// 최근 데이터에 더 큰 가중치를 부여합니다.
    EMA,
    /// 단순이동평균 (Simple Moving Average)
    /// 모든 데이터에 동일한 가중치를 부여합니다.
    SMA,
}

impl Display for MAType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MAType::EMA => write!(f, "EMA"),
            MAType::SMA => write!(f, "SMA"),
        }
    }
}

/// 이동평균 빌더 팩토리
pub struct MABuilderFactory;

impl MABuilderFactory {
    /// 이동평균 유형과 기간에 따른 빌더 생성
    pub fn build<C: Candle + 'static>(
        ma_type: &MAType,
        period: usize,
    ) -> Box<dyn TABuilder<MAPoint, C>> {
        match ma_type {
            MAType::EMA => Box::new(EMABuilder::<C>::new(period)),
            MAType::SMA => Box::new(SMABuilder::<C>::new(period)),
        }
    }
}

/// 여러 기간의 이동평균 빌더 타입
pub type MAsBuilder<C> = TAsBuilder<usize, MAPoint, C>;

/// 이동평균 컬렉션 빌더 팩토리
pub struct MAsBuilderFactory;

impl MAsBuilderFactory {
    /// 여러 기간의 이동평균 빌더 생성
    ///
    /// # Arguments
    /// * `ma_type` - 이동평균 유형
    /// * `periods` - 계산 기간 목록
    pub fn build<C: Candle + 'static>(ma_type: &MAType, periods: &[usize]) -> MAsBuilder<C> {
        let name = match ma_type {
            MAType::EMA => "emas",
            MAType::SMA => "smas",
        };
        let ma_type = *ma_type;
        MAsBuilder::new(name.to_owned(), periods, move |period| {
            MABuilderFactory::build::<C>(&ma_type, *period)
        })
    }
}
