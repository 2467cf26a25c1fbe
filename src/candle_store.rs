use crate::model::Candle;
use std::borrow::Cow;

/// 시간순으로 정렬된 캔들 저장소
///
/// 데이터는 timestamp 기준 오름차순(가장 오래된 데이터가 먼저)으로 저장되며,
/// 같은 timestamp 를 가진 캔들은 먼저 들어온 것만 유지합니다.
/// 최대 크기를 초과하면 가장 오래된 데이터가 제거됩니다.
#[derive(Debug, Clone)]
pub struct CandleStore<C: Candle> {
    items: Vec<C>,
    pub max_size: usize,
}

impl<C> CandleStore<C>
where
    C: Candle,
{
    /// 새로운 CandleStore 인스턴스를 생성합니다.
    ///
    /// # Arguments
    /// * `items` - 초기 캔들 목록 (정렬되지 않아도 됨)
    /// * `max_size` - 저장소의 최대 크기
    ///
    /// # Returns
    /// * `CandleStore<C>` - 생성된 저장소 인스턴스
    pub fn new(mut items: Vec<C>, max_size: usize) -> CandleStore<C> {
        // 안정 정렬이므로 같은 timestamp 사이에서는 입력 순서가 유지됨
        items.sort_by_key(|item| item.timestamp());

        let before = items.len();
        items.dedup_by_key(|item| item.timestamp());
        if items.len() < before {
            log::debug!("중복 timestamp 캔들 {}개 제거", before - items.len());
        }

        if items.len() > max_size {
            let excess = items.len() - max_size;
            items.drain(0..excess);
        }

        CandleStore { items, max_size }
    }

    /// 크기 제한 없는 저장소 생성
    pub fn unbounded(items: Vec<C>) -> CandleStore<C> {
        Self::new(items, usize::MAX)
    }

    /// 캔들을 시간 순서에 맞는 위치에 삽입합니다.
    ///
    /// 같은 timestamp 의 캔들이 이미 있으면 무시합니다.
    ///
    /// # Arguments
    /// * `data` - 삽입할 캔들
    ///
    /// # Returns
    /// * `bool` - 삽입 여부
    pub fn add(&mut self, data: C) -> bool {
        let insert_idx = match self
            .items
            .binary_search_by_key(&data.timestamp(), |item| item.timestamp())
        {
            Ok(_) => {
                log::trace!("중복 캔들 무시: {}", data.timestamp());
                return false;
            }
            Err(idx) => idx,
        };

        self.items.insert(insert_idx, data);

        if self.items.len() > self.max_size {
            let excess = self.items.len() - self.max_size;
            self.items.drain(0..excess);
        }

        true
    }

    /// 저장소에 있는 캔들 수
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 가장 오래된 캔들
    pub fn first(&self) -> Option<&C> {
        self.items.first()
    }

    /// 가장 최근 캔들
    pub fn latest(&self) -> Option<&C> {
        self.items.last()
    }

    /// 지정된 인덱스(오래된 순)의 캔들
    pub fn get(&self, index: usize) -> Option<&C> {
        self.items.get(index)
    }

    /// 시간순으로 정렬된 캔들 슬라이스
    pub fn items(&self) -> &[C] {
        &self.items
    }

    /// 저장소를 소비하고 시간순 캔들 목록을 반환합니다.
    pub fn into_items(self) -> Vec<C> {
        self.items
    }
}

/// 비내림차순 캔들 슬라이스에서 연속된 중복 timestamp 를 제거합니다.
///
/// 중복이 없으면 입력을 그대로 빌려 반환합니다. 첫 번째 캔들이 유지됩니다.
pub fn dedup_timestamps<C: Candle>(bars: &[C]) -> Cow<'_, [C]> {
    let has_duplicate = bars
        .windows(2)
        .any(|pair| pair[0].timestamp() == pair[1].timestamp());

    if !has_duplicate {
        return Cow::Borrowed(bars);
    }

    let mut items = bars.to_vec();
    items.dedup_by_key(|item| item.timestamp());
    log::debug!("중복 timestamp 캔들 {}개 제거", bars.len() - items.len());
    Cow::Owned(items)
}
