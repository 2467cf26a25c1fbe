use thiserror::Error;

/// 외부 시세 데이터 소스 오류
#[derive(Debug, Error)]
pub enum SourceError {
    /// 소스에 접근할 수 없음 (네트워크, 한도 초과 등)
    #[error("데이터 소스를 사용할 수 없음: {0}")]
    Unavailable(String),
    /// 소스가 인식하지 못하는 심볼
    #[error("알 수 없는 심볼: {0}")]
    InvalidSymbol(String),
    /// 응답 형식 오류
    #[error("잘못된 응답 형식: {0}")]
    Malformed(String),
}

/// 시장 분석 파이프라인 오류
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Source(#[from] SourceError),
    /// 소스가 빈 가격 이력을 반환함
    #[error("가격 이력이 비어 있음: {0}")]
    EmptyHistory(String),
}
