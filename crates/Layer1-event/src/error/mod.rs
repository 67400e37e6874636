//! Error types for event-target
//!
//! dispatch 실패, 설정 로드 실패 등 모든 에러를 중앙에서 관리

use std::fmt;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// event-target 에러 타입
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Dispatch 관련
    // ========================================================================
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// `once()` 대기 중 대상 객체가 해제됨
    #[error("Event target was released before the event fired")]
    TargetReleased,

    // ========================================================================
    // 설정 관련
    // ========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    // ========================================================================
    // 외부 에러 변환
    // ========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// 리스너 실패로 인한 에러인지 확인
    pub fn is_listener_failure(&self) -> bool {
        matches!(self, Error::Dispatch(_))
    }
}

// ============================================================================
// ListenerFailure
// ============================================================================

/// dispatch 중 실패한 리스너 하나의 기록
#[derive(Debug)]
pub enum ListenerFailure {
    /// 리스너가 `Err`를 반환함
    Failed { position: usize, error: anyhow::Error },
    /// 리스너가 panic 함 (`catch_panics` 활성 시)
    Panicked { position: usize, message: String },
}

impl ListenerFailure {
    /// dispatch 스냅샷 내 리스너 위치 (0부터)
    pub fn position(&self) -> usize {
        match self {
            Self::Failed { position, .. } | Self::Panicked { position, .. } => *position,
        }
    }

    pub fn is_panic(&self) -> bool {
        matches!(self, Self::Panicked { .. })
    }
}

impl fmt::Display for ListenerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed { position, error } => write!(f, "listener #{} failed: {:#}", position, error),
            Self::Panicked { position, message } => {
                write!(f, "listener #{} panicked: {}", position, message)
            }
        }
    }
}

// ============================================================================
// DispatchError
// ============================================================================

/// 하나의 dispatch 에서 발생한 리스너 실패 묶음
///
/// 기본 정책(`FailurePolicy::Aggregate`)에서는 모든 리스너가 실행된 뒤에
/// 한 번에 반환됩니다.
#[derive(Debug, Error)]
#[error("{} listener(s) failed while dispatching '{event}'", .failures.len())]
pub struct DispatchError {
    /// 이벤트 이름
    pub event: String,
    /// 실패 목록 (실행 순서)
    pub failures: Vec<ListenerFailure>,
}

impl DispatchError {
    pub fn new(event: impl Into<String>, failures: Vec<ListenerFailure>) -> Self {
        Self {
            event: event.into(),
            failures,
        }
    }

    /// 첫 번째 실패
    pub fn first(&self) -> Option<&ListenerFailure> {
        self.failures.first()
    }
}
