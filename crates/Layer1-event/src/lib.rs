//! # event-target
//!
//! Mixin-style event targets:
//! - Event: 불변 이벤트 레코드 (name, timeStamp, source, target, payload)
//! - Registry: 대상 객체 바깥의 리스너 저장소 (대상 drop 시 자동 해제)
//! - EventSource: `add_listener` / `remove_listener` / `dispatch` / `once`
//! - Vocabulary: 열린 문자열 사전(`Loose`) 또는 `event_map!` 닫힌 사전
//! - Config: 리스너 실패 처리 정책

pub mod config;
pub mod error;
pub mod event;

// ============================================================================
// Error
// ============================================================================
pub use error::{DispatchError, Error, ListenerFailure, Result};

// ============================================================================
// Config
// ============================================================================
pub use config::{FailurePolicy, RegistryConfig, SETTINGS_FILE};

// ============================================================================
// Event
// ============================================================================
pub use event::{
    // Registry
    global_registry,
    init_global_registry,
    EventTarget,
    Registry,
    // Mixin
    EventSource,
    Methods,
    Once,
    // Types
    fields,
    Event,
    EventName,
    Fields,
    Listener,
    ListenerKey,
    Params,
    TargetId,
    // Vocabulary
    EventKey,
    EventMap,
    Loose,
};
