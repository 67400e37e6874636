//! Event Types - 이벤트 레코드 및 대상 식별자
//!
//! dispatch 한 번마다 새로 만들어져 리스너들에게 전달되는 불변 레코드입니다.

use chrono::{DateTime, Utc};
use serde::ser::{Error as _, SerializeMap};
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::ops::Deref;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// 이벤트 이름 (정적 문자열이면 할당 없음)
pub type EventName = Cow<'static, str>;

/// 느슨한(Loose) 이벤트의 payload
pub type Fields = serde_json::Map<String, Value>;

/// dispatch 가 항상 덮어쓰는 예약 필드
pub const RESERVED_FIELDS: [&str; 2] = ["name", "timeStamp"];

/// 직렬화 시 레코드가 차지하는 키 (payload 의 같은 키는 무시)
const RECORD_KEYS: [&str; 4] = ["name", "timeStamp", "source", "target"];

// ============================================================================
// Target ID
// ============================================================================

static NEXT_TARGET_ID: AtomicU64 = AtomicU64::new(1);

/// 이벤트 대상(데코레이트된 객체)의 고유 ID
///
/// 프로세스 내에서 유일하며 재사용되지 않습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TargetId(u64);

impl TargetId {
    pub(crate) fn next() -> Self {
        Self(NEXT_TARGET_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "target-{}", self.0)
    }
}

// ============================================================================
// Params
// ============================================================================

/// dispatch 인자: payload + source/target 재정의
///
/// `source`/`target` 를 지정하지 않으면 dispatch 하는 대상 자신이 들어갑니다.
#[derive(Debug, Clone)]
pub struct Params<P> {
    pub payload: P,
    pub source: Option<TargetId>,
    pub target: Option<TargetId>,
}

impl<P> Params<P> {
    pub fn new(payload: P) -> Self {
        Self {
            payload,
            source: None,
            target: None,
        }
    }

    /// source 재정의
    pub fn source(mut self, source: TargetId) -> Self {
        self.source = Some(source);
        self
    }

    /// target 재정의
    pub fn target(mut self, target: TargetId) -> Self {
        self.target = Some(target);
        self
    }

    /// 비어있는 source/target 을 `id` 로 채움
    pub(crate) fn or_target(mut self, id: TargetId) -> Self {
        self.source.get_or_insert(id);
        self.target.get_or_insert(id);
        self
    }
}

impl<P> From<P> for Params<P> {
    fn from(payload: P) -> Self {
        Self::new(payload)
    }
}

// ============================================================================
// Event
// ============================================================================

/// 리스너 콜백에 전달되는 이벤트 정보
///
/// 생성 후에는 변경할 수 없습니다. payload 필드는 `Deref` 로 바로 접근합니다
/// (`event.who`). payload 는 `Arc` 로 공유되므로 clone 비용이 작습니다.
pub struct Event<P> {
    name: EventName,
    time_stamp: DateTime<Utc>,
    source: Option<TargetId>,
    target: Option<TargetId>,
    payload: Arc<P>,
}

impl<P: 'static> Event<P> {
    /// 새 이벤트 생성 (source/target 없음)
    pub fn new(name: impl Into<EventName>, payload: P) -> Self {
        Self::with_params(name, Params::new(payload))
    }

    /// `Params` 로 이벤트 생성
    ///
    /// payload 를 먼저 적용한 뒤 `name` 과 `time_stamp` 를 설정하므로
    /// 두 값은 payload 로 덮어쓸 수 없습니다. [`Fields`] payload 에서는
    /// 예약 필드가 제거됩니다.
    pub fn with_params(name: impl Into<EventName>, params: Params<P>) -> Self {
        let Params {
            mut payload,
            source,
            target,
        } = params;

        if let Some(fields) = (&mut payload as &mut dyn Any).downcast_mut::<Fields>() {
            strip_reserved(fields);
        }

        Self {
            name: name.into(),
            time_stamp: Utc::now(),
            source,
            target,
            payload: Arc::new(payload),
        }
    }
}

impl<P> Event<P> {
    /// 이벤트 이름
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 생성 시각
    pub fn time_stamp(&self) -> DateTime<Utc> {
        self.time_stamp
    }

    pub fn source(&self) -> Option<TargetId> {
        self.source
    }

    pub fn target(&self) -> Option<TargetId> {
        self.target
    }

    pub fn payload(&self) -> &P {
        &self.payload
    }
}

impl Event<Fields> {
    /// 느슨한 이벤트 생성 (예약 필드는 payload 에서 제거)
    pub fn loose(name: impl Into<EventName>, params: Params<Fields>) -> Self {
        Self::with_params(name, params)
    }

    /// payload 필드 조회
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }
}

/// `{name, timeStamp, source, target, ...payload}`
///
/// payload 가 객체가 아니면 payload 는 생략되고, 레코드 키와 겹치는
/// payload 필드도 생략됩니다.
impl<P: Serialize> Serialize for Event<P> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let payload = match serde_json::to_value(&*self.payload).map_err(S::Error::custom)? {
            Value::Object(map) => map,
            _ => Fields::new(),
        };
        let extra: Vec<_> = payload
            .iter()
            .filter(|(key, _)| !RECORD_KEYS.contains(&key.as_str()))
            .collect();

        let mut map = serializer.serialize_map(Some(RECORD_KEYS.len() + extra.len()))?;
        map.serialize_entry("name", &self.name)?;
        map.serialize_entry("timeStamp", &self.time_stamp)?;
        map.serialize_entry("source", &self.source)?;
        map.serialize_entry("target", &self.target)?;
        for (key, value) in extra {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<P> Deref for Event<P> {
    type Target = P;

    fn deref(&self) -> &P {
        &self.payload
    }
}

impl<P> Clone for Event<P> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            time_stamp: self.time_stamp,
            source: self.source,
            target: self.target,
            payload: Arc::clone(&self.payload),
        }
    }
}

impl<P: fmt::Debug> fmt::Debug for Event<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("name", &self.name)
            .field("time_stamp", &self.time_stamp)
            .field("source", &self.source)
            .field("target", &self.target)
            .field("payload", &self.payload)
            .finish()
    }
}

// ============================================================================
// Fields 헬퍼
// ============================================================================

/// 예약 필드 제거
pub fn strip_reserved(fields: &mut Fields) {
    for key in RESERVED_FIELDS {
        fields.remove(key);
    }
}

/// JSON 값을 payload 로 변환
///
/// 객체가 아닌 값은 복사할 필드가 없으므로 빈 payload 가 됩니다.
pub fn fields(value: Value) -> Fields {
    match value {
        Value::Object(map) => map,
        _ => Fields::new(),
    }
}

// ============================================================================
// 테스트
// ============================================================================
