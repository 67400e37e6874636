//! Event Registry - 대상별 리스너 저장소
//!
//! 대상 객체 바깥의 사이드 테이블 `TargetId -> 이벤트 이름 -> 리스너 목록`.
//! 대상 객체에는 불투명한 [`EventTarget`] 토큰만 남고, 토큰이 drop 되면
//! 해당 대상의 저장소도 함께 해제됩니다.
//!
//! 리스너 호출 중에는 락을 잡지 않습니다. 따라서 리스너 안에서
//! `add_listener`/`remove_listener`/`dispatch` 를 다시 호출해도 안전합니다.

use super::listener::{ErasedListener, Listener, ListenerKey};
use super::types::{Event, EventName, TargetId};
use super::vocabulary::{EventMap, Loose};
use crate::config::{FailurePolicy, RegistryConfig};
use crate::error::{DispatchError, ListenerFailure};
use parking_lot::Mutex;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use tracing::{debug, trace, warn};

/// 대상 하나의 저장소: 이벤트 이름 -> 등록 순서대로 정렬된 리스너
#[derive(Default)]
struct Entry {
    buckets: HashMap<EventName, Vec<ErasedListener>>,
}

impl Entry {
    fn listener_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }
}

// ============================================================================
// Registry
// ============================================================================

/// 리스너 레지스트리
///
/// 보통은 프로세스 전역 인스턴스([`global_registry`])를 사용합니다.
/// 별도 정책이 필요하면 [`Registry::with_config`] 로 만든 뒤
/// [`EventTarget::in_registry`] 로 연결합니다.
pub struct Registry {
    /// 설정
    config: RegistryConfig,

    /// 대상별 저장소
    targets: Mutex<HashMap<TargetId, Entry>>,

    /// 처리된 dispatch 수
    dispatch_count: AtomicU64,
}

impl Registry {
    /// 기본 설정으로 레지스트리 생성
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// 커스텀 설정으로 레지스트리 생성
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            config,
            targets: Mutex::new(HashMap::new()),
            dispatch_count: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// 리스너 등록 (이미 있으면 무시)
    pub(crate) fn add(&self, id: TargetId, name: EventName, listener: ErasedListener) -> bool {
        let key = listener.key;
        let rejected = {
            let mut targets = self.targets.lock();
            let bucket = targets
                .entry(id)
                .or_default()
                .buckets
                .entry(name.clone())
                .or_default();

            if bucket.iter().any(|l| l.key == key) {
                Some(listener)
            } else {
                bucket.push(listener);
                None
            }
        };
        let added = rejected.is_none();

        if added {
            debug!(target_id = %id, event = %name, listener = %key, "Registered event listener");
        }

        added
    }

    /// 리스너 해제 (없으면 무시)
    pub(crate) fn remove(&self, id: TargetId, name: &str, key: ListenerKey) -> bool {
        // 리스너의 마지막 참조일 수 있으므로 락을 푼 뒤에 drop
        let removed = {
            let mut targets = self.targets.lock();
            targets
                .get_mut(&id)
                .and_then(|entry| entry.buckets.get_mut(name))
                .and_then(|bucket| {
                    let pos = bucket.iter().position(|l| l.key == key)?;
                    Some(bucket.remove(pos))
                })
        };

        match removed {
            Some(_) => {
                debug!(target_id = %id, event = name, listener = %key, "Unregistered event listener");
                true
            }
            None => false,
        }
    }

    /// dispatch 시작 시점의 리스너 스냅샷
    fn snapshot(&self, id: TargetId, name: &EventName) -> Vec<ErasedListener> {
        let mut targets = self.targets.lock();
        targets
            .entry(id)
            .or_default()
            .buckets
            .entry(name.clone())
            .or_default()
            .clone()
    }

    /// 대상의 저장소 전체 해제
    pub(crate) fn release(&self, id: TargetId) {
        let entry = self.targets.lock().remove(&id);

        if let Some(entry) = entry {
            debug!(
                target_id = %id,
                listeners = entry.listener_count(),
                "Released event target storage"
            );
        }
    }

    /// 이벤트를 등록된 리스너들에게 등록 순서대로 전달
    pub(crate) fn dispatch<P: Send + Sync + 'static>(
        &self,
        id: TargetId,
        event: &Event<P>,
    ) -> Result<(), DispatchError> {
        let name: EventName = EventName::Owned(event.name().to_string());
        let snapshot = self.snapshot(id, &name);
        let dispatch_count = self.dispatch_count.fetch_add(1, Ordering::Relaxed);

        if self.config.trace_dispatch {
            trace!(
                target_id = %id,
                event = %name,
                listeners = snapshot.len(),
                "Dispatching event #{}", dispatch_count + 1
            );
        }

        let mut failures = Vec::new();

        for (position, erased) in snapshot.iter().enumerate() {
            let Some(listener) = Listener::<P>::restore(erased) else {
                warn!(
                    target_id = %id,
                    event = %name,
                    listener = %erased.key,
                    "Skipping listener registered with a different payload type"
                );
                continue;
            };

            if self.config.trace_dispatch {
                trace!(
                    target_id = %id,
                    event = %name,
                    listener = %erased.key,
                    label = listener.label().unwrap_or("-"),
                    "Delivering event to listener"
                );
            }

            if let Some(failure) = self.invoke(position, &listener, event) {
                warn!(target_id = %id, event = %name, "{}", failure);
                failures.push(failure);

                if self.config.failure_policy == FailurePolicy::StopOnFirst {
                    break;
                }
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(DispatchError::new(name, failures))
        }
    }

    fn invoke<P: 'static>(
        &self,
        position: usize,
        listener: &Listener<P>,
        event: &Event<P>,
    ) -> Option<ListenerFailure> {
        let result = if self.config.catch_panics {
            match panic::catch_unwind(AssertUnwindSafe(|| listener.call(event))) {
                Ok(result) => result,
                Err(payload) => {
                    return Some(ListenerFailure::Panicked {
                        position,
                        message: panic_message(payload.as_ref()),
                    })
                }
            }
        } else {
            listener.call(event)
        };

        result
            .err()
            .map(|error| ListenerFailure::Failed { position, error })
    }

    /// 대상/이벤트에 등록된 리스너 수
    pub fn listener_count(&self, id: TargetId, name: &str) -> usize {
        self.targets
            .lock()
            .get(&id)
            .and_then(|entry| entry.buckets.get(name))
            .map_or(0, Vec::len)
    }

    /// 저장소가 있는 대상 수
    pub fn target_count(&self) -> usize {
        self.targets.lock().len()
    }

    /// 대상의 저장소가 존재하는지
    pub fn contains(&self, id: TargetId) -> bool {
        self.targets.lock().contains_key(&id)
    }

    /// 총 dispatch 수
    pub fn dispatch_count(&self) -> u64 {
        self.dispatch_count.load(Ordering::Relaxed)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("config", &self.config)
            .field("targets", &self.target_count())
            .field("dispatch_count", &self.dispatch_count())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

// ============================================================================
// 전역 Registry
// ============================================================================

static GLOBAL_REGISTRY: OnceLock<Arc<Registry>> = OnceLock::new();

/// 전역 레지스트리 초기화 (처음 호출만 적용)
pub fn init_global_registry(config: RegistryConfig) -> Arc<Registry> {
    GLOBAL_REGISTRY
        .get_or_init(|| Arc::new(Registry::with_config(config)))
        .clone()
}

/// 전역 레지스트리 가져오기
pub fn global_registry() -> Arc<Registry> {
    GLOBAL_REGISTRY
        .get_or_init(|| Arc::new(Registry::new()))
        .clone()
}

// ============================================================================
// EventTarget - 대상 식별 토큰
// ============================================================================

/// 이벤트 대상 토큰
///
/// 호스트 타입이 필드로 품거나 그대로(bare) 사용합니다. 토큰은 ID 와
/// 레지스트리 핸들만 가지며 리스너 저장소는 레지스트리에 있습니다.
/// `V` 는 받을 수 있는 이벤트 사전입니다.
pub struct EventTarget<V: EventMap = Loose> {
    id: TargetId,
    registry: Arc<Registry>,
    _events: PhantomData<fn() -> V>,
}

impl<V: EventMap> EventTarget<V> {
    /// 전역 레지스트리에 연결된 새 대상
    pub fn new() -> Self {
        Self::in_registry(global_registry())
    }

    /// 지정한 레지스트리에 연결된 새 대상
    pub fn in_registry(registry: Arc<Registry>) -> Self {
        Self {
            id: TargetId::next(),
            registry,
            _events: PhantomData,
        }
    }

    pub fn id(&self) -> TargetId {
        self.id
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }
}

impl<V: EventMap> Default for EventTarget<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: EventMap> Drop for EventTarget<V> {
    fn drop(&mut self) {
        self.registry.release(self.id);
    }
}

impl<V: EventMap> fmt::Debug for EventTarget<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventTarget").field("id", &self.id).finish()
    }
}

// ============================================================================
// 테스트
// ============================================================================
