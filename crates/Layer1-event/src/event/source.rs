//! Event Source - 믹스인 방식의 이벤트 기능 묶음
//!
//! 네 가지 연산(`add_listener`, `remove_listener`, `dispatch`, `once`)을
//! 어떤 타입에든 붙이는 방법은 세 가지입니다.
//!
//! 1. [`EventSource`] 구현: `event_target()` 만 제공하면 나머지는 기본 구현
//! 2. [`Methods`]: 대상(`this`)을 호출 시점에 받는 연산 묶음
//! 3. 팩토리 함수([`add_listener`], [`remove_listener`], [`dispatch`], [`once`]):
//!    키 하나에 대한 일반 `fn` 포인터를 반환
//!
//! 모든 경로는 호출 시 전달된 대상의 ID 로 저장소를 찾습니다.

use super::listener::Listener;
use super::once::{self as once_impl, Once};
use super::registry::EventTarget;
use super::types::{Event, Params};
use super::vocabulary::{EventKey, EventMap};
use crate::error::DispatchError;
use std::fmt;
use std::marker::PhantomData;

// ============================================================================
// EventSource Trait
// ============================================================================

/// 이벤트 소스 trait
///
/// ```ignore
/// struct House {
///     events: EventTarget<HouseEvents>,
/// }
///
/// impl EventSource for House {
///     type Events = HouseEvents;
///
///     fn event_target(&self) -> &EventTarget<HouseEvents> {
///         &self.events
///     }
/// }
/// ```
pub trait EventSource {
    /// 받을 수 있는 이벤트 사전
    type Events: EventMap;

    /// 저장소를 찾기 위한 대상 토큰
    fn event_target(&self) -> &EventTarget<Self::Events>;

    /// 리스너 등록 (같은 리스너를 다시 등록하면 무시)
    fn add_listener<K>(&self, key: K, listener: &Listener<K::Payload>)
    where
        K: EventKey<Self::Events>,
    {
        add_listener_on(self.event_target(), key, listener)
    }

    /// 리스너 해제 (등록되지 않은 리스너면 무시)
    fn remove_listener<K>(&self, key: K, listener: &Listener<K::Payload>)
    where
        K: EventKey<Self::Events>,
    {
        remove_listener_on(self.event_target(), key, listener)
    }

    /// 이벤트 발생
    ///
    /// 등록 순서대로 리스너를 동기 호출합니다. dispatch 도중의 등록/해제는
    /// 다음 dispatch 부터 반영됩니다.
    fn dispatch<K>(
        &self,
        key: K,
        params: impl Into<Params<K::Payload>>,
    ) -> Result<(), DispatchError>
    where
        K: EventKey<Self::Events>,
    {
        dispatch_on(self.event_target(), key, params.into())
    }

    /// 다음 이벤트 한 번을 기다리는 future
    fn once<K>(&self, key: K) -> Once<K::Payload>
    where
        K: EventKey<Self::Events>,
    {
        once_on(self.event_target(), key)
    }
}

/// 토큰 자체도 이벤트 소스 (호스트 없이 사용)
impl<V: EventMap> EventSource for EventTarget<V> {
    type Events = V;

    fn event_target(&self) -> &EventTarget<V> {
        self
    }
}

// ============================================================================
// 구현 (대상은 항상 인자로 전달)
// ============================================================================

fn add_listener_on<V, K>(target: &EventTarget<V>, key: K, listener: &Listener<K::Payload>)
where
    V: EventMap,
    K: EventKey<V>,
{
    target
        .registry()
        .add(target.id(), key.name(), listener.erase());
}

fn remove_listener_on<V, K>(target: &EventTarget<V>, key: K, listener: &Listener<K::Payload>)
where
    V: EventMap,
    K: EventKey<V>,
{
    target
        .registry()
        .remove(target.id(), &key.name(), listener.key());
}

fn dispatch_on<V, K>(
    target: &EventTarget<V>,
    key: K,
    params: Params<K::Payload>,
) -> Result<(), DispatchError>
where
    V: EventMap,
    K: EventKey<V>,
{
    let mut params = params.or_target(target.id());
    K::prepare(&mut params.payload);

    let event = Event::with_params(key.name(), params);
    target.registry().dispatch(target.id(), &event)
}

fn once_on<V, K>(target: &EventTarget<V>, key: K) -> Once<K::Payload>
where
    V: EventMap,
    K: EventKey<V>,
{
    once_impl::register(target, key)
}

// ============================================================================
// Methods - 대상을 명시적으로 받는 연산 묶음
// ============================================================================

/// 네 연산의 묶음 (크기 0, `Copy`)
///
/// 호스트가 필드로 보관하거나 그때그때 만들어 쓸 수 있습니다.
/// dispatch 를 외부에 공개하지 않으려는 호스트에 유용합니다.
pub struct Methods<V> {
    _events: PhantomData<fn() -> V>,
}

impl<V: EventMap> Methods<V> {
    pub const fn new() -> Self {
        Self {
            _events: PhantomData,
        }
    }

    pub fn add_listener<K>(&self, this: &EventTarget<V>, key: K, listener: &Listener<K::Payload>)
    where
        K: EventKey<V>,
    {
        add_listener_on(this, key, listener)
    }

    pub fn remove_listener<K>(&self, this: &EventTarget<V>, key: K, listener: &Listener<K::Payload>)
    where
        K: EventKey<V>,
    {
        remove_listener_on(this, key, listener)
    }

    pub fn dispatch<K>(
        &self,
        this: &EventTarget<V>,
        key: K,
        params: impl Into<Params<K::Payload>>,
    ) -> Result<(), DispatchError>
    where
        K: EventKey<V>,
    {
        dispatch_on(this, key, params.into())
    }

    pub fn once<K>(&self, this: &EventTarget<V>, key: K) -> Once<K::Payload>
    where
        K: EventKey<V>,
    {
        once_on(this, key)
    }
}

impl<V> Clone for Methods<V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for Methods<V> {}

impl<V: EventMap> Default for Methods<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> fmt::Debug for Methods<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Methods")
    }
}

impl<V: EventMap> EventTarget<V> {
    /// 이 사전에 대한 연산 묶음
    pub const fn methods() -> Methods<V> {
        Methods::new()
    }
}

// ============================================================================
// 팩토리 - 키 하나에 대한 fn 포인터
// ============================================================================

/// `add_listener` 함수 타입
pub type AddListenerFn<V, K> = fn(&EventTarget<V>, K, &Listener<<K as EventKey<V>>::Payload>);

/// `remove_listener` 함수 타입
pub type RemoveListenerFn<V, K> = fn(&EventTarget<V>, K, &Listener<<K as EventKey<V>>::Payload>);

/// `dispatch` 함수 타입
pub type DispatchFn<V, K> =
    fn(&EventTarget<V>, K, Params<<K as EventKey<V>>::Payload>) -> Result<(), DispatchError>;

/// `once` 함수 타입
pub type OnceFn<V, K> = fn(&EventTarget<V>, K) -> Once<<K as EventKey<V>>::Payload>;

/// Factory for add_listener
pub fn add_listener<V: EventMap, K: EventKey<V>>() -> AddListenerFn<V, K> {
    add_listener_on::<V, K>
}

/// Factory for remove_listener
pub fn remove_listener<V: EventMap, K: EventKey<V>>() -> RemoveListenerFn<V, K> {
    remove_listener_on::<V, K>
}

/// Factory for dispatch
pub fn dispatch<V: EventMap, K: EventKey<V>>() -> DispatchFn<V, K> {
    dispatch_on::<V, K>
}

/// Factory for once
pub fn once<V: EventMap, K: EventKey<V>>() -> OnceFn<V, K> {
    once_on::<V, K>
}

// ============================================================================
// 테스트
// ============================================================================
