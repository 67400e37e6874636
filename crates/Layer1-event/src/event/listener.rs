//! Listener - 식별 가능한 콜백 핸들
//!
//! 클로저 자체에는 식별성이 없으므로 `Listener` 로 감싸서 등록/해제합니다.
//! clone 한 핸들은 같은 리스너이고, 따로 만든 두 핸들은 (같은 클로저라도)
//! 서로 다른 리스너입니다.

use super::types::Event;
use std::any::Any;
use std::fmt;
use std::sync::{Arc, Weak};

type Callback<P> = dyn Fn(&Event<P>) -> anyhow::Result<()> + Send + Sync;

struct ListenerInner<P> {
    label: Option<String>,
    callback: Box<Callback<P>>,
}

// ============================================================================
// ListenerKey
// ============================================================================

/// 리스너 식별자 (콜백 할당 주소)
///
/// 레지스트리가 리스너를 보유하는 동안에는 주소가 재사용되지 않습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerKey(usize);

impl fmt::Display for ListenerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{:x}", self.0)
    }
}

// ============================================================================
// Listener
// ============================================================================

/// 이벤트 리스너
///
/// ```ignore
/// let listener = Listener::new(|e: &Event<Fields>| println!("{}", e.name()));
/// target.add_listener("click", &listener);
/// target.remove_listener("click", &listener);
/// ```
pub struct Listener<P> {
    inner: Arc<ListenerInner<P>>,
}

impl<P: 'static> Listener<P> {
    /// 실패하지 않는 콜백으로 리스너 생성
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&Event<P>) + Send + Sync + 'static,
    {
        Self::fallible(move |event| {
            callback(event);
            Ok(())
        })
    }

    /// `Result` 를 반환하는 콜백으로 리스너 생성
    ///
    /// `Err` 는 dispatch 호출자에게 `DispatchError` 로 전달됩니다.
    pub fn fallible<F>(callback: F) -> Self
    where
        F: Fn(&Event<P>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(ListenerInner {
                label: None,
                callback: Box::new(callback),
            }),
        }
    }

    /// 이름 붙은 리스너 생성 (로깅용)
    pub fn named<F>(label: impl Into<String>, callback: F) -> Self
    where
        F: Fn(&Event<P>) + Send + Sync + 'static,
    {
        let mut listener = Self::new(callback);
        if let Some(inner) = Arc::get_mut(&mut listener.inner) {
            inner.label = Some(label.into());
        }
        listener
    }

    pub fn label(&self) -> Option<&str> {
        self.inner.label.as_deref()
    }

    pub fn key(&self) -> ListenerKey {
        ListenerKey(Arc::as_ptr(&self.inner) as *const () as usize)
    }

    pub(crate) fn call(&self, event: &Event<P>) -> anyhow::Result<()> {
        (self.inner.callback)(event)
    }

    pub(crate) fn erase(&self) -> ErasedListener {
        ErasedListener {
            key: self.key(),
            inner: Arc::clone(&self.inner) as Arc<dyn Any + Send + Sync>,
        }
    }

    /// 타입이 맞으면 원래 리스너로 복원
    pub(crate) fn restore(erased: &ErasedListener) -> Option<Self> {
        Arc::clone(&erased.inner)
            .downcast::<ListenerInner<P>>()
            .ok()
            .map(|inner| Self { inner })
    }

    pub(crate) fn downgrade(&self) -> WeakListener<P> {
        WeakListener {
            inner: Arc::downgrade(&self.inner),
        }
    }
}

impl<P> Clone for Listener<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P> PartialEq for Listener<P> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<P> Eq for Listener<P> {}

impl<P> fmt::Debug for Listener<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("label", &self.inner.label)
            .field("ptr", &Arc::as_ptr(&self.inner))
            .finish()
    }
}

/// 리스너의 약한 참조 (once 의 자기 해제용)
pub(crate) struct WeakListener<P> {
    inner: Weak<ListenerInner<P>>,
}

impl<P> WeakListener<P> {
    pub(crate) fn upgrade(&self) -> Option<Listener<P>> {
        self.inner.upgrade().map(|inner| Listener { inner })
    }
}

// ============================================================================
// ErasedListener - 레지스트리 저장용
// ============================================================================

/// 타입이 지워진 리스너 (이벤트 이름마다 payload 타입이 다르므로)
#[derive(Clone)]
pub(crate) struct ErasedListener {
    pub(crate) key: ListenerKey,
    inner: Arc<dyn Any + Send + Sync>,
}

// ============================================================================
// 테스트
// ============================================================================
