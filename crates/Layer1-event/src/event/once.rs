//! Once - 다음 이벤트 한 번을 기다리는 future
//!
//! 내부 리스너는 처음 호출될 때 자신을 먼저 해제한 뒤 future 를 완료합니다.
//! 완료는 이벤트를 발생시킨 dispatch 호출 안에서 동기적으로 일어납니다.
//!
//! 내부 리스너는 외부에 노출되지 않으므로 등록된 once 를 취소할 수는 없습니다.
//! `Once` 를 drop 해도 리스너는 다음 dispatch 때까지 남아 있다가 그때 해제됩니다.

use super::listener::{Listener, WeakListener};
use super::registry::EventTarget;
use super::types::Event;
use super::vocabulary::{EventKey, EventMap};
use crate::{Error, Result};
use parking_lot::Mutex;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, OnceLock};
use std::task::{Context, Poll};
use tokio::sync::oneshot;

/// [`EventSource::once`](super::EventSource::once) 가 반환하는 future
///
/// 대상이 먼저 drop 되면 `Error::TargetReleased` 로 완료됩니다.
///
/// # 제한
///
/// - 취소할 수 없습니다. `Once` 를 drop 해도 내부 리스너는 해당 이름의
///   다음 dispatch 까지 등록된 채로 남고, 그 dispatch 에서 이벤트를 버리며
///   해제됩니다.
/// - 그 이름으로 dispatch 가 다시 일어나지 않으면 drop 된 `Once` 의 리스너가
///   개수 제한 없이 쌓입니다. 대상이 drop 될 때에야 함께 해제됩니다.
#[must_use = "futures do nothing unless awaited"]
#[derive(Debug)]
pub struct Once<P> {
    rx: oneshot::Receiver<Event<P>>,
}

impl<P> Once<P> {
    /// 이미 완료됐으면 이벤트를 꺼냄 (대기하지 않음)
    pub fn try_take(&mut self) -> Option<Event<P>> {
        self.rx.try_recv().ok()
    }
}

impl<P> Future for Once<P> {
    type Output = Result<Event<P>>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.get_mut().rx)
            .poll(cx)
            .map(|received| received.map_err(|_| Error::TargetReleased))
    }
}

pub(crate) fn register<V, K>(target: &EventTarget<V>, key: K) -> Once<K::Payload>
where
    V: EventMap,
    K: EventKey<V>,
{
    let (tx, rx) = oneshot::channel();
    let sender = Mutex::new(Some(tx));

    // 자기 자신을 해제하기 위한 약한 참조 (레지스트리만 강한 참조를 가짐)
    let this: Arc<OnceLock<WeakListener<K::Payload>>> = Arc::new(OnceLock::new());
    let registry = Arc::downgrade(target.registry());
    let id = target.id();
    let name = key.name();

    let listener = Listener::new({
        let this = this.clone();
        let name = name.clone();
        move |event: &Event<K::Payload>| {
            let me = this.get().and_then(WeakListener::upgrade);
            if let (Some(registry), Some(me)) = (registry.upgrade(), me) {
                registry.remove(id, &name, me.key());
            }

            if let Some(tx) = sender.lock().take() {
                // 수신측이 이미 drop 됐으면 이벤트는 버림
                let _ = tx.send(event.clone());
            }
        }
    });

    let _ = this.set(listener.downgrade());
    target.registry().add(id, name, listener.erase());

    Once { rx }
}
