//! 이벤트 대상 통합 테스트 - 호스트 타입 시나리오
//!
//! `cargo test -p event-target --test house_test`

use event_target::event::source;
use event_target::{
    event_map, fields, Error, Event, EventSource, EventTarget, FailurePolicy, Fields, Listener,
    Loose, Methods, Params, Registry, RegistryConfig,
};
use parking_lot::Mutex;
use serde_json::json;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

// ============================================================================
// House 사전
// ============================================================================

#[derive(Debug, Clone)]
pub struct Visitor {
    pub who: String,
}

#[derive(Debug, Clone)]
pub struct Mail {
    pub count: usize,
    pub is_promo: bool,
}

event_map! {
    /// 집에서 일어나는 이벤트
    pub HouseEvents {
        VisitorArrived = "visitor" => Visitor,
        MailArrived = "mail" => Mail,
    }
}

trait House: EventSource<Events = HouseEvents> {
    fn visit(&self, who: &str);
    fn mail(&self, letters: &[&str], promo: &[&str]);
}

/// EventSource 를 구현하는 호스트 (기본 메서드 사용)
struct ExtendingHouse {
    events: EventTarget<HouseEvents>,
}

impl EventSource for ExtendingHouse {
    type Events = HouseEvents;

    fn event_target(&self) -> &EventTarget<HouseEvents> {
        &self.events
    }
}

impl House for ExtendingHouse {
    fn visit(&self, who: &str) {
        self.dispatch(VisitorArrived, Visitor { who: who.to_string() })
            .unwrap();
    }

    fn mail(&self, letters: &[&str], promo: &[&str]) {
        self.dispatch(
            MailArrived,
            Mail {
                count: letters.len() + promo.len(),
                is_promo: !promo.is_empty(),
            },
        )
        .unwrap();
    }
}

/// 연산 묶음을 필드로 가진 호스트 (기본 메서드 대신 위임)
struct DelegatingHouse {
    events: EventTarget<HouseEvents>,
    methods: Methods<HouseEvents>,
}

impl EventSource for DelegatingHouse {
    type Events = HouseEvents;

    fn event_target(&self) -> &EventTarget<HouseEvents> {
        &self.events
    }

    fn add_listener<K>(&self, key: K, listener: &Listener<K::Payload>)
    where
        K: event_target::EventKey<HouseEvents>,
    {
        self.methods.add_listener(&self.events, key, listener)
    }

    fn remove_listener<K>(&self, key: K, listener: &Listener<K::Payload>)
    where
        K: event_target::EventKey<HouseEvents>,
    {
        self.methods.remove_listener(&self.events, key, listener)
    }
}

impl House for DelegatingHouse {
    fn visit(&self, who: &str) {
        self.methods
            .dispatch(&self.events, VisitorArrived, Visitor { who: who.to_string() })
            .unwrap();
    }

    fn mail(&self, letters: &[&str], promo: &[&str]) {
        self.methods
            .dispatch(
                &self.events,
                MailArrived,
                Mail {
                    count: letters.len() + promo.len(),
                    is_promo: !promo.is_empty(),
                },
            )
            .unwrap();
    }
}

fn test_house(house: &impl House) {
    let house_id = house.event_target().id();
    let visitor_runs = Arc::new(AtomicUsize::new(0));
    let mail_runs = Arc::new(AtomicUsize::new(0));

    let on_visitor = {
        let runs = visitor_runs.clone();
        Listener::new(move |e: &Event<Visitor>| {
            assert_eq!(e.name(), "visitor");
            assert_eq!(e.target(), Some(house_id));
            assert_eq!(e.who, "mum");
            runs.fetch_add(1, Ordering::SeqCst);
        })
    };
    let on_mail = {
        let runs = mail_runs.clone();
        Listener::new(move |e: &Event<Mail>| {
            assert_eq!(e.name(), "mail");
            assert_eq!(e.target(), Some(house_id));
            assert_eq!(e.count, 2);
            assert!(e.is_promo);
            runs.fetch_add(1, Ordering::SeqCst);
        })
    };

    house.add_listener(VisitorArrived, &on_visitor);
    house.add_listener(MailArrived, &on_mail);

    house.visit("mum");
    assert_eq!(visitor_runs.load(Ordering::SeqCst), 1);
    assert_eq!(mail_runs.load(Ordering::SeqCst), 0);

    house.mail(&["letter from Hogwarts"], &["TV Products"]);
    assert_eq!(visitor_runs.load(Ordering::SeqCst), 1);
    assert_eq!(mail_runs.load(Ordering::SeqCst), 1);

    let never_run = Listener::new(|_: &Event<Visitor>| panic!("This shouldn't have run"));
    house.add_listener(VisitorArrived, &never_run);
    house.remove_listener(VisitorArrived, &never_run);
    house.visit("mum");
    assert_eq!(visitor_runs.load(Ordering::SeqCst), 2);
}

#[test]
fn test_extensible_house() {
    test_house(&ExtendingHouse {
        events: EventTarget::new(),
    });
}

#[test]
fn test_implementable_house() {
    test_house(&DelegatingHouse {
        events: EventTarget::new(),
        methods: EventTarget::methods(),
    });
}

// ============================================================================
// Bare 대상
// ============================================================================

#[test]
fn test_bare_target() {
    let registry = Arc::new(Registry::new());
    let bare = EventTarget::<Loose>::in_registry(registry.clone());
    let run = Arc::new(AtomicBool::new(false));

    let listener = {
        let run = run.clone();
        Listener::new(move |_: &Event<Fields>| run.store(true, Ordering::SeqCst))
    };

    source::add_listener::<Loose, &str>()(&bare, "click", &listener);
    source::dispatch::<Loose, &str>()(&bare, "click", Params::new(Fields::new())).unwrap();

    assert!(run.load(Ordering::SeqCst));
    assert_eq!(registry.listener_count(bare.id(), "click"), 1);

    // 대상이 사라지면 저장소도 함께 해제
    let id = bare.id();
    drop(bare);
    assert!(!registry.contains(id));
}

#[test]
fn test_dispatch_touches_only_own_storage() {
    let registry = Arc::new(Registry::new());
    let a = EventTarget::<Loose>::in_registry(registry.clone());
    let b = EventTarget::<Loose>::in_registry(registry.clone());

    b.add_listener("click", &Listener::new(|_: &Event<Fields>| panic!("wrong target")));
    a.dispatch("click", Fields::new()).unwrap();

    assert_eq!(registry.listener_count(a.id(), "click"), 0);
    assert_eq!(registry.listener_count(b.id(), "click"), 1);
}

// ============================================================================
// Private dispatch
// ============================================================================

event_map! {
    pub PersonEvents {
        Died = "died" => (),
    }
}

/// 외부에서는 dispatch 할 수 없는 호스트
struct Person {
    events: EventTarget<PersonEvents>,
}

impl Person {
    const METHODS: Methods<PersonEvents> = EventTarget::methods();

    fn new() -> Self {
        Self {
            events: EventTarget::new(),
        }
    }

    fn add_listener(&self, key: Died, listener: &Listener<()>) {
        Self::METHODS.add_listener(&self.events, key, listener)
    }

    fn kill(&self) {
        Self::METHODS.dispatch(&self.events, Died, ()).unwrap();
    }
}

#[test]
fn test_private_dispatch() {
    let person = Person::new();
    let run = Arc::new(AtomicBool::new(false));

    let listener = {
        let run = run.clone();
        Listener::new(move |_: &Event<()>| run.store(true, Ordering::SeqCst))
    };
    person.add_listener(Died, &listener);

    person.kill();
    assert!(run.load(Ordering::SeqCst));
}

// ============================================================================
// once
// ============================================================================

event_map! {
    pub Dictionary {
        Click = "click" => ClickInfo,
        Load = "load" => LoadInfo,
    }
}

#[derive(Debug)]
pub struct ClickInfo {
    pub btn: u32,
}

#[derive(Debug)]
pub struct LoadInfo {
    pub src: String,
}

#[tokio::test]
async fn test_once_resolves_each_pending_call_once() {
    let target = EventTarget::<Dictionary>::new();

    let first = target.once(Click);
    let second = target.once(Click);

    target.dispatch(Click, ClickInfo { btn: 42 }).unwrap();
    let third = target.once(Click);
    target.dispatch(Click, ClickInfo { btn: 69 }).unwrap();

    let first = first.await.unwrap();
    let second = second.await.unwrap();
    let third = third.await.unwrap();

    assert_eq!(first.name(), "click");
    assert_eq!(first.btn, 42);
    assert_eq!(second.btn, 42);
    assert_eq!(third.btn, 69);

    let registry = target.registry();
    assert_eq!(registry.listener_count(target.id(), "click"), 0);
}

#[tokio::test]
async fn test_once_ignores_earlier_dispatch() {
    let target = EventTarget::<Dictionary>::new();

    target.dispatch(Load, LoadInfo { src: "a.png".into() }).unwrap();
    let pending = target.once(Load);
    target.dispatch(Load, LoadInfo { src: "b.png".into() }).unwrap();

    assert_eq!(pending.await.unwrap().src, "b.png");
}

#[tokio::test]
async fn test_once_across_tasks() {
    let target = Arc::new(EventTarget::<Loose>::new());
    let pending = target.once("ready");

    let waiter = tokio::spawn(async move { pending.await.map(|e| e.field("n").cloned()) });

    let dispatcher = {
        let target = target.clone();
        tokio::spawn(async move {
            target.dispatch("ready", fields(json!({ "n": 7 }))).unwrap();
        })
    };

    dispatcher.await.unwrap();
    let value = waiter.await.unwrap().unwrap();
    assert_eq!(value, Some(json!(7)));
}

#[tokio::test]
async fn test_once_target_released() {
    let target = EventTarget::<Loose>::new();
    let pending = target.once("never");
    drop(target);

    assert!(matches!(pending.await, Err(Error::TargetReleased)));
}

// ============================================================================
// 실패 정책
// ============================================================================

#[test]
fn test_failing_listener_does_not_stop_others() {
    let registry = Arc::new(Registry::new());
    let target = EventTarget::<Loose>::in_registry(registry);
    let log = Arc::new(Mutex::new(Vec::new()));

    let failing = Listener::fallible(|_: &Event<Fields>| anyhow::bail!("listener broke"));
    let after = {
        let log = log.clone();
        Listener::new(move |_: &Event<Fields>| log.lock().push("after"))
    };

    target.add_listener("save", &failing);
    target.add_listener("save", &after);

    let err = target.dispatch("save", Fields::new()).unwrap_err();
    assert_eq!(err.failures.len(), 1);
    assert_eq!(*log.lock(), vec!["after"]);
}

#[test]
fn test_stop_on_first_policy() {
    let config = RegistryConfig::default().with_failure_policy(FailurePolicy::StopOnFirst);
    let target = EventTarget::<Loose>::in_registry(Arc::new(Registry::with_config(config)));
    let log = Arc::new(Mutex::new(Vec::new()));

    let failing = Listener::new(|_: &Event<Fields>| panic!("listener panicked"));
    let after = {
        let log = log.clone();
        Listener::new(move |_: &Event<Fields>| log.lock().push("after"))
    };

    target.add_listener("save", &failing);
    target.add_listener("save", &after);

    let err = target.dispatch("save", Fields::new()).unwrap_err();
    assert!(err.failures[0].is_panic());
    assert!(log.lock().is_empty());
}
