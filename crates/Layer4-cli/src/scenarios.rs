//! Scenarios - CLI 에서 실행하는 이벤트 대상 예제
//!
//! 각 시나리오는 전역 레지스트리를 사용하며, 리스너 실패는 `DispatchError`
//! 로 호출자에게 전달됩니다.

use event_target::{
    event_map, fields, DispatchError, Event, EventSource, EventTarget, Fields, Listener, Loose,
    Methods,
};
use futures::future::join_all;
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

// ============================================================================
// house
// ============================================================================

#[derive(Debug, Serialize)]
pub struct Visitor {
    pub who: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Mail {
    pub count: usize,
    pub is_promo: bool,
}

event_map! {
    pub HouseEvents {
        VisitorArrived = "visitor" => Visitor,
        MailArrived = "mail" => Mail,
    }
}

struct House {
    events: EventTarget<HouseEvents>,
}

impl EventSource for House {
    type Events = HouseEvents;

    fn event_target(&self) -> &EventTarget<HouseEvents> {
        &self.events
    }
}

impl House {
    fn visit(&self, who: &str) -> Result<(), DispatchError> {
        self.dispatch(VisitorArrived, Visitor { who: who.to_string() })
    }

    fn mail(&self, letters: &[&str], promo: &[&str]) -> Result<(), DispatchError> {
        self.dispatch(
            MailArrived,
            Mail {
                count: letters.len() + promo.len(),
                is_promo: !promo.is_empty(),
            },
        )
    }
}

pub fn house(who: &str) -> anyhow::Result<()> {
    let house = House {
        events: EventTarget::new(),
    };

    let greeter = Listener::named("greeter", |e: &Event<Visitor>| {
        info!(who = %e.who, house = ?e.target(), "Visitor at the door");
    });
    let mailbox = Listener::fallible(|e: &Event<Mail>| {
        let line = serde_json::to_string(e)?;
        info!(event = %line, "Mail arrived");
        Ok(())
    });

    house.add_listener(VisitorArrived, &greeter);
    house.add_listener(MailArrived, &mailbox);

    house.visit(who)?;
    house.mail(&["letter from Hogwarts"], &["TV Products"])?;

    house.remove_listener(VisitorArrived, &greeter);
    house.visit("nobody listens")?;

    Ok(())
}

// ============================================================================
// once
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ClickInfo {
    pub btn: u32,
}

event_map! {
    pub PointerEvents {
        Click = "click" => ClickInfo,
    }
}

pub async fn once(buttons: &[u32]) -> anyhow::Result<()> {
    if buttons.is_empty() {
        warn!("No buttons to click");
        return Ok(());
    }

    let target = EventTarget::<PointerEvents>::new();

    // 각 once 는 자신이 등록된 이후의 첫 dispatch 로 완료됨
    let mut waiters = vec![target.once(Click)];
    for (i, &btn) in buttons.iter().enumerate() {
        if i > 0 {
            waiters.push(target.once(Click));
        }
        target.dispatch(Click, ClickInfo { btn })?;
    }

    for (waiter, event) in join_all(waiters).await.into_iter().enumerate() {
        let event = event?;
        info!(waiter, btn = event.btn, time = %event.time_stamp(), "once() resolved");
    }

    let remaining = target.registry().listener_count(target.id(), Click::NAME);
    info!(remaining, "Internal once listeners left");

    Ok(())
}

// ============================================================================
// bare
// ============================================================================

pub fn bare() -> anyhow::Result<()> {
    let target = EventTarget::<Loose>::new();

    let printer = Listener::fallible(|e: &Event<Fields>| {
        let line = serde_json::to_string(e)?;
        info!(event = %line, "Loose event");
        Ok(())
    });
    target.add_listener("click", &printer);

    // name/timeStamp 는 payload 로 덮어쓸 수 없음
    target.dispatch(
        "click",
        fields(json!({ "name": "hacked", "timeStamp": 0, "btn": 1 })),
    )?;

    Ok(())
}

// ============================================================================
// private
// ============================================================================

event_map! {
    pub PersonEvents {
        Died = "died" => (),
    }
}

/// dispatch 를 외부에 공개하지 않는 호스트
struct Person {
    events: EventTarget<PersonEvents>,
}

impl Person {
    const METHODS: Methods<PersonEvents> = EventTarget::methods();

    fn add_listener(&self, listener: &Listener<()>) {
        Self::METHODS.add_listener(&self.events, Died, listener)
    }

    fn kill(&self) -> Result<(), DispatchError> {
        Self::METHODS.dispatch(&self.events, Died, ())
    }
}

pub fn private() -> anyhow::Result<()> {
    let person = Person {
        events: EventTarget::new(),
    };

    person.add_listener(&Listener::named("obituary", |e: &Event<()>| {
        info!(event = e.name(), "Person died");
    }));
    person.kill()?;

    Ok(())
}
