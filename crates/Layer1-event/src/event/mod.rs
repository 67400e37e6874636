//! Event System - 믹스인 방식의 이벤트 발행/구독
//!
//! 어떤 타입이든 상속 없이 이벤트 소스가 될 수 있습니다. 리스너 저장소는
//! 대상 객체 바깥의 레지스트리에 있고, 대상에는 불투명한 토큰만 남습니다.
//!
//! ## 아키텍처
//!
//! ```text
//! ┌──────────────────────┐        ┌──────────────────────────────────────┐
//! │  House               │        │  Registry (process-wide)             │
//! │  └─ EventTarget ─────┼──id──▶ │  TargetId ─▶ "visitor" ─▶ [f1, f2]   │
//! └──────────────────────┘        │           └▶ "mail"    ─▶ [g1]       │
//!                                 └──────────────────────────────────────┘
//!   dispatch("visitor", payload)
//!     └─▶ Event { name, timeStamp, source, target, ..payload }
//!           └─▶ f1(&event), f2(&event)   (등록 순서, 스냅샷)
//! ```
//!
//! ## 사용법
//!
//! ```ignore
//! use event_target::event::{fields, Event, Loose, EventSource, EventTarget, Fields, Listener};
//! use serde_json::json;
//!
//! // 1. 대상 생성 (호스트에 필드로 넣거나 그대로 사용)
//! let target = EventTarget::<Loose>::new();
//!
//! // 2. 리스너 등록
//! let listener = Listener::new(|e: &Event<Fields>| println!("{}", e.name()));
//! target.add_listener("click", &listener);
//!
//! // 3. 이벤트 발행
//! target.dispatch("click", fields(json!({ "btn": 1 })))?;
//!
//! // 4. 다음 이벤트 한 번 기다리기
//! let event = target.once("click").await?;
//! ```

pub mod listener;
pub mod once;
pub mod registry;
pub mod source;
pub mod types;
pub mod vocabulary;

// Re-exports
pub use listener::{Listener, ListenerKey};
pub use once::Once;
pub use registry::{global_registry, init_global_registry, EventTarget, Registry};
pub use source::{
    AddListenerFn, DispatchFn, EventSource, Methods, OnceFn, RemoveListenerFn,
};
pub use types::{fields, strip_reserved, Event, EventName, Fields, Params, TargetId, RESERVED_FIELDS};
pub use vocabulary::{EventKey, EventMap, Loose};
