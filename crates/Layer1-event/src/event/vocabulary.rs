//! Event Vocabulary - 이벤트 이름과 payload 타입의 대응
//!
//! 대상 객체는 두 가지 방식 중 하나로 선언합니다.
//!
//! - [`Loose`]: 아무 문자열이나 이벤트 이름으로 사용, payload 는 [`Fields`]
//! - 닫힌 사전: [`event_map!`] 으로 이름마다 payload 타입을 고정.
//!   선언되지 않은 이름이나 잘못된 payload 는 컴파일 에러가 됩니다.
//!
//! ```ignore
//! event_map! {
//!     pub HouseEvents {
//!         VisitorArrived = "visitor" => Visitor,
//!         MailArrived = "mail" => Mail,
//!     }
//! }
//!
//! let house = EventTarget::<HouseEvents>::new();
//! house.add_listener(VisitorArrived, &Listener::new(|e: &Event<Visitor>| println!("{}", e.who)));
//! house.dispatch(VisitorArrived, Visitor { who: "mum".into() })?;
//! ```

use super::types::{strip_reserved, EventName, Fields};
use std::borrow::Cow;

/// 이벤트 사전 (대상이 받는 이벤트의 집합)
pub trait EventMap: Send + Sync + 'static {}

/// 열린 문자열 사전 - payload 는 동적 [`Fields`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Loose;

impl EventMap for Loose {}

/// 사전 `V` 에 속한 이벤트 키
///
/// 키마다 정확히 하나의 payload 타입이 정해집니다.
pub trait EventKey<V: EventMap> {
    type Payload: Send + Sync + 'static;

    /// 레지스트리에서 사용하는 이벤트 이름
    fn name(&self) -> EventName;

    /// 이벤트 생성 직전 payload 정리
    fn prepare(_payload: &mut Self::Payload) {}
}

impl<'a> EventKey<Loose> for &'a str {
    type Payload = Fields;

    fn name(&self) -> EventName {
        Cow::Owned((*self).to_string())
    }

    fn prepare(payload: &mut Fields) {
        strip_reserved(payload);
    }
}

impl EventKey<Loose> for String {
    type Payload = Fields;

    fn name(&self) -> EventName {
        Cow::Owned(self.clone())
    }

    fn prepare(payload: &mut Fields) {
        strip_reserved(payload);
    }
}

/// 닫힌 이벤트 사전 선언
///
/// 사전 타입과 이벤트마다 크기 0 인 키 타입을 생성합니다.
#[macro_export]
macro_rules! event_map {
    (
        $(#[$meta:meta])*
        $vis:vis $map:ident {
            $(
                $(#[$key_meta:meta])*
                $key:ident = $name:literal => $payload:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        $vis struct $map;

        impl $crate::event::EventMap for $map {}

        $(
            $(#[$key_meta])*
            #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
            $vis struct $key;

            impl $key {
                /// 이벤트 이름
                pub const NAME: &'static str = $name;
            }

            impl $crate::event::EventKey<$map> for $key {
                type Payload = $payload;

                fn name(&self) -> $crate::event::EventName {
                    ::std::borrow::Cow::Borrowed($name)
                }
            }
        )*
    };
}
