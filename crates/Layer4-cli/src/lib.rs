//! event-target CLI - 시나리오 라이브러리
//!
//! `evtarget` 바이너리와 통합 테스트가 함께 사용합니다.

pub mod scenarios;
