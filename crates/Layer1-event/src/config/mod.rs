//! Registry Configuration - dispatch 정책 설정
//!
//! 리스너 실패 처리 방식과 로깅 수준을 설정합니다.
//!
//! ```json
//! {
//!   "failurePolicy": "stop_on_first",
//!   "catchPanics": true,
//!   "traceDispatch": false
//! }
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// 설정 파일명
pub const SETTINGS_FILE: &str = "event-target.json";

/// 리스너 실패 처리 정책
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// 실패해도 나머지 리스너를 모두 실행한 뒤 실패를 모아서 반환
    #[default]
    Aggregate,
    /// 첫 실패에서 dispatch 중단
    StopOnFirst,
}

impl FailurePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aggregate => "aggregate",
            Self::StopOnFirst => "stop_on_first",
        }
    }
}

/// 레지스트리 설정
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegistryConfig {
    /// 리스너 실패 처리 정책
    pub failure_policy: FailurePolicy,

    /// 리스너 panic 을 실패로 기록할지 여부 (false 면 panic 이 그대로 전파됨)
    pub catch_panics: bool,

    /// 디버그 모드 (모든 dispatch/전달을 trace 로깅)
    pub trace_dispatch: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            failure_policy: FailurePolicy::Aggregate,
            catch_panics: true,
            trace_dispatch: false,
        }
    }
}

impl RegistryConfig {
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn with_catch_panics(mut self, catch_panics: bool) -> Self {
        self.catch_panics = catch_panics;
        self
    }

    pub fn with_trace_dispatch(mut self, trace_dispatch: bool) -> Self {
        self.trace_dispatch = trace_dispatch;
        self
    }

    /// JSON 문자열에서 파싱 (누락된 필드는 기본값)
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| Error::Config(format!("invalid registry settings: {}", e)))
    }

    /// 설정 파일 로드
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_json(&content)?;

        debug!(
            path = %path.display(),
            failure_policy = config.failure_policy.as_str(),
            "Loaded registry settings"
        );

        Ok(config)
    }

    /// 파일이 있으면 로드, 없으면 기본값
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = RegistryConfig::default();
        assert_eq!(config.failure_policy, FailurePolicy::Aggregate);
        assert!(config.catch_panics);
        assert!(!config.trace_dispatch);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = RegistryConfig::from_json(r#"{ "failurePolicy": "stop_on_first" }"#).unwrap();
        assert_eq!(config.failure_policy, FailurePolicy::StopOnFirst);
        assert!(config.catch_panics);
    }

    #[test]
    fn test_invalid_json() {
        let err = RegistryConfig::from_json(r#"{ "failurePolicy": "sometimes" }"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);

        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, r#"{{ "catchPanics": false, "traceDispatch": true }}"#).unwrap();

        let config = RegistryConfig::load(&path).unwrap();
        assert!(!config.catch_panics);
        assert!(config.trace_dispatch);
        assert_eq!(config.failure_policy, FailurePolicy::Aggregate);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = RegistryConfig::load_or_default(&dir.path().join(SETTINGS_FILE)).unwrap();
        assert_eq!(config, RegistryConfig::default());
    }
}
