//! 로깅 설정 관리
//!
//! 로깅 시스템의 설정 파라미터와 서비스 타입 정의를 담당합니다.

use anyhow::{anyhow, Result};

use crate::config::{env_flag, env_string};

/// 허용되는 로그 레벨
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// 서비스 타입 열거형
///
/// 로그 출력 시 어떤 바이너리에서 나온 로그인지 구분합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceType {
    /// 채팅 중계 서버
    ChatServer,
    /// 터미널 채팅 클라이언트
    ChatClient,
}

impl ServiceType {
    /// 서비스 타입을 문자열로 변환
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::ChatServer => "chatserver",
            ServiceType::ChatClient => "chatclient",
        }
    }
}

/// 로깅 시스템 설정
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// `RUST_LOG`가 없을 때 사용할 기본 레벨 (기본값: "info")
    pub level: String,

    /// 로그에 모듈 경로 출력 여부 (기본값: true)
    pub with_target: bool,

    /// ANSI 색상 사용 여부 (기본값: true)
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            with_target: true,
            ansi: true,
        }
    }
}

impl LoggingConfig {
    /// 환경변수에서 설정 로드
    ///
    /// - `LOG_LEVEL`: 기본 로그 레벨
    /// - `LOG_WITH_TARGET`: 모듈 경로 출력 여부
    /// - `LOG_ANSI`: 색상 출력 여부
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            level: env_string("LOG_LEVEL", &defaults.level).to_lowercase(),
            with_target: env_flag("LOG_WITH_TARGET", defaults.with_target),
            ansi: env_flag("LOG_ANSI", defaults.ansi),
        }
    }

    /// 설정 유효성 검증
    pub fn validate(&self) -> Result<()> {
        if !LOG_LEVELS.contains(&self.level.as_str()) {
            return Err(anyhow!("알 수 없는 로그 레벨: {}", self.level));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_type_as_str() {
        assert_eq!(ServiceType::ChatServer.as_str(), "chatserver");
        assert_eq!(ServiceType::ChatClient.as_str(), "chatclient");
    }

    #[test]
    fn test_default_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert!(config.with_target);
        assert!(config.ansi);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = LoggingConfig::default();
        config.level = "verbose".to_string();
        assert!(config.validate().is_err());

        config.level = "debug".to_string();
        assert!(config.validate().is_ok());
    }
}
