//! 통합 로깅 시스템
//!
//! 채팅 서버와 클라이언트가 같은 형식으로 로그를 남기도록
//! `tracing_subscriber` 초기화를 한 곳에서 담당합니다.
//!
//! # 사용 예시
//! ```no_run
//! use shared::logging::{init_logging, LoggingConfig, ServiceType};
//!
//! fn main() -> anyhow::Result<()> {
//!     init_logging(ServiceType::ChatServer, &LoggingConfig::from_env())?;
//!     tracing::info!("서버 시작");
//!     Ok(())
//! }
//! ```

pub mod config;

pub use config::{LoggingConfig, ServiceType};

use anyhow::{anyhow, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 로깅 시스템 초기화 함수
///
/// `RUST_LOG`가 설정되어 있으면 그 필터를, 아니면 `config.level`을 사용합니다.
/// 전역 구독자는 한 번만 설치할 수 있으므로 두 번째 호출은 에러를 반환합니다.
pub fn init_logging(service_type: ServiceType, config: &LoggingConfig) -> Result<()> {
    config.validate()?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.with_target)
        .with_ansi(config.ansi)
        .try_init()
        .map_err(|e| anyhow!("로깅 시스템이 이미 초기화됨: {}", e))?;

    info!(service = service_type.as_str(), "로깅 시스템 초기화 완료");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_twice_fails() {
        let config = LoggingConfig {
            ansi: false,
            ..LoggingConfig::default()
        };

        // 다른 테스트가 먼저 설치했을 수도 있으므로 첫 결과는 확인하지 않음
        let _ = init_logging(ServiceType::ChatServer, &config);
        assert!(init_logging(ServiceType::ChatServer, &config).is_err());
    }

    #[test]
    fn test_invalid_level_rejected_before_install() {
        let config = LoggingConfig {
            level: "loud".to_string(),
            ..LoggingConfig::default()
        };
        assert!(init_logging(ServiceType::ChatClient, &config).is_err());
    }
}
