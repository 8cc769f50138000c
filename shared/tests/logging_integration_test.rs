//! 로깅 시스템 통합 테스트
//!
//! 전역 구독자는 프로세스당 한 번만 설치되므로 하나의 테스트에서 순서대로 확인합니다.

use anyhow::Result;
use shared::logging::{init_logging, LoggingConfig, ServiceType};

#[test]
fn test_logging_lifecycle() -> Result<()> {
    let config = LoggingConfig {
        level: "debug".to_string(),
        with_target: false,
        ansi: false,
    };

    // 잘못된 레벨은 설치 전에 거부
    let invalid = LoggingConfig {
        level: "verbose".to_string(),
        ..config.clone()
    };
    assert!(init_logging(ServiceType::ChatServer, &invalid).is_err());

    // 첫 설치는 성공, 이후 로그 매크로 사용 가능
    init_logging(ServiceType::ChatServer, &config)?;
    tracing::debug!(user = "alice", "로깅 통합 테스트");

    // 두 번째 설치는 실패
    assert!(init_logging(ServiceType::ChatClient, &config).is_err());
    Ok(())
}

#[test]
fn test_service_type_names() {
    assert_eq!(ServiceType::ChatServer.as_str(), "chatserver");
    assert_eq!(ServiceType::ChatClient.as_str(), "chatclient");
}
