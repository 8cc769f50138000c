//! LAN 채팅 중계 서버
//!
//! 사용법: `chatserver [포트]`
//!
//! 환경 설정은 .env 파일 또는 시스템 환경변수에서 로드됩니다.
//!
//! 환경변수:
//! - chat_host: 바인드 호스트 (기본값: "0.0.0.0")
//! - chat_port: 바인드 포트 (기본값: "8888")
//! - chat_send_timeout_ms: 한 줄 전송 타임아웃 (기본값: "5000")
//! - chat_max_line_bytes: 수신 한 줄 최대 길이 (기본값: "8192")
//! - LOG_LEVEL / RUST_LOG: 로그 레벨

use anyhow::{Context, Result};
use shared::logging::{init_logging, LoggingConfig, ServiceType};
use tracing::info;

use chatserver::tool::NetworkUtils;
use chatserver::{validate_config, ChatServerConfig, ChatService};

#[tokio::main]
async fn main() -> Result<()> {
    // 로깅 설정
    init_logging(ServiceType::ChatServer, &LoggingConfig::from_env())?;

    // 환경 설정 로드 (첫 번째 인자가 있으면 포트 덮어쓰기)
    let mut config = ChatServerConfig::from_env()?;
    if let Some(port_arg) = std::env::args().nth(1) {
        let port = port_arg
            .parse::<u16>()
            .with_context(|| format!("포트 인자 파싱 실패: {}", port_arg))?;
        config = config.with_port(port);
    }

    // 설정 검증
    validate_config(&config)?;

    info!("=== LAN 채팅 서버 ===");
    info!("리스닝 주소: {}", config.bind_address());
    info!("클라이언트 접속 주소: {}:{}", NetworkUtils::local_ipv4(), config.port);
    info!("=====================");

    let service = ChatService::new(config);
    let listener = service.bind().await?;

    // Ctrl+C 시그널까지 연결 수락
    service
        .serve_until(listener, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("종료 시그널 대기 실패: {}", e);
                std::future::pending::<()>().await;
            }
            info!("종료 시그널 수신, 서버를 중지합니다...");
        })
        .await?;

    let stats = service.stats();
    info!(
        "✅ 서버 중지 완료 (누적 연결 {}, 최대 동시 접속 {})",
        stats.total_accepted, stats.registry.peak_users
    );
    Ok(())
}
