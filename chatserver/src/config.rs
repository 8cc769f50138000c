//! 채팅 서버 환경 설정 모듈
//!
//! `.env` 파일과 환경변수에서 설정을 로드하고 관리합니다.

use anyhow::Result;
use shared::config::{env_or, env_string, load_env_file};
use tokio::time::Duration;
use tracing::info;

use crate::tool::error::ChatError;

/// 기본 포트 (클라이언트와 같아야 함)
pub const DEFAULT_PORT: u16 = 8888;

/// 채팅 서버 설정 구조체
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatServerConfig {
    /// 바인드 호스트 주소
    pub host: String,
    /// 바인드 포트 번호
    pub port: u16,
    /// 한 줄 전송 최대 대기 시간 (밀리초)
    pub send_timeout_ms: u64,
    /// 수신 한 줄 최대 길이 (바이트)
    pub max_line_bytes: usize,
}

impl Default for ChatServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            send_timeout_ms: 5_000,
            max_line_bytes: 8 * 1024,
        }
    }
}

impl ChatServerConfig {
    /// 환경변수에서 설정을 로드합니다.
    ///
    /// - `chat_host`: 바인드 호스트 (기본값: "0.0.0.0")
    /// - `chat_port`: 바인드 포트 (기본값: 8888)
    /// - `chat_send_timeout_ms`: 전송 타임아웃 (기본값: 5000)
    /// - `chat_max_line_bytes`: 최대 줄 길이 (기본값: 8192)
    pub fn from_env() -> Result<Self> {
        load_env_file();

        let defaults = Self::default();
        let config = Self {
            host: env_string("chat_host", &defaults.host),
            port: env_or("chat_port", defaults.port),
            send_timeout_ms: env_or("chat_send_timeout_ms", defaults.send_timeout_ms),
            max_line_bytes: env_or("chat_max_line_bytes", defaults.max_line_bytes),
        };

        info!("채팅 서버 설정 로드 완료: {:?}", config);
        Ok(config)
    }

    /// 포트 덮어쓰기 (명령행 인자용)
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// 바인딩 주소를 반환합니다.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }
}

/// 설정 검증 유틸리티
pub fn validate_config(config: &ChatServerConfig) -> Result<()> {
    let invalid = |key: &str, message: String| ChatError::Configuration {
        key: key.to_string(),
        message,
    };

    if config.host.is_empty() {
        return Err(invalid("chat_host", "호스트 주소가 비어있습니다".to_string()).into());
    }

    // u16 최대값은 65535이므로 0만 확인
    if config.port == 0 {
        return Err(invalid("chat_port", format!("유효하지 않은 포트 번호: {}", config.port)).into());
    }

    if config.send_timeout_ms == 0 {
        return Err(invalid("chat_send_timeout_ms", "전송 타임아웃은 0보다 커야 합니다".to_string()).into());
    }

    if config.max_line_bytes == 0 {
        return Err(invalid("chat_max_line_bytes", "최대 줄 길이는 0보다 커야 합니다".to_string()).into());
    }

    Ok(())
}
