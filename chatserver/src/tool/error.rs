//! 공통 에러 처리 시스템
//!
//! 채팅 서버에서 발생하는 모든 에러를 체계적으로 관리합니다.
//! 클라이언트에게 보여줄 안내 문구와 로그 심각도를 에러 종류별로 결정합니다.

use std::fmt;
use thiserror::Error;
use tracing::{error, info, warn};

/// 사용자 이름 거부 사유
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsernameRejection {
    /// 공백을 제거하면 빈 문자열
    Empty,
    /// 이미 접속 중인 사용자가 사용 중
    Taken,
}

impl fmt::Display for UsernameRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UsernameRejection::Empty => write!(f, "빈 이름"),
            UsernameRejection::Taken => write!(f, "이미 사용 중"),
        }
    }
}

/// 채팅 서버 에러 타입
///
/// 어떤 에러도 서버 프로세스 전체를 멈추지 않습니다.
/// 각 에러는 해당 세션 안에서만 처리됩니다.
#[derive(Error, Debug)]
pub enum ChatError {
    /// 핸드셰이크에서 거부된 사용자 이름
    #[error("사용자 이름 거부 [{username:?}]: {reason}")]
    InvalidUsername {
        username: String,
        reason: UsernameRejection,
    },

    /// 알려진 태그지만 필드 수가 맞지 않는 메시지
    #[error("메시지 형식 오류 [{tag}]: 필드 {expected}개 필요, {actual}개 수신")]
    MalformedMessage {
        tag: &'static str,
        expected: usize,
        actual: usize,
    },

    /// 귓속말 대상이 접속 중이 아님
    #[error("수신자 오프라인: {receiver}")]
    RecipientOffline { receiver: String },

    /// 한 줄로 보낼 수 없는 내용 (개행 포함)
    #[error("전송 불가 내용 [{tag}]: {reason}")]
    InvalidContent { tag: &'static str, reason: String },

    /// 특정 수신자에게 쓰기 실패
    #[error("전송 실패 [{target}]: {message}")]
    PeerSendFailure { target: String, message: String },

    /// 읽기 스트림 종료 (EOF 또는 I/O 에러)
    #[error("스트림 종료: {reason}")]
    StreamTerminated { reason: String },

    /// 기타 I/O 에러
    #[error("I/O 에러: {0}")]
    Io(#[from] std::io::Error),

    /// 설정 관련 에러
    #[error("설정 에러 [키: {key}]: {message}")]
    Configuration { key: String, message: String },
}

/// 결과 타입 별칭
pub type ChatResult<T> = Result<T, ChatError>;

/// 에러 심각도 레벨
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// 정보성 - 정상 동작 중 발생하는 예상 가능한 상황
    Info,
    /// 경고 - 주의가 필요하지만 서비스는 계속 가능
    Warning,
    /// 에러 - 기능에 영향을 주지만 복구 가능
    Error,
    /// 치명적 - 서비스 시작이 불가능한 문제
    Critical,
}

impl ChatError {
    /// 빈 이름 에러 생성
    pub fn empty_username(raw: &str) -> Self {
        Self::InvalidUsername {
            username: raw.to_string(),
            reason: UsernameRejection::Empty,
        }
    }

    /// 중복 이름 에러 생성
    pub fn username_taken(username: &str) -> Self {
        Self::InvalidUsername {
            username: username.to_string(),
            reason: UsernameRejection::Taken,
        }
    }

    /// 전송 실패 에러 생성
    pub fn send_failure(target: &str, message: impl fmt::Display) -> Self {
        Self::PeerSendFailure {
            target: target.to_string(),
            message: message.to_string(),
        }
    }

    /// 스트림 종료 에러 생성
    pub fn terminated(reason: impl fmt::Display) -> Self {
        Self::StreamTerminated {
            reason: reason.to_string(),
        }
    }

    /// 로그 심각도
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ChatError::MalformedMessage { .. }
            | ChatError::InvalidContent { .. }
            | ChatError::RecipientOffline { .. }
            | ChatError::StreamTerminated { .. } => ErrorSeverity::Info,
            ChatError::InvalidUsername { .. } | ChatError::PeerSendFailure { .. } => {
                ErrorSeverity::Warning
            }
            ChatError::Io(_) => ErrorSeverity::Error,
            ChatError::Configuration { .. } => ErrorSeverity::Critical,
        }
    }

    /// 클라이언트에게 `PlainText`로 보낼 안내 문구
    ///
    /// 스트림 종료처럼 사용자에게 보이지 않아야 하는 에러는 `None`입니다.
    pub fn user_notice(&self) -> Option<String> {
        match self {
            ChatError::InvalidUsername {
                reason: UsernameRejection::Empty,
                ..
            } => Some("Username cannot be empty!".to_string()),
            ChatError::InvalidUsername {
                reason: UsernameRejection::Taken,
                ..
            } => Some("Username is already taken, please choose another!".to_string()),
            ChatError::MalformedMessage { tag, .. } => {
                Some(format!("{} message format error!", tag))
            }
            ChatError::RecipientOffline { receiver } => {
                Some(format!("Private message failed: {} is not online!", receiver))
            }
            ChatError::PeerSendFailure { target, .. } => {
                Some(format!("Private message failed: {} has gone offline!", target))
            }
            ChatError::InvalidContent { .. }
            | ChatError::StreamTerminated { .. }
            | ChatError::Io(_)
            | ChatError::Configuration { .. } => None,
        }
    }
}

/// 에러 핸들러
///
/// 모든 에러를 중앙에서 심각도에 맞는 레벨로 로깅합니다.
pub struct ErrorHandler;

impl ErrorHandler {
    /// 에러를 처리하고 로깅합니다.
    ///
    /// # Arguments
    ///
    /// * `error` - 처리할 에러
    /// * `component` - 에러가 발생한 컴포넌트
    /// * `operation` - 에러가 발생한 작업
    pub fn handle_error(error: &ChatError, component: &str, operation: &str) {
        let log_message = format!("[{}] [{}] {}", component, operation, error);

        match error.severity() {
            ErrorSeverity::Info => info!("{}", log_message),
            ErrorSeverity::Warning => warn!("{}", log_message),
            ErrorSeverity::Error => error!("{}", log_message),
            ErrorSeverity::Critical => error!("🚨 CRITICAL: {}", log_message),
        }
    }
}
