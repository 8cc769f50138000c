//! 채팅 서버 공통 유틸리티 모듈
//!
//! 에러 처리와 네트워크 유틸 등 공통 기능을 제공합니다.

pub mod error;
pub mod network_utils;

pub use error::{ChatError, ChatResult, ErrorHandler, ErrorSeverity, UsernameRejection};
pub use network_utils::{IpInfo, NetworkUtils};
