//! LAN 채팅 중계 서버 라이브러리
//!
//! TCP로 접속한 클라이언트에게 고유한 사용자 이름을 부여하고,
//! 전체 채팅과 귓속말을 중계하며, 모든 클라이언트의 접속자 목록을 동기화합니다.
//!
//! # 주요 기능
//!
//! - **사용자 이름 등록**: 원자적 중복 검사 후 레지스트리 등록
//! - **그룹 브로드캐스트**: 모든 접속자에게 전달, 수신자별 실패 격리
//! - **귓속말**: 받는이 전달 + 보낸이 에코, 실패 시 보낸이에게 안내
//! - **접속 알림**: 접속/퇴장 알림과 전체 접속자 목록 동기화
//!
//! # 아키텍처
//!
//! ```text
//! Chat Server
//! ├── Service Layer
//! │   ├── ChatService (연결 수락)
//! │   ├── UserRegistry (접속자 레지스트리)
//! │   ├── MessageDispatcher (메시지 라우팅)
//! │   └── ClientSink (송신 핸들)
//! ├── Handler Layer
//! │   └── ClientSession (연결별 생명주기)
//! ├── Tool Layer
//! │   ├── Error (에러 처리)
//! │   └── NetworkUtils (네트워크 유틸)
//! ├── Protocol (와이어 프로토콜)
//! └── Client (프로토콜 클라이언트)
//! ```
//!
//! # 사용 예시
//!
//! ```no_run
//! use chatserver::{ChatServerConfig, ChatService};
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let service = ChatService::new(ChatServerConfig::default());
//! service.start().await?;
//! # Ok(())
//! # }
//! ```

/// 환경 설정 관리
pub mod config;

/// 와이어 프로토콜 정의
///
/// 한 줄 단위 `|` 구분 메시지 형식과 읽기/쓰기 헬퍼를 정의합니다.
pub mod protocol;

/// 서비스 레이어
///
/// 레지스트리, 디스패처, 송신 핸들, 연결 수락 서비스를 포함합니다.
pub mod service;

/// 핸들러 레이어
///
/// 연결별 세션 생명주기를 포함합니다.
pub mod handler;

/// 공통 유틸리티 도구들
pub mod tool;

/// 프로토콜 클라이언트
pub mod client;

#[cfg(test)]
mod tests;

pub use client::ChatClient;
pub use config::{validate_config, ChatServerConfig};
pub use handler::{ClientSession, SessionContext, SessionEnd, SessionState};
pub use protocol::ChatMessage;
pub use service::{ChatService, ClientSink, MessageDispatcher, UserRegistry};
pub use tool::{ChatError, ChatResult};
