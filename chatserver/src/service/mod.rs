//! 채팅 서버 서비스 레이어
//!
//! 공유 상태와 전송 경로를 담당하는 서비스들을 정의합니다.
//!
//! # 서비스 구조
//!
//! ```text
//! Service Layer
//! ├── ChatService (연결 수락)
//! │   ├── 리스너 바인드
//! │   ├── 연결마다 세션 태스크 생성
//! │   └── 연결 통계
//! ├── UserRegistry (접속자 레지스트리)
//! │   ├── 원자적 이름 등록
//! │   ├── 제거/조회
//! │   └── 이름/송신 핸들 스냅샷
//! ├── MessageDispatcher (메시지 라우팅)
//! │   ├── 그룹 브로드캐스트
//! │   ├── 귓속말 전달
//! │   └── 접속 알림/목록 동기화
//! └── ClientSink (클라이언트 송신 핸들)
//!     ├── 한 줄 전송 + flush
//!     └── 실패 감지
//! ```
//!
//! # 서비스 특징
//!
//! - **공유 상태는 레지스트리 하나**: 라우팅 전체를 감싸는 전역 락이 없음
//! - **수신자별 실패 격리**: 한 명의 전송 실패가 다른 수신자나 보낸이 세션에 영향 없음

/// 클라이언트 송신 핸들
pub mod client_sink;

/// 접속 사용자 레지스트리
///
/// DashMap 기반 사용자 이름 → 송신 핸들 매핑입니다.
pub mod user_registry;

/// 메시지 디스패처
///
/// 그룹/귓속말/접속 알림 전송 규칙을 담당합니다.
pub mod dispatcher;

/// 채팅 서버 메인 서비스
///
/// 연결 수락 루프와 서버 통계를 담당합니다.
pub mod chat_service;

pub use chat_service::{ChatService, ServerStats};
pub use client_sink::ClientSink;
pub use dispatcher::{BroadcastReport, MessageDispatcher, Presence, RouteOutcome};
pub use user_registry::{RegistryStats, UserRegistry};
