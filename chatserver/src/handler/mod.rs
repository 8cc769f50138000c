//! 채팅 서버 핸들러 레이어
//!
//! 연결 하나의 핸드셰이크와 메시지 읽기 루프를 담당합니다.

pub mod session;

pub use session::{ClientSession, SessionContext, SessionEnd, SessionState};
