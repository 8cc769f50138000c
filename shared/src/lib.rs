//! 채팅 서버/클라이언트 공용 라이브러리
//!
//! 여러 바이너리에서 함께 쓰는 부가 기능을 모아둡니다.
//! - **logging**: tracing 구독자 초기화
//! - **config**: `.env` 파일 탐색과 환경변수 읽기

pub mod config;
pub mod logging;
