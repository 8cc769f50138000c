//! 환경 설정 공용 도구
//!
//! 각 서비스의 설정 구조체가 `.env` 파일과 환경변수를 같은 방식으로
//! 읽을 수 있도록 헬퍼 함수를 제공합니다.

pub mod env_loader;

pub use env_loader::{env_flag, env_or, env_string, load_env_file};
