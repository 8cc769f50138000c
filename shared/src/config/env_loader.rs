//! `.env` 파일 로더
//!
//! 로드 순서:
//! 1. 상위 디렉토리의 .env 파일
//! 2. 현재 디렉토리의 .env 파일
//! 3. 상위의 상위 디렉토리 (프로젝트 루트)
//!
//! 어느 파일도 없으면 시스템 환경변수와 기본값만 사용합니다.

use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info, warn};

/// .env 파일 탐색 경로
const ENV_PATHS: [&str; 3] = ["../.env", ".env", "../../.env"];

/// 첫 번째로 발견된 .env 파일을 로드합니다.
///
/// 로드한 파일 경로를 반환하며, 파일이 없으면 `None`을 반환합니다.
/// 이미 설정된 시스템 환경변수는 덮어쓰지 않습니다.
pub fn load_env_file() -> Option<&'static str> {
    for path in ENV_PATHS {
        if Path::new(path).exists() && dotenv::from_filename(path).is_ok() {
            info!(".env 파일 로드 성공: {}", path);
            return Some(path);
        }
    }

    warn!(".env 파일을 찾을 수 없습니다. 기본값과 시스템 환경변수를 사용합니다.");
    None
}

/// 문자열 환경변수 (없거나 비어있으면 기본값)
pub fn env_string(key: &str, default: &str) -> String {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => value.trim().to_string(),
        _ => default.to_string(),
    }
}

/// 파싱 가능한 환경변수
///
/// 값이 없으면 기본값을, 파싱에 실패하면 경고를 남기고 기본값을 사용합니다.
pub fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Debug,
{
    match std::env::var(key) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                warn!("환경변수 {} 파싱 실패 ({:?}), 기본값 사용: {:?}", key, raw, default);
                default
            }
        },
        Err(_) => {
            debug!("환경변수 {} 없음, 기본값 사용: {:?}", key, default);
            default
        }
    }
}

/// 불리언 환경변수 ("true"/"1"/"yes" 를 참으로 취급)
pub fn env_flag(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(raw) => matches!(raw.trim().to_lowercase().as_str(), "true" | "1" | "yes"),
        Err(_) => default,
    }
}
