//! 채팅 서버 테스트 모듈
//!
//! 각 기능별로 분리된 테스트 파일들을 관리합니다.

pub mod test_protocol;

// 테스트 유틸리티
use std::sync::Arc;
use tokio::io::{duplex, BufReader, DuplexStream};
use tokio::time::{timeout, Duration};

use crate::handler::session::SessionContext;
use crate::protocol;
use crate::service::client_sink::ClientSink;
use crate::service::user_registry::UserRegistry;

/// 테스트용 송신 타임아웃
pub const TEST_SEND_TIMEOUT: Duration = Duration::from_secs(1);

/// 테스트용 최대 줄 길이
pub const TEST_MAX_LINE_BYTES: usize = 1024;

/// 수신 대기 타임아웃
const READ_TIMEOUT: Duration = Duration::from_secs(2);

/// 아무것도 오지 않음을 확인할 때의 대기 시간
const QUIET_PERIOD: Duration = Duration::from_millis(100);

/// 인메모리 송신 핸들과 그 반대편 수신 스트림 생성
pub fn create_test_sink(addr: &str) -> (ClientSink, BufReader<DuplexStream>) {
    let (server_side, client_side) = duplex(64 * 1024);
    let sink = ClientSink::new(addr, server_side, TEST_SEND_TIMEOUT);
    (sink, BufReader::new(client_side))
}

/// 테스트용 세션 컨텍스트 생성
pub fn create_test_context(registry: Arc<UserRegistry>) -> SessionContext {
    SessionContext::new(registry, TEST_SEND_TIMEOUT, TEST_MAX_LINE_BYTES)
}

/// 다음 한 줄 수신 (타임아웃 시 테스트 실패)
pub async fn expect_line(reader: &mut BufReader<DuplexStream>) -> String {
    timeout(READ_TIMEOUT, protocol::read_line(reader, 64 * 1024))
        .await
        .expect("Test assertion failed")
        .expect("Test assertion failed")
        .expect("Test assertion failed")
}

/// 스트림이 닫혔는지 확인
pub async fn expect_eof(reader: &mut BufReader<DuplexStream>) {
    let next = timeout(READ_TIMEOUT, protocol::read_line(reader, 64 * 1024))
        .await
        .expect("Test assertion failed")
        .expect("Test assertion failed");
    assert_eq!(next, None);
}

/// 잠시 기다려도 아무 줄도 오지 않는지 확인
pub async fn expect_silence(reader: &mut BufReader<DuplexStream>) {
    let next = timeout(QUIET_PERIOD, protocol::read_line(reader, 64 * 1024)).await;
    assert!(next.is_err(), "예상하지 못한 수신: {:?}", next);
}
