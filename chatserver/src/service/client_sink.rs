//! 클라이언트 송신 핸들
//!
//! 접속한 클라이언트 한 명에게 한 줄씩 메시지를 보내는 통로입니다.
//! 레지스트리와 브로드캐스트 스냅샷이 복제본을 나눠 갖기 때문에
//! 쓰기는 내부 `Mutex`로 직렬화합니다.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use tokio::sync::{Mutex, Notify};
use tokio::time::{timeout, Duration};
use tracing::debug;

use crate::protocol;
use crate::tool::error::{ChatError, ChatResult};

/// 송신 스트림 (TCP write half, 테스트에서는 `tokio::io::duplex`)
pub type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

static NEXT_SINK_ID: AtomicU64 = AtomicU64::new(1);

/// 클라이언트 송신 핸들
///
/// `Clone`은 같은 연결을 가리키는 핸들을 하나 더 만듭니다.
#[derive(Clone)]
pub struct ClientSink {
    inner: Arc<SinkInner>,
}

struct SinkInner {
    sink_id: u64,
    addr: String,
    writer: Mutex<BufWriter<BoxedWriter>>,
    send_timeout: Duration,
    connected_at: i64,
    failed: AtomicBool,
    closed: AtomicBool,
    failure_notify: Notify,
}

impl ClientSink {
    /// 새로운 송신 핸들 생성
    pub fn new<W>(addr: impl Into<String>, writer: W, send_timeout: Duration) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let writer: BoxedWriter = Box::new(writer);

        Self {
            inner: Arc::new(SinkInner {
                sink_id: NEXT_SINK_ID.fetch_add(1, Ordering::Relaxed),
                addr: addr.into(),
                writer: Mutex::new(BufWriter::new(writer)),
                send_timeout,
                connected_at: chrono::Utc::now().timestamp(),
                failed: AtomicBool::new(false),
                closed: AtomicBool::new(false),
                failure_notify: Notify::new(),
            }),
        }
    }

    pub fn id(&self) -> u64 {
        self.inner.sink_id
    }

    pub fn addr(&self) -> &str {
        &self.inner.addr
    }

    /// 연결 시각 (Unix 초)
    pub fn connected_at(&self) -> i64 {
        self.inner.connected_at
    }

    pub fn is_failed(&self) -> bool {
        self.inner.failed.load(Ordering::Acquire)
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// 한 줄 전송 (자동 flush)
    ///
    /// 쓰기 락 대기와 쓰기를 합쳐 `send_timeout` 안에 끝나야 합니다.
    /// 실패나 시간 초과 시 핸들을 실패 상태로 표시하고 이후 전송은 즉시 실패합니다.
    /// 소유 세션은 [`ClientSink::failed`]로 이를 감지합니다.
    pub async fn send_line(&self, line: &str) -> ChatResult<()> {
        self.ensure_writable()?;

        let send = async {
            let mut writer = self.inner.writer.lock().await;
            // 락을 기다리는 동안 앞선 전송이 실패시켰을 수 있음
            self.ensure_writable()?;
            protocol::write_line(&mut *writer, line)
                .await
                .map_err(|e| ChatError::send_failure(self.addr(), e))
        };

        match timeout(self.inner.send_timeout, send).await {
            Ok(Ok(())) => {
                debug!("{}에게 전송: {}", self.addr(), line);
                Ok(())
            }
            Ok(Err(error)) => {
                self.mark_failed();
                Err(error)
            }
            Err(_) => {
                self.mark_failed();
                Err(ChatError::send_failure(
                    self.addr(),
                    format!("전송 타임아웃 ({}ms)", self.inner.send_timeout.as_millis()),
                ))
            }
        }
    }

    fn ensure_writable(&self) -> ChatResult<()> {
        if self.is_closed() {
            return Err(ChatError::send_failure(self.addr(), "이미 닫힌 연결"));
        }
        if self.is_failed() {
            return Err(ChatError::send_failure(self.addr(), "이전 전송 실패로 비활성화된 연결"));
        }
        Ok(())
    }

    /// 전송 실패가 발생할 때까지 대기
    pub async fn failed(&self) {
        if self.is_failed() {
            return;
        }
        self.inner.failure_notify.notified().await;
    }

    /// 송신 스트림 종료 (멱등)
    pub async fn close(&self) {
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            return;
        }

        let mut writer = self.inner.writer.lock().await;
        match timeout(self.inner.send_timeout, writer.shutdown()).await {
            Ok(Ok(())) => debug!("{} 송신 스트림 종료", self.addr()),
            Ok(Err(e)) => debug!("{} 송신 스트림 종료 중 에러 (무시): {}", self.addr(), e),
            Err(_) => debug!("{} 송신 스트림 종료 타임아웃 (무시)", self.addr()),
        }
    }

    fn mark_failed(&self) {
        if !self.inner.failed.swap(true, Ordering::AcqRel) {
            // 소유 세션이 아직 대기 전이어도 permit이 남도록 notify_one 사용
            self.inner.failure_notify.notify_one();
        }
    }
}

impl fmt::Debug for ClientSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSink")
            .field("sink_id", &self.inner.sink_id)
            .field("addr", &self.inner.addr)
            .field("failed", &self.is_failed())
            .field("closed", &self.is_closed())
            .finish()
    }
}
