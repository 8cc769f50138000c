//! 클라이언트 세션 핸들러
//!
//! 연결 하나의 전체 생명주기를 담당합니다.
//!
//! ```text
//! Connected → Registering → Registered → Relaying → Closing → Closed
//!                  │                                            ▲
//!                  └──────────── 빈 이름 / 중복 이름 ────────────┘
//! ```
//!
//! `Relaying`은 EOF, 읽기 에러, 송신 핸들 실패 중 무엇으로 끝나든
//! 항상 `Closing` 정리 단계를 정확히 한 번 거칩니다.

use std::sync::Arc;
use tokio::io::{AsyncRead, BufReader};
use tokio::net::TcpStream;
use tokio::time::Duration;
use tracing::{debug, info, warn};

use crate::protocol::{self, ChatMessage};
use crate::service::client_sink::ClientSink;
use crate::service::dispatcher::{MessageDispatcher, Presence};
use crate::service::user_registry::UserRegistry;
use crate::tool::error::{ChatError, ChatResult, ErrorHandler};

/// 수신 스트림 (TCP read half, 테스트에서는 `tokio::io::duplex`)
pub type BoxedReader = Box<dyn AsyncRead + Send + Unpin>;

/// 세션 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connected,
    Registering,
    Registered,
    Relaying,
    Closing,
    Closed,
}

/// 세션 종료 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    /// 이름을 보내기 전에 연결이 끊김
    HandshakeAborted,
    /// 빈 이름 또는 중복 이름으로 거부
    Rejected,
    /// 등록 후 정상/비정상 종료
    Disconnected { username: String },
}

/// 모든 세션이 공유하는 핸들 묶음
#[derive(Clone)]
pub struct SessionContext {
    pub registry: Arc<UserRegistry>,
    pub dispatcher: Arc<MessageDispatcher>,
    pub send_timeout: Duration,
    pub max_line_bytes: usize,
}

impl SessionContext {
    pub fn new(registry: Arc<UserRegistry>, send_timeout: Duration, max_line_bytes: usize) -> Self {
        let dispatcher = Arc::new(MessageDispatcher::new(registry.clone()));
        Self {
            registry,
            dispatcher,
            send_timeout,
            max_line_bytes,
        }
    }
}

/// 클라이언트 세션
pub struct ClientSession {
    addr: String,
    reader: BufReader<BoxedReader>,
    sink: ClientSink,
    username: Option<String>,
    state: SessionState,
    last_error: Option<ChatError>,
    context: SessionContext,
}

impl ClientSession {
    /// 임의의 읽기/쓰기 스트림으로 세션 생성
    pub fn new<R, W>(addr: impl Into<String>, reader: R, writer: W, context: SessionContext) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: tokio::io::AsyncWrite + Send + Unpin + 'static,
    {
        let addr = addr.into();
        let reader: BoxedReader = Box::new(reader);
        let sink = ClientSink::new(addr.clone(), writer, context.send_timeout);

        Self {
            addr,
            reader: BufReader::new(reader),
            sink,
            username: None,
            state: SessionState::Connected,
            last_error: None,
            context,
        }
    }

    /// TCP 연결로 세션 생성
    pub fn from_tcp(stream: TcpStream, addr: impl Into<String>, context: SessionContext) -> Self {
        let (reader, writer) = stream.into_split();
        Self::new(addr, reader, writer, context)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn last_error(&self) -> Option<&ChatError> {
        self.last_error.as_ref()
    }

    pub fn sink(&self) -> &ClientSink {
        &self.sink
    }

    /// 세션 전체 생명주기 실행
    ///
    /// 수락 루프가 연결마다 독립 태스크로 실행합니다.
    pub async fn run(mut self) -> SessionEnd {
        let first_line = match self.read_next().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                debug!("{} 이름 전송 전 연결 종료", self.addr);
                self.close().await;
                return SessionEnd::HandshakeAborted;
            }
            Err(error) => {
                ErrorHandler::handle_error(&error, "ClientSession", "handshake");
                self.last_error = Some(error);
                self.close().await;
                return SessionEnd::HandshakeAborted;
            }
        };

        let username = match self.register(&first_line).await {
            Ok(username) => username,
            Err(_) => {
                self.close().await;
                return SessionEnd::Rejected;
            }
        };

        self.join().await;

        if let Err(error) = self.relay().await {
            ErrorHandler::handle_error(&error, "ClientSession", "relay");
            self.last_error = Some(error);
        }

        self.finish().await;
        SessionEnd::Disconnected { username }
    }

    /// 사용자 이름 등록
    ///
    /// 공백 제거 후 비어있거나 이미 사용 중이면 거부 안내를 보내고 에러를 반환합니다.
    /// 중복 검사와 삽입은 레지스트리의 원자적 연산 하나로 처리됩니다.
    pub async fn register(&mut self, raw_line: &str) -> ChatResult<String> {
        self.state = SessionState::Registering;

        let candidate = raw_line.trim();
        let outcome = if candidate.is_empty() {
            Err(ChatError::empty_username(raw_line))
        } else if !self.context.registry.try_insert(candidate, self.sink.clone()) {
            Err(ChatError::username_taken(candidate))
        } else {
            Ok(candidate.to_string())
        };

        match outcome {
            Ok(username) => {
                self.username = Some(username.clone());
                self.state = SessionState::Registered;
                info!(
                    "사용자 접속: {} ({}) - 현재 접속자 {}명",
                    username,
                    self.addr,
                    self.context.registry.len()
                );
                Ok(username)
            }
            Err(error) => {
                ErrorHandler::handle_error(&error, "ClientSession", "register");
                if let Some(notice) = error.user_notice() {
                    let line = ChatMessage::PlainText { content: notice }.to_line();
                    // `&self`를 await 너머로 잡지 않도록 핸들 복제본으로 전송
                    let sink = self.sink.clone();
                    if let Err(e) = sink.send_line(&line).await {
                        warn!("{}에게 거부 안내 전송 실패: {}", self.addr, e);
                    }
                }
                Err(error)
            }
        }
    }

    /// 다음 한 줄 읽기
    ///
    /// 세션의 유일한 대기 지점입니다. 자기 송신 핸들이 실패하면
    /// 읽기를 중단하고 `StreamTerminated`를 반환합니다.
    pub async fn read_next(&mut self) -> ChatResult<Option<String>> {
        let sink = self.sink.clone();
        let max_line_bytes = self.context.max_line_bytes;

        tokio::select! {
            line = protocol::read_line(&mut self.reader, max_line_bytes) => line,
            _ = sink.failed() => Err(ChatError::terminated("송신 핸들 실패")),
        }
    }

    /// 자기 클라이언트에게 한 줄 전송
    ///
    /// 반환되는 future는 세션이 아니라 송신 핸들 복제본만 붙잡습니다.
    pub fn send(&self, line: &str) -> impl std::future::Future<Output = ChatResult<()>> + Send {
        let sink = self.sink.clone();
        let line = line.to_string();
        async move { sink.send_line(&line).await }
    }

    /// 스트림 해제 (멱등)
    pub async fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        self.sink.close().await;
        self.state = SessionState::Closed;
        debug!("{} 세션 종료", self.addr);
    }

    /// 등록 직후 접속 알림과 목록 동기화
    async fn join(&mut self) {
        if let Some(username) = self.username.clone() {
            let dispatcher = &self.context.dispatcher;
            dispatcher.broadcast_presence(Presence::Online, &username).await;
            dispatcher.sync_roster().await;
        }
        self.state = SessionState::Relaying;
    }

    /// 스트림이 끝날 때까지 읽은 줄을 디스패처에 전달
    async fn relay(&mut self) -> ChatResult<()> {
        loop {
            match self.read_next().await? {
                Some(line) => {
                    debug!("메시지 수신 ({}): {}", self.addr, line);
                    let outcome = self.context.dispatcher.route_line(&line, &self.sink).await;
                    debug!("라우팅 결과 ({}): {:?}", self.addr, outcome);
                }
                None => return Ok(()),
            }
        }
    }

    /// 정리 단계: 레지스트리 제거, 퇴장 알림, 목록 동기화, 스트림 해제
    async fn finish(&mut self) {
        self.state = SessionState::Closing;

        if let Some(username) = self.username.clone() {
            // 실제로 제거한 경우에만 알림 (퇴장 알림은 정확히 한 번)
            if self.context.registry.remove(&username) {
                info!(
                    "사용자 퇴장: {} ({}) - 현재 접속자 {}명",
                    username,
                    self.addr,
                    self.context.registry.len()
                );
                let dispatcher = &self.context.dispatcher;
                dispatcher.broadcast_presence(Presence::Offline, &username).await;
                dispatcher.sync_roster().await;
            }
        }

        self.close().await;
    }
}
