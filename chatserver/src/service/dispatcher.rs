//! 메시지 디스패처
//!
//! 세션이 읽은 한 줄을 해석해서 그룹 브로드캐스트, 귓속말 전달,
//! 접속 알림, 접속자 목록 동기화 중 무엇을 할지 결정하고 전송합니다.
//!
//! 디스패처 자체는 상태가 없습니다. 전송 대상은 매번 레지스트리 스냅샷에서 구합니다.
//!
//! # 실패 처리
//!
//! - 브로드캐스트(그룹/접속 알림/목록): 수신자마다 별도 태스크로 동시에 전송하고,
//!   수신자별 실패는 로그만 남김 (멈춘 수신자가 다른 수신자를 기다리게 하지 않음)
//! - 귓속말: 받는이에게 전송 실패 시 보낸이에게 `PlainText`로 알림

use std::sync::Arc;
use tokio::task;
use tracing::{debug, warn};

use crate::protocol::ChatMessage;
use crate::service::client_sink::ClientSink;
use crate::service::user_registry::UserRegistry;
use crate::tool::error::{ChatError, ErrorHandler};

/// 접속 상태 알림 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Online,
    Offline,
}

impl Presence {
    /// 알림 메시지 생성
    pub fn message(self, username: &str) -> ChatMessage {
        let username = username.to_string();
        match self {
            Presence::Online => ChatMessage::UserOnline { username },
            Presence::Offline => ChatMessage::UserOffline { username },
        }
    }
}

/// 브로드캐스트 결과
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub failed: usize,
}

/// 한 메시지의 라우팅 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// 그룹 메시지를 스냅샷 전체에 전송
    Broadcast(BroadcastReport),
    /// 귓속말을 받는이에게 전달하고 보낸이에게 에코
    PrivateDelivered { receiver: String },
    /// 받는이가 접속 중이 아님
    RecipientOffline { receiver: String },
    /// 받는이에게 쓰기 실패
    PrivateFailed { receiver: String },
    /// 필드 수 오류로 보낸이에게만 안내
    Rejected,
    /// 클라이언트가 보낼 수 없는 종류라 무시
    Ignored,
}

/// 메시지 디스패처
pub struct MessageDispatcher {
    registry: Arc<UserRegistry>,
}

impl MessageDispatcher {
    /// 새로운 디스패처 생성
    pub fn new(registry: Arc<UserRegistry>) -> Self {
        Self { registry }
    }

    /// 클라이언트가 보낸 한 줄을 파싱해서 라우팅
    ///
    /// 그룹/귓속말은 받은 줄을 그대로 전달합니다.
    pub async fn route_line(&self, line: &str, from: &ClientSink) -> RouteOutcome {
        match ChatMessage::parse(line) {
            Ok(message) => self.dispatch(&message, line, from).await,
            Err(error) => {
                self.reply_error(from, &error).await;
                RouteOutcome::Rejected
            }
        }
    }

    /// 파싱된 메시지 라우팅
    ///
    /// `from`은 메시지를 보낸 세션의 송신 핸들입니다.
    pub async fn route(&self, message: &ChatMessage, from: &ClientSink) -> RouteOutcome {
        self.dispatch(message, &message.to_line(), from).await
    }

    async fn dispatch(&self, message: &ChatMessage, line: &str, from: &ClientSink) -> RouteOutcome {
        match message {
            ChatMessage::Group { sender, .. } => {
                debug!("그룹 메시지 ({} from {})", sender, from.addr());
                RouteOutcome::Broadcast(self.broadcast(line).await)
            }
            ChatMessage::Private { receiver, .. } => {
                self.deliver_private(line, receiver, from).await
            }
            other => {
                debug!("클라이언트가 보낸 {} 메시지 무시 ({})", other.kind(), from.addr());
                RouteOutcome::Ignored
            }
        }
    }

    /// 접속/퇴장 알림 브로드캐스트
    pub async fn broadcast_presence(&self, presence: Presence, username: &str) -> BroadcastReport {
        self.broadcast(&presence.message(username).to_line()).await
    }

    /// 현재 접속자 목록을 모두에게 전송
    pub async fn sync_roster(&self) -> BroadcastReport {
        let roster = ChatMessage::UserList {
            usernames: self.registry.snapshot_names(),
        };
        self.broadcast(&roster.to_line()).await
    }

    /// 스냅샷의 모든 송신 핸들에 한 줄 전송
    ///
    /// 수신자마다 태스크를 띄워 동시에 보내고 모두 끝날 때까지 기다립니다.
    /// 수신자 한 명의 실패나 지연이 나머지 전송을 막지 않습니다.
    pub async fn broadcast(&self, line: &str) -> BroadcastReport {
        let line: Arc<str> = Arc::from(line);
        let sends: Vec<_> = self
            .registry
            .snapshot_sinks()
            .into_iter()
            .map(|sink| {
                let line = line.clone();
                task::spawn(async move { sink.send_line(&line).await })
            })
            .collect();

        let mut report = BroadcastReport::default();
        for send in sends {
            match send.await {
                Ok(Ok(())) => report.delivered += 1,
                Ok(Err(error)) => {
                    report.failed += 1;
                    ErrorHandler::handle_error(&error, "MessageDispatcher", "broadcast");
                }
                Err(e) => {
                    report.failed += 1;
                    warn!("브로드캐스트 전송 태스크 실행 실패: {}", e);
                }
            }
        }

        debug!(
            "브로드캐스트 완료: {}/{} 성공",
            report.delivered,
            report.delivered + report.failed
        );
        report
    }

    async fn deliver_private(&self, line: &str, receiver: &str, from: &ClientSink) -> RouteOutcome {
        let Some(receiver_sink) = self.registry.lookup(receiver) else {
            let error = ChatError::RecipientOffline {
                receiver: receiver.to_string(),
            };
            self.reply_error(from, &error).await;
            return RouteOutcome::RecipientOffline {
                receiver: receiver.to_string(),
            };
        };

        if let Err(error) = receiver_sink.send_line(line).await {
            ErrorHandler::handle_error(&error, "MessageDispatcher", "deliver_private");
            let notice = ChatError::send_failure(receiver, error);
            self.reply_error(from, &notice).await;
            return RouteOutcome::PrivateFailed {
                receiver: receiver.to_string(),
            };
        }

        // 보낸이 화면에도 보낸 메시지가 보이도록 에코
        if let Err(error) = from.send_line(line).await {
            ErrorHandler::handle_error(&error, "MessageDispatcher", "echo_private");
        }

        RouteOutcome::PrivateDelivered {
            receiver: receiver.to_string(),
        }
    }

    /// 보낸이에게만 에러 안내 전송
    async fn reply_error(&self, to: &ClientSink, error: &ChatError) {
        ErrorHandler::handle_error(error, "MessageDispatcher", "route");

        let Some(notice) = error.user_notice() else {
            return;
        };
        let line = ChatMessage::PlainText { content: notice }.to_line();
        if let Err(e) = to.send_line(&line).await {
            warn!("{}에게 에러 안내 전송 실패: {}", to.addr(), e);
        }
    }
}
