//! 채팅 클라이언트
//!
//! 와이어 프로토콜로 서버와 통신하는 클라이언트입니다.
//! 터미널 클라이언트 바이너리와 통합 테스트가 함께 사용합니다.
//!
//! # 사용 예시
//!
//! ```no_run
//! use chatserver::client::ChatClient;
//!
//! # async fn demo() -> chatserver::tool::ChatResult<()> {
//! let mut client = ChatClient::connect("127.0.0.1:8888", "alice").await?;
//! client.send_group("hello").await?;
//! while let Some(message) = client.next_message().await? {
//!     println!("{}", chatserver::client::render(&message));
//! }
//! # Ok(())
//! # }
//! ```

use tokio::io::{AsyncWriteExt, BufReader, BufWriter};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tracing::debug;

use crate::protocol::{self, ChatMessage, FIELD_SEPARATOR};
use crate::tool::error::{ChatError, ChatResult};

/// 서버가 보내는 한 줄 최대 길이
///
/// 접속자 목록은 접속자 수에 비례해 길어지므로 서버 수신 한도보다 넉넉하게 둡니다.
const MAX_SERVER_LINE_BYTES: usize = 1024 * 1024;

/// 수신 전용 반쪽
pub struct ChatReceiver {
    reader: BufReader<OwnedReadHalf>,
}

impl ChatReceiver {
    /// 다음 서버 메시지 (연결 종료 시 `None`)
    ///
    /// 형식이 맞지 않는 줄은 그대로 `PlainText`로 돌려줍니다.
    pub async fn next_message(&mut self) -> ChatResult<Option<ChatMessage>> {
        let Some(line) = protocol::read_line(&mut self.reader, MAX_SERVER_LINE_BYTES).await? else {
            return Ok(None);
        };

        let message = ChatMessage::parse(&line).unwrap_or_else(|e| {
            debug!("서버 메시지 파싱 실패, 원문 사용: {}", e);
            ChatMessage::PlainText { content: line }
        });
        Ok(Some(message))
    }
}

/// 송신 전용 반쪽
pub struct ChatSender {
    username: String,
    writer: BufWriter<OwnedWriteHalf>,
}

impl ChatSender {
    pub fn username(&self) -> &str {
        &self.username
    }

    /// 전체 채팅 전송
    pub async fn send_group(&mut self, content: &str) -> ChatResult<()> {
        let message = ChatMessage::Group {
            sender: self.username.clone(),
            content: content.to_string(),
        };
        self.send_message(&message).await
    }

    /// 귓속말 전송
    pub async fn send_private(&mut self, receiver: &str, content: &str) -> ChatResult<()> {
        let message = ChatMessage::Private {
            sender: self.username.clone(),
            receiver: receiver.to_string(),
            content: content.to_string(),
        };
        self.send_message(&message).await
    }

    /// 검증 없이 원문 한 줄 전송
    ///
    /// 내용에 개행이 있으면 서버는 여러 줄로 받습니다.
    pub async fn send_raw(&mut self, line: &str) -> ChatResult<()> {
        protocol::write_line(&mut self.writer, line).await?;
        Ok(())
    }

    /// 송신 스트림 종료 (서버는 EOF로 퇴장 처리)
    pub async fn shutdown(&mut self) -> ChatResult<()> {
        self.writer.shutdown().await?;
        Ok(())
    }

    /// 구분자나 개행이 섞여 서버가 다르게 해석할 메시지는 보내지 않음
    async fn send_message(&mut self, message: &ChatMessage) -> ChatResult<()> {
        let line = message.to_line();
        let tag = match message {
            ChatMessage::Group { .. } => protocol::GROUP_TAG,
            _ => protocol::PRIVATE_TAG,
        };
        if line.contains(['\n', '\r']) {
            return Err(ChatError::InvalidContent {
                tag,
                reason: "줄바꿈 문자는 보낼 수 없습니다".to_string(),
            });
        }
        let expected = ChatMessage::field_count(tag);
        let actual = line.split(FIELD_SEPARATOR).count();
        if actual != expected {
            return Err(ChatError::MalformedMessage {
                tag,
                expected,
                actual,
            });
        }

        self.send_raw(&line).await
    }
}

/// 채팅 클라이언트
pub struct ChatClient {
    receiver: ChatReceiver,
    sender: ChatSender,
}

impl ChatClient {
    /// 서버에 접속하고 사용자 이름을 전송
    ///
    /// 서버의 수락/거부 응답은 이후 `next_message`로 확인합니다.
    pub async fn connect(addr: &str, username: &str) -> ChatResult<Self> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        let (reader, writer) = stream.into_split();

        let mut client = Self {
            receiver: ChatReceiver {
                reader: BufReader::new(reader),
            },
            sender: ChatSender {
                username: username.trim().to_string(),
                writer: BufWriter::new(writer),
            },
        };

        client.sender.send_raw(username).await?;
        debug!("서버 {}에 사용자 이름 전송: {}", addr, username);
        Ok(client)
    }

    pub fn username(&self) -> &str {
        self.sender.username()
    }

    pub async fn send_group(&mut self, content: &str) -> ChatResult<()> {
        self.sender.send_group(content).await
    }

    pub async fn send_private(&mut self, receiver: &str, content: &str) -> ChatResult<()> {
        self.sender.send_private(receiver, content).await
    }

    pub async fn send_raw(&mut self, line: &str) -> ChatResult<()> {
        self.sender.send_raw(line).await
    }

    pub async fn next_message(&mut self) -> ChatResult<Option<ChatMessage>> {
        self.receiver.next_message().await
    }

    pub async fn shutdown(&mut self) -> ChatResult<()> {
        self.sender.shutdown().await
    }

    /// 수신/송신을 별도 태스크에서 쓰기 위해 분리
    pub fn split(self) -> (ChatReceiver, ChatSender) {
        (self.receiver, self.sender)
    }
}

/// 터미널 출력용 문자열
pub fn render(message: &ChatMessage) -> String {
    match message {
        ChatMessage::Group { sender, content } => format!("[전체] {}: {}", sender, content),
        ChatMessage::Private {
            sender,
            receiver,
            content,
        } => format!("[귓속말] {} → {}: {}", sender, receiver, content),
        ChatMessage::UserOnline { username } => format!("* {} 님이 접속했습니다", username),
        ChatMessage::UserOffline { username } => format!("* {} 님이 나갔습니다", username),
        ChatMessage::UserList { usernames } => {
            format!("* 접속자 ({}명): {}", usernames.len(), usernames.join(", "))
        }
        ChatMessage::PlainText { content } => format!("! {}", content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render() {
        let group = ChatMessage::Group {
            sender: "alice".to_string(),
            content: "hi".to_string(),
        };
        assert_eq!(render(&group), "[전체] alice: hi");

        let roster = ChatMessage::UserList {
            usernames: vec!["alice".to_string(), "bob".to_string()],
        };
        assert_eq!(render(&roster), "* 접속자 (2명): alice, bob");

        let notice = ChatMessage::PlainText {
            content: "Username cannot be empty!".to_string(),
        };
        assert_eq!(render(&notice), "! Username cannot be empty!");
    }
}
