//! 채팅 와이어 프로토콜 정의
//!
//! 클라이언트와 서버가 주고받는 한 줄 단위 텍스트 프로토콜입니다.
//!
//! # 프로토콜 구조
//!
//! ```text
//! [GROUP]|보낸이|내용
//! [PRIVATE]|보낸이|받는이|내용
//! [USER_ONLINE]|사용자
//! [USER_OFFLINE]|사용자
//! [USER_LIST]|사용자1,사용자2,사용자3
//! ```
//!
//! - 메시지 하나 = UTF-8 한 줄 (`\n` 종료, `\r\n`도 허용). 잘못된 바이트는 `U+FFFD`로 대체
//! - 필드 구분자는 `|` 이며 이스케이프가 없습니다. 필드 값에 `|`가 들어가면
//!   필드 수가 달라져 형식 오류가 됩니다. (알려진 제약)
//! - 알려진 태그로 시작하는 줄은 그 태그의 메시지로 분류합니다. (`[GROUP]x|a|b`도 그룹)
//! - 알려진 태그로 시작하지 않는 줄은 `PlainText`로 취급합니다.
//!
//! # 사용 예시
//!
//! ```rust
//! use chatserver::protocol::ChatMessage;
//!
//! let message = ChatMessage::parse("[GROUP]|alice|hello").unwrap();
//! assert_eq!(message.to_line(), "[GROUP]|alice|hello");
//! ```

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::tool::error::{ChatError, ChatResult};

/// 그룹 메시지 태그
pub const GROUP_TAG: &str = "[GROUP]";
/// 귓속말 태그
pub const PRIVATE_TAG: &str = "[PRIVATE]";
/// 접속 알림 태그
pub const USER_ONLINE_TAG: &str = "[USER_ONLINE]";
/// 퇴장 알림 태그
pub const USER_OFFLINE_TAG: &str = "[USER_OFFLINE]";
/// 접속자 목록 태그
pub const USER_LIST_TAG: &str = "[USER_LIST]";

/// 필드 구분자
pub const FIELD_SEPARATOR: char = '|';
/// 접속자 목록 내부 구분자
pub const ROSTER_SEPARATOR: char = ',';

/// 채팅 메시지 타입 정의
///
/// 파싱 시점에 만들어지고 디스패처가 한 번 소비하는 불변 값입니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatMessage {
    /// 전체 채팅 (클라이언트 → 서버 → 모든 접속자)
    Group { sender: String, content: String },

    /// 귓속말 (클라이언트 → 서버 → 받는이 + 보낸이 에코)
    Private {
        sender: String,
        receiver: String,
        content: String,
    },

    /// 접속 알림 (서버 → 모든 접속자)
    UserOnline { username: String },

    /// 퇴장 알림 (서버 → 모든 접속자)
    UserOffline { username: String },

    /// 접속자 목록 동기화 (서버 → 모든 접속자)
    UserList { usernames: Vec<String> },

    /// 태그 없는 안내/에러 문구
    PlainText { content: String },
}

impl ChatMessage {
    /// 한 줄을 메시지로 파싱
    ///
    /// 알려진 태그로 시작하는데 필드 수가 다르면 `MalformedMessage`를 반환합니다.
    pub fn parse(line: &str) -> ChatResult<Self> {
        let Some(tag) = Self::known_tag(line) else {
            return Ok(ChatMessage::PlainText {
                content: line.to_string(),
            });
        };

        let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
        let expected = Self::field_count(tag);
        if fields.len() != expected {
            return Err(ChatError::MalformedMessage {
                tag,
                expected,
                actual: fields.len(),
            });
        }

        let message = match tag {
            GROUP_TAG => ChatMessage::Group {
                sender: fields[1].to_string(),
                content: fields[2].to_string(),
            },
            PRIVATE_TAG => ChatMessage::Private {
                sender: fields[1].to_string(),
                receiver: fields[2].to_string(),
                content: fields[3].to_string(),
            },
            USER_ONLINE_TAG => ChatMessage::UserOnline {
                username: fields[1].to_string(),
            },
            USER_OFFLINE_TAG => ChatMessage::UserOffline {
                username: fields[1].to_string(),
            },
            _ => ChatMessage::UserList {
                usernames: fields[1]
                    .split(ROSTER_SEPARATOR)
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect(),
            },
        };

        Ok(message)
    }

    /// 와이어 형식 한 줄로 변환 (개행 제외)
    pub fn to_line(&self) -> String {
        match self {
            ChatMessage::Group { sender, content } => {
                format!("{GROUP_TAG}|{sender}|{content}")
            }
            ChatMessage::Private {
                sender,
                receiver,
                content,
            } => format!("{PRIVATE_TAG}|{sender}|{receiver}|{content}"),
            ChatMessage::UserOnline { username } => format!("{USER_ONLINE_TAG}|{username}"),
            ChatMessage::UserOffline { username } => format!("{USER_OFFLINE_TAG}|{username}"),
            ChatMessage::UserList { usernames } => {
                let roster = usernames.join(&ROSTER_SEPARATOR.to_string());
                format!("{USER_LIST_TAG}|{roster}")
            }
            ChatMessage::PlainText { content } => content.clone(),
        }
    }

    /// 로그용 메시지 종류 이름
    pub fn kind(&self) -> &'static str {
        match self {
            ChatMessage::Group { .. } => "group",
            ChatMessage::Private { .. } => "private",
            ChatMessage::UserOnline { .. } => "user_online",
            ChatMessage::UserOffline { .. } => "user_offline",
            ChatMessage::UserList { .. } => "user_list",
            ChatMessage::PlainText { .. } => "plain_text",
        }
    }

    /// 태그별 필수 필드 수 (태그 포함)
    pub fn field_count(tag: &str) -> usize {
        match tag {
            GROUP_TAG => 3,
            PRIVATE_TAG => 4,
            _ => 2,
        }
    }

    /// 줄이 시작하는 태그
    fn known_tag(line: &str) -> Option<&'static str> {
        [GROUP_TAG, PRIVATE_TAG, USER_ONLINE_TAG, USER_OFFLINE_TAG, USER_LIST_TAG]
            .into_iter()
            .find(|tag| line.starts_with(tag))
    }
}

/// 스트림에서 한 줄 읽기
///
/// - `Ok(None)`: 정상 EOF
/// - 개행 없이 끝난 마지막 줄도 한 줄로 돌려줍니다.
/// - `max_bytes`를 넘는 줄은 `StreamTerminated`로 처리합니다.
/// - UTF-8이 아닌 바이트는 대체 문자로 바꾸고 연결은 유지합니다.
pub async fn read_line<R>(reader: &mut R, max_bytes: usize) -> ChatResult<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    let mut buffer = Vec::new();
    let read = (&mut *reader)
        .take(max_bytes as u64 + 1)
        .read_until(b'\n', &mut buffer)
        .await
        .map_err(|e| ChatError::terminated(format!("읽기 실패: {}", e)))?;

    if read == 0 {
        return Ok(None);
    }

    if buffer.last() == Some(&b'\n') {
        buffer.pop();
        if buffer.last() == Some(&b'\r') {
            buffer.pop();
        }
    } else if buffer.len() > max_bytes {
        return Err(ChatError::terminated(format!(
            "최대 줄 길이 초과 ({}바이트)",
            max_bytes
        )));
    }

    Ok(Some(String::from_utf8_lossy(&buffer).into_owned()))
}

/// 스트림에 한 줄 쓰기 (개행 추가 후 즉시 flush)
pub async fn write_line<W>(writer: &mut W, line: &str) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await
}
