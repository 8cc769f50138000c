//! 와이어 프로토콜 테스트

use tokio::io::BufReader;

use crate::protocol::{self, ChatMessage};
use crate::tool::error::ChatError;

#[test]
fn test_parse_group_message() {
    let message = ChatMessage::parse("[GROUP]|alice|hello everyone").expect("Test assertion failed");
    assert_eq!(
        message,
        ChatMessage::Group {
            sender: "alice".to_string(),
            content: "hello everyone".to_string(),
        }
    );
    assert_eq!(message.to_line(), "[GROUP]|alice|hello everyone");
}

#[test]
fn test_parse_private_message() {
    let message = ChatMessage::parse("[PRIVATE]|alice|bob|psst").expect("Test assertion failed");
    assert_eq!(
        message,
        ChatMessage::Private {
            sender: "alice".to_string(),
            receiver: "bob".to_string(),
            content: "psst".to_string(),
        }
    );
    assert_eq!(message.kind(), "private");
}

#[test]
fn test_parse_keeps_empty_content() {
    let message = ChatMessage::parse("[GROUP]|alice|").expect("Test assertion failed");
    assert_eq!(
        message,
        ChatMessage::Group {
            sender: "alice".to_string(),
            content: String::new(),
        }
    );
}

#[test]
fn test_parse_presence_messages() {
    assert_eq!(
        ChatMessage::parse("[USER_ONLINE]|carol").expect("Test assertion failed"),
        ChatMessage::UserOnline {
            username: "carol".to_string()
        }
    );
    assert_eq!(
        ChatMessage::parse("[USER_OFFLINE]|carol").expect("Test assertion failed"),
        ChatMessage::UserOffline {
            username: "carol".to_string()
        }
    );
}

#[test]
fn test_user_list_roster() {
    let roster = ChatMessage::UserList {
        usernames: vec!["alice".to_string(), "bob".to_string(), "carol".to_string()],
    };
    assert_eq!(roster.to_line(), "[USER_LIST]|alice,bob,carol");
    assert_eq!(
        ChatMessage::parse("[USER_LIST]|alice,bob,carol").expect("Test assertion failed"),
        roster
    );

    // 접속자가 없으면 빈 목록
    let empty = ChatMessage::UserList { usernames: vec![] };
    assert_eq!(empty.to_line(), "[USER_LIST]|");
    assert_eq!(
        ChatMessage::parse("[USER_LIST]|").expect("Test assertion failed"),
        empty
    );
}

#[test]
fn test_wrong_field_count_is_malformed() {
    let cases = [
        ("[GROUP]|alice", "[GROUP]", 3, 2),
        ("[GROUP]|alice|a|b", "[GROUP]", 3, 4),
        ("[PRIVATE]|alice|bob", "[PRIVATE]", 4, 3),
        ("[PRIVATE]|alice|bob|x|y", "[PRIVATE]", 4, 5),
        ("[USER_ONLINE]", "[USER_ONLINE]", 2, 1),
    ];

    for (line, expected_tag, expected_count, actual_count) in cases {
        match ChatMessage::parse(line) {
            Err(ChatError::MalformedMessage {
                tag,
                expected,
                actual,
            }) => {
                assert_eq!(tag, expected_tag, "{}", line);
                assert_eq!(expected, expected_count, "{}", line);
                assert_eq!(actual, actual_count, "{}", line);
            }
            other => panic!("{} → MalformedMessage 예상, 실제: {:?}", line, other),
        }
    }
}

#[test]
fn test_unknown_tag_is_plain_text() {
    for line in ["hello there", " [GROUP]|alice|hi", "[group]|alice|hi", "GROUP|alice|hi", ""] {
        assert_eq!(
            ChatMessage::parse(line).expect("Test assertion failed"),
            ChatMessage::PlainText {
                content: line.to_string()
            },
            "{:?}",
            line
        );
    }
}

#[test]
fn test_tag_is_matched_as_prefix() {
    // 태그 뒤에 바로 붙은 글자가 있어도 해당 태그로 분류
    assert_eq!(
        ChatMessage::parse("[GROUP]x|alice|hi").expect("Test assertion failed"),
        ChatMessage::Group {
            sender: "alice".to_string(),
            content: "hi".to_string(),
        }
    );

    // 필드 수가 맞지 않으면 무시하지 않고 형식 오류
    match ChatMessage::parse("[GROUP]alice|hi") {
        Err(ChatError::MalformedMessage { tag, actual, .. }) => {
            assert_eq!(tag, protocol::GROUP_TAG);
            assert_eq!(actual, 2);
        }
        other => panic!("MalformedMessage 예상, 실제: {:?}", other),
    }
    assert!(matches!(
        ChatMessage::parse("[PRIVATE]alice bob hi"),
        Err(ChatError::MalformedMessage { tag: protocol::PRIVATE_TAG, .. })
    ));
}

#[test]
fn test_field_count() {
    assert_eq!(ChatMessage::field_count(protocol::GROUP_TAG), 3);
    assert_eq!(ChatMessage::field_count(protocol::PRIVATE_TAG), 4);
    assert_eq!(ChatMessage::field_count(protocol::USER_ONLINE_TAG), 2);
    assert_eq!(ChatMessage::field_count(protocol::USER_OFFLINE_TAG), 2);
    assert_eq!(ChatMessage::field_count(protocol::USER_LIST_TAG), 2);
}

#[tokio::test]
async fn test_read_line_variants() {
    let input: &[u8] = b"first\r\nsecond\n\nlast-without-newline";
    let mut reader = BufReader::new(input);

    let mut lines = Vec::new();
    while let Some(line) = protocol::read_line(&mut reader, 64)
        .await
        .expect("Test assertion failed")
    {
        lines.push(line);
    }

    assert_eq!(lines, vec!["first", "second", "", "last-without-newline"]);
}

#[tokio::test]
async fn test_read_line_rejects_oversized_line() {
    let input = format!("{}\n", "x".repeat(100));
    let mut reader = BufReader::new(input.as_bytes());

    let result = protocol::read_line(&mut reader, 16).await;
    assert!(matches!(result, Err(ChatError::StreamTerminated { .. })));
}

#[tokio::test]
async fn test_read_line_accepts_line_at_limit() {
    let input = format!("{}\n", "y".repeat(16));
    let mut reader = BufReader::new(input.as_bytes());

    let line = protocol::read_line(&mut reader, 16)
        .await
        .expect("Test assertion failed");
    assert_eq!(line, Some("y".repeat(16)));
}

#[tokio::test]
async fn test_write_line_appends_newline() {
    let mut output = Vec::new();
    protocol::write_line(&mut output, "[USER_ONLINE]|alice")
        .await
        .expect("Test assertion failed");
    assert_eq!(output, b"[USER_ONLINE]|alice\n");
}

#[tokio::test]
async fn test_read_line_replaces_invalid_utf8() {
    let input: &[u8] = b"[GROUP]|alice|caf\xe9\nnext\n";
    let mut reader = BufReader::new(input);

    let line = protocol::read_line(&mut reader, 64)
        .await
        .expect("Test assertion failed");
    assert_eq!(line.as_deref(), Some("[GROUP]|alice|caf\u{FFFD}"));

    // 다음 줄도 정상적으로 읽힘
    let next = protocol::read_line(&mut reader, 64)
        .await
        .expect("Test assertion failed");
    assert_eq!(next.as_deref(), Some("next"));
}
