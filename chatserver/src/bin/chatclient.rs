//! 터미널 채팅 클라이언트
//!
//! 사용법: `chatclient [서버주소] [사용자이름]`
//!
//! - 서버 주소 기본값: 환경변수 `chat_server_addr` 또는 "127.0.0.1:8888"
//! - 사용자 이름을 생략하면 입력을 요청합니다.
//!
//! 명령:
//! - `/w <사용자> <내용>`: 귓속말
//! - `/quit`: 종료
//! - 그 외 입력: 전체 채팅

use anyhow::{bail, Context, Result};
use shared::config::{env_string, load_env_file};
use shared::logging::{init_logging, LoggingConfig, ServiceType};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::warn;

use chatserver::client::{render, ChatClient};

const DEFAULT_SERVER_ADDR: &str = "127.0.0.1:8888";

/// 입력 한 줄 해석 결과
enum Command<'a> {
    Quit,
    Private { receiver: &'a str, content: &'a str },
    Group(&'a str),
    Empty,
}

fn parse_command(input: &str) -> Command<'_> {
    let input = input.trim();
    if input.is_empty() {
        return Command::Empty;
    }
    if input == "/quit" {
        return Command::Quit;
    }
    if let Some(rest) = input.strip_prefix("/w ") {
        if let Some((receiver, content)) = rest.trim_start().split_once(' ') {
            return Command::Private {
                receiver,
                content: content.trim(),
            };
        }
    }
    Command::Group(input)
}

#[tokio::main]
async fn main() -> Result<()> {
    // 클라이언트 화면을 가리지 않도록 기본 레벨은 warn
    load_env_file();
    let logging = LoggingConfig {
        level: env_string("LOG_LEVEL", "warn").to_lowercase(),
        ..LoggingConfig::from_env()
    };
    init_logging(ServiceType::ChatClient, &logging)?;

    let mut args = std::env::args().skip(1);
    let addr = args
        .next()
        .unwrap_or_else(|| env_string("chat_server_addr", DEFAULT_SERVER_ADDR));

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let username = match args.next() {
        Some(name) => name,
        None => {
            let mut stdout = tokio::io::stdout();
            stdout.write_all("사용자 이름: ".as_bytes()).await?;
            stdout.flush().await?;
            stdin.next_line().await?.unwrap_or_default()
        }
    };
    if username.trim().is_empty() {
        bail!("사용자 이름이 비어있습니다");
    }

    let client = ChatClient::connect(&addr, &username)
        .await
        .with_context(|| format!("서버 접속 실패: {}", addr))?;
    println!("{}에 접속했습니다. (/w <사용자> <내용>: 귓속말, /quit: 종료)", addr);

    let (mut receiver, mut sender) = client.split();

    let receive_task = tokio::spawn(async move {
        loop {
            match receiver.next_message().await {
                Ok(Some(message)) => println!("{}", render(&message)),
                Ok(None) => {
                    println!("서버와의 연결이 종료되었습니다.");
                    break;
                }
                Err(e) => {
                    println!("수신 에러: {}", e);
                    break;
                }
            }
        }
    });

    while let Some(input) = stdin.next_line().await? {
        if receive_task.is_finished() {
            break;
        }

        let result = match parse_command(&input) {
            Command::Quit => break,
            Command::Empty => continue,
            Command::Private { receiver, content } => sender.send_private(receiver, content).await,
            Command::Group(content) => sender.send_group(content).await,
        };

        if let Err(e) = result {
            warn!("전송 실패: {}", e);
            println!("! 전송 실패: {}", e);
        }
    }

    if let Err(e) = sender.shutdown().await {
        warn!("연결 종료 중 에러: {}", e);
    }
    receive_task.abort();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command() {
        assert!(matches!(parse_command("/quit"), Command::Quit));
        assert!(matches!(parse_command("   "), Command::Empty));
        assert!(matches!(parse_command("hello all"), Command::Group("hello all")));

        match parse_command("/w bob  see you soon ") {
            Command::Private { receiver, content } => {
                assert_eq!(receiver, "bob");
                assert_eq!(content, "see you soon");
            }
            _ => panic!("귓속말 명령으로 해석되어야 함"),
        }

        // 내용이 없으면 전체 채팅으로 취급
        assert!(matches!(parse_command("/w bob"), Command::Group("/w bob")));
    }
}
