//! 채팅 서버 메인 서비스
//!
//! 리스닝 소켓에서 연결을 수락하고, 연결마다 독립 태스크로 세션을 실행합니다.
//! 수락 루프는 클라이언트별 상태를 갖지 않으며 `accept()` 외에는 대기하지 않습니다.

use anyhow::{Context, Result};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{Duration, Instant};
use tracing::{debug, error, info};

use crate::config::ChatServerConfig;
use crate::handler::session::{ClientSession, SessionContext, SessionEnd};
use crate::service::user_registry::{RegistryStats, UserRegistry};
use crate::tool::network_utils::IpInfo;

/// accept 실패 후 재시도 전 대기 시간
const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// 연결 통계
#[derive(Debug, Default)]
pub struct ConnectionStats {
    total_accepted: AtomicU64,
    rejected_handshakes: AtomicU64,
    aborted_handshakes: AtomicU64,
    completed_sessions: AtomicU64,
}

impl ConnectionStats {
    fn record_accept(&self) {
        self.total_accepted.fetch_add(1, Ordering::Relaxed);
    }

    fn record_end(&self, end: &SessionEnd) {
        let counter = match end {
            SessionEnd::HandshakeAborted => &self.aborted_handshakes,
            SessionEnd::Rejected => &self.rejected_handshakes,
            SessionEnd::Disconnected { .. } => &self.completed_sessions,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// 서버 통계 정보
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerStats {
    pub total_accepted: u64,
    pub rejected_handshakes: u64,
    pub aborted_handshakes: u64,
    pub completed_sessions: u64,
    pub registry: RegistryStats,
    pub uptime_seconds: u64,
}

/// 채팅 서버 서비스
pub struct ChatService {
    config: ChatServerConfig,
    context: SessionContext,
    stats: Arc<ConnectionStats>,
    started_at: Instant,
}

impl ChatService {
    /// 새로운 서비스 생성 (빈 레지스트리로 시작)
    pub fn new(config: ChatServerConfig) -> Self {
        Self::with_registry(config, Arc::new(UserRegistry::new()))
    }

    /// 외부에서 만든 레지스트리로 서비스 생성
    pub fn with_registry(config: ChatServerConfig, registry: Arc<UserRegistry>) -> Self {
        let context = SessionContext::new(registry, config.send_timeout(), config.max_line_bytes);

        Self {
            config,
            context,
            stats: Arc::new(ConnectionStats::default()),
            started_at: Instant::now(),
        }
    }

    pub fn config(&self) -> &ChatServerConfig {
        &self.config
    }

    pub fn registry(&self) -> Arc<UserRegistry> {
        self.context.registry.clone()
    }

    /// 설정된 주소에 리스너 바인드
    pub async fn bind(&self) -> Result<TcpListener> {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr)
            .await
            .with_context(|| format!("TCP 리스너 바인드 실패: {}", bind_addr))?;

        info!("✅ 채팅 서버가 {}에서 실행 중입니다", listener.local_addr()?);
        Ok(listener)
    }

    /// 바인드 후 종료 없이 계속 수락
    pub async fn start(&self) -> Result<()> {
        let listener = self.bind().await?;
        self.serve_until(listener, std::future::pending()).await
    }

    /// `shutdown`이 완료될 때까지 연결 수락
    ///
    /// 종료 신호는 새 연결 수락만 멈추며, 이미 실행 중인 세션은
    /// 각자의 스트림이 끝날 때까지 계속 동작합니다.
    pub async fn serve_until<F>(&self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("🛑 연결 수락 중지");
                    return Ok(());
                }
                accepted = listener.accept() => match accepted {
                    Ok((stream, addr)) => self.spawn_session(stream, addr),
                    Err(e) => {
                        error!("클라이언트 연결 수락 실패: {}", e);
                        tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
                    }
                }
            }
        }
    }

    /// 연결 하나를 독립 태스크로 실행 (완료를 기다리지 않음)
    fn spawn_session(&self, stream: TcpStream, addr: SocketAddr) {
        let ip_info = IpInfo::from_socket_addr(&addr);
        info!("새 클라이언트 연결: {} ({})", ip_info.address, ip_info.scope());

        if let Err(e) = stream.set_nodelay(true) {
            debug!("TCP_NODELAY 설정 실패 ({}): {}", addr, e);
        }

        self.stats.record_accept();
        let context = self.context.clone();
        let stats = self.stats.clone();

        tokio::spawn(async move {
            let end = ClientSession::from_tcp(stream, ip_info.address.clone(), context)
                .run()
                .await;
            debug!("세션 종료 ({}): {:?}", ip_info.address, end);
            stats.record_end(&end);
        });
    }

    /// 서버 통계 조회
    pub fn stats(&self) -> ServerStats {
        ServerStats {
            total_accepted: self.stats.total_accepted.load(Ordering::Relaxed),
            rejected_handshakes: self.stats.rejected_handshakes.load(Ordering::Relaxed),
            aborted_handshakes: self.stats.aborted_handshakes.load(Ordering::Relaxed),
            completed_sessions: self.stats.completed_sessions.load(Ordering::Relaxed),
            registry: self.context.registry.stats(),
            uptime_seconds: self.started_at.elapsed().as_secs(),
        }
    }
}
