//! 네트워크 유틸리티
//!
//! 접속한 클라이언트 주소 분류와 서버의 LAN 주소 탐지를 제공합니다.

use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};
use tracing::debug;

/// 라우팅 테이블 조회용 외부 주소 (실제 패킷은 전송되지 않음)
const ROUTE_LOOKUP_ADDR: &str = "8.8.8.8:80";

/// 네트워크 유틸리티
pub struct NetworkUtils;

impl NetworkUtils {
    /// 클라이언트가 접속할 때 입력해야 하는 LAN IPv4 주소
    ///
    /// UDP 소켓을 외부 주소에 `connect`하면 OS가 출발 인터페이스를 고르므로
    /// 그 로컬 주소를 읽습니다. 루프백만 있거나 실패하면 `127.0.0.1`을 반환합니다.
    pub fn local_ipv4() -> Ipv4Addr {
        let lookup = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))
            .and_then(|socket| socket.connect(ROUTE_LOOKUP_ADDR).map(|_| socket))
            .and_then(|socket| socket.local_addr());

        match lookup {
            Ok(SocketAddr::V4(addr)) if !addr.ip().is_loopback() && !addr.ip().is_unspecified() => {
                *addr.ip()
            }
            Ok(addr) => {
                debug!("LAN 주소 탐지 결과 사용 불가: {}", addr);
                Ipv4Addr::LOCALHOST
            }
            Err(e) => {
                debug!("LAN 주소 탐지 실패: {}", e);
                Ipv4Addr::LOCALHOST
            }
        }
    }

    /// 로컬호스트 여부 확인
    pub fn is_localhost(ip: &IpAddr) -> bool {
        ip.is_loopback()
    }

    /// 사설 IP 여부 확인
    pub fn is_private_ip(ip: &IpAddr) -> bool {
        match ip {
            IpAddr::V4(ipv4) => ipv4.is_private() || ipv4.is_link_local(),
            IpAddr::V6(ipv6) => {
                // IPv6 사설 주소 (fc00::/7, fe80::/10)
                let octets = ipv6.octets();
                (octets[0] & 0xfe == 0xfc) || (octets[0] == 0xfe && octets[1] & 0xc0 == 0x80)
            }
        }
    }
}

/// 접속 주소 정보
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpInfo {
    pub address: String,
    pub is_localhost: bool,
    pub is_private: bool,
}

impl IpInfo {
    pub fn from_socket_addr(addr: &SocketAddr) -> Self {
        let ip = addr.ip();
        Self {
            address: addr.to_string(),
            is_localhost: NetworkUtils::is_localhost(&ip),
            is_private: NetworkUtils::is_private_ip(&ip),
        }
    }

    /// 로그용 분류 이름
    pub fn scope(&self) -> &'static str {
        if self.is_localhost {
            "localhost"
        } else if self.is_private {
            "lan"
        } else {
            "external"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ip_info_scope() {
        let local: SocketAddr = "127.0.0.1:5000".parse().expect("Test assertion failed");
        let lan: SocketAddr = "192.168.0.12:5000".parse().expect("Test assertion failed");
        let external: SocketAddr = "8.8.4.4:5000".parse().expect("Test assertion failed");

        assert_eq!(IpInfo::from_socket_addr(&local).scope(), "localhost");
        assert_eq!(IpInfo::from_socket_addr(&lan).scope(), "lan");
        assert_eq!(IpInfo::from_socket_addr(&external).scope(), "external");
    }

    #[test]
    fn test_private_ipv6() {
        let ula: IpAddr = "fd00::1".parse().expect("Test assertion failed");
        let global: IpAddr = "2001:db8::1".parse().expect("Test assertion failed");
        assert!(NetworkUtils::is_private_ip(&ula));
        assert!(!NetworkUtils::is_private_ip(&global));
    }

    #[test]
    fn test_local_ipv4_never_unspecified() {
        let ip = NetworkUtils::local_ipv4();
        assert!(!ip.is_unspecified());
    }
}
