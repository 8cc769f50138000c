//! 접속 사용자 레지스트리
//!
//! 사용자 이름 → 송신 핸들 매핑을 DashMap으로 관리합니다.
//! 서버 시작 시 한 번 만들어 `Arc`로 수락 루프와 모든 세션에 전달합니다.
//!
//! 호출자에게는 원자적 연산만 노출하며, 내부 반복자나 샤드 guard를
//! 밖으로 내보내지 않습니다. 스냅샷은 복제본이므로 `await` 중에
//! 샤드 락을 잡고 있지 않습니다.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use tracing::debug;

use crate::service::client_sink::ClientSink;

/// 레지스트리 항목
#[derive(Clone)]
struct RegisteredUser {
    sink: ClientSink,
    /// 등록 순번 (접속자 목록 정렬용)
    join_seq: u64,
}

/// 레지스트리 통계
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryStats {
    pub online_users: usize,
    pub peak_users: usize,
    pub total_registrations: u64,
}

/// 접속 사용자 레지스트리
#[derive(Default)]
pub struct UserRegistry {
    users: DashMap<String, RegisteredUser>,
    next_join_seq: AtomicU64,
    peak_users: AtomicUsize,
}

impl UserRegistry {
    /// 빈 레지스트리 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 원자적 check-and-insert
    ///
    /// 이미 같은 이름이 있거나 이름이 비어있으면 상태를 바꾸지 않고 `false`를 반환합니다.
    /// 같은 이름으로 동시에 호출되어도 정확히 하나만 성공합니다.
    pub fn try_insert(&self, username: &str, sink: ClientSink) -> bool {
        if username.is_empty() {
            return false;
        }

        let inserted = match self.users.entry(username.to_string()) {
            Entry::Occupied(_) => None,
            Entry::Vacant(vacant) => {
                let join_seq = self.next_join_seq.fetch_add(1, Ordering::Relaxed);
                vacant.insert(RegisteredUser { sink, join_seq });
                Some(join_seq)
            }
        };

        // 샤드 락이 풀린 뒤에 len() 호출 (같은 샤드 재진입 방지)
        match inserted {
            Some(join_seq) => {
                self.peak_users.fetch_max(self.users.len(), Ordering::Relaxed);
                debug!("사용자 {} 등록 (순번 {})", username, join_seq);
                true
            }
            None => {
                debug!("이미 등록된 사용자 이름: {}", username);
                false
            }
        }
    }

    /// 사용자 제거 (멱등)
    ///
    /// 실제로 제거했으면 `true`, 이미 없었으면 `false`를 반환합니다.
    pub fn remove(&self, username: &str) -> bool {
        let removed = self.users.remove(username).is_some();
        if removed {
            debug!("사용자 {} 제거", username);
        }
        removed
    }

    /// 송신 핸들 조회
    pub fn lookup(&self, username: &str) -> Option<ClientSink> {
        self.users.get(username).map(|entry| entry.sink.clone())
    }

    pub fn contains(&self, username: &str) -> bool {
        self.users.contains_key(username)
    }

    /// 현재 접속자 이름 (등록 순서)
    pub fn snapshot_names(&self) -> Vec<String> {
        let mut entries: Vec<(u64, String)> = self
            .users
            .iter()
            .map(|entry| (entry.value().join_seq, entry.key().clone()))
            .collect();
        entries.sort_unstable_by_key(|(join_seq, _)| *join_seq);
        entries.into_iter().map(|(_, name)| name).collect()
    }

    /// 현재 접속자 송신 핸들 (등록 순서)
    pub fn snapshot_sinks(&self) -> Vec<ClientSink> {
        let mut entries: Vec<(u64, ClientSink)> = self
            .users
            .iter()
            .map(|entry| (entry.value().join_seq, entry.value().sink.clone()))
            .collect();
        entries.sort_unstable_by_key(|(join_seq, _)| *join_seq);
        entries.into_iter().map(|(_, sink)| sink).collect()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// 레지스트리 통계 조회
    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            online_users: self.users.len(),
            peak_users: self.peak_users.load(Ordering::Relaxed),
            total_registrations: self.next_join_seq.load(Ordering::Relaxed),
        }
    }
}
