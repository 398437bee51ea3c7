//! # リソース制限
//!
//! ホスト側の上限と、グルーマニフェストが要求する制限をマージする。
//! マニフェストは制限を下げることはできるが、上限を超えて引き上げることはできない。

use pkgboot_types::ResourceLimits;

/// Fuel上限（命令実行数）: 1億命令
pub const DEFAULT_FUEL_LIMIT: u64 = 100_000_000;

/// 線形メモリ上限（バイト）: 64MB
pub const DEFAULT_MEMORY_LIMIT: usize = 64 * 1024 * 1024;

/// ホスト側のリソース上限。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostLimits {
    pub fuel: u64,
    pub memory_bytes: usize,
}

impl Default for HostLimits {
    fn default() -> Self {
        Self {
            fuel: DEFAULT_FUEL_LIMIT,
            memory_bytes: DEFAULT_MEMORY_LIMIT,
        }
    }
}

impl HostLimits {
    /// マニフェストの要求をホスト上限で切り詰めた実効制限を返す。
    pub fn resolve(&self, requested: Option<&ResourceLimits>) -> HostLimits {
        let Some(rl) = requested else {
            return *self;
        };
        let requested_memory = rl
            .memory_bytes
            .map(|m| usize::try_from(m).unwrap_or(usize::MAX));
        HostLimits {
            fuel: rl.fuel.map_or(self.fuel, |f| f.min(self.fuel)),
            memory_bytes: requested_memory.map_or(self.memory_bytes, |m| m.min(self.memory_bytes)),
        }
    }
}
