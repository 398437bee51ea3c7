//! # CLI設定
//!
//! コマンドライン引数 → 環境変数 → デフォルト値の順で設定を解決する。
//!
//! ## 環境変数
//! - `PKGBOOT_BASE`: ベースパスまたはベースURL
//! - `PKGBOOT_FUEL_LIMIT`: Fuel上限
//! - `PKGBOOT_MEMORY_LIMIT`: 線形メモリ上限（バイト）
//! - `PKGBOOT_HTTP_TIMEOUT_SECS`: HTTP取得のタイムアウト（秒）

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use pkgboot_core::layout::DEFAULT_BASE;
use pkgboot_core::loader::http::DEFAULT_TIMEOUT_SECS;
use pkgboot_core::{FileLoader, HostLimits, HttpLoader, ResourceLayout, ResourceLoader};

pub const ENV_BASE: &str = "PKGBOOT_BASE";
pub const ENV_FUEL_LIMIT: &str = "PKGBOOT_FUEL_LIMIT";
pub const ENV_MEMORY_LIMIT: &str = "PKGBOOT_MEMORY_LIMIT";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "PKGBOOT_HTTP_TIMEOUT_SECS";

/// 設定エラー。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 数値として解釈できない環境変数
    #[error("{key} の値が不正です: {value:?}")]
    InvalidNumber { key: &'static str, value: String },
    /// ローダーの構築失敗
    #[error("ローダーの構築に失敗: {0}")]
    Loader(String),
}

/// リソースの取得元と制限に関する引数。
#[derive(Debug, Default, clap::Args)]
pub struct SourceArgs {
    /// ベースパスまたはベースURL（例: ./public, https://cdn.example.com/app）
    #[arg(long)]
    pub base: Option<String>,
    /// Fuel上限（命令実行数）
    #[arg(long)]
    pub fuel: Option<u64>,
    /// 線形メモリ上限（バイト）
    #[arg(long)]
    pub memory_bytes: Option<usize>,
    /// HTTP取得のタイムアウト（秒）
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

/// 解決済みの設定。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootConfig {
    pub base: String,
    pub limits: HostLimits,
    pub http_timeout: Duration,
}

impl BootConfig {
    /// プロセスの環境変数を使って設定を解決する。
    pub fn from_env(args: &SourceArgs) -> Result<Self, ConfigError> {
        Self::resolve(args, |key| std::env::var(key).ok())
    }

    /// 引数と環境変数参照関数から設定を解決する。
    pub fn resolve(
        args: &SourceArgs,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let defaults = HostLimits::default();

        let base = args
            .base
            .clone()
            .or_else(|| env(ENV_BASE))
            .unwrap_or_else(|| DEFAULT_BASE.to_string());
        let fuel = match args.fuel {
            Some(fuel) => fuel,
            None => parse_env(&env, ENV_FUEL_LIMIT)?.unwrap_or(defaults.fuel),
        };
        let memory_bytes = match args.memory_bytes {
            Some(bytes) => bytes,
            None => parse_env(&env, ENV_MEMORY_LIMIT)?.unwrap_or(defaults.memory_bytes),
        };
        let timeout_secs = match args.timeout_secs {
            Some(secs) => secs,
            None => parse_env(&env, ENV_HTTP_TIMEOUT_SECS)?.unwrap_or(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            base,
            limits: HostLimits { fuel, memory_bytes },
            http_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// ベースがHTTP(S)のURLか。
    pub fn is_http(&self) -> bool {
        self.base.starts_with("http://") || self.base.starts_with("https://")
    }

    pub fn layout(&self) -> ResourceLayout {
        ResourceLayout::new(self.base.clone())
    }

    /// ベースに応じたローダーを構築する。
    pub fn loader(&self) -> Result<Arc<dyn ResourceLoader>, ConfigError> {
        if self.is_http() {
            let loader = HttpLoader::new(self.http_timeout).map_err(ConfigError::Loader)?;
            Ok(Arc::new(loader))
        } else {
            Ok(Arc::new(FileLoader::new()))
        }
    }
}

fn parse_env<T: FromStr>(
    env: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    match env(key) {
        None => Ok(None),
        Some(value) => match value.trim().parse() {
            Ok(parsed) => Ok(Some(parsed)),
            Err(_) => Err(ConfigError::InvalidNumber { key, value }),
        },
    }
}
