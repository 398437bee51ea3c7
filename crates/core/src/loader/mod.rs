//! # リソースローダー
//!
//! グルーテキストとバイナリの取得を抽象化する。
//! タイムアウト等の取得ポリシーはローダー側の責務とする。
//!
//! ## ローダー実装
//! - `FileLoader`: ローカルファイルシステムから読み込む（開発・テスト用）
//! - `HttpLoader`: URL経由で取得する
//! - `MemoryLoader`: 事前に渡されたバッファを返す（フェッチ不要な埋め込み用）

pub mod file;
pub mod http;
pub mod memory;

pub use file::FileLoader;
pub use http::HttpLoader;
pub use memory::MemoryLoader;

use std::future::Future;
use std::pin::Pin;

/// リソースのロード結果。
pub struct Resource {
    /// リソースの生データ
    pub bytes: Vec<u8>,
    /// ソースURI（`ModuleHandle::source` に記録される）
    pub source: String,
}

/// リソースをロードするトレイト。
///
/// リソース位置（パスまたはURL）に対応するデータを取得する方法を抽象化する。
pub trait ResourceLoader: Send + Sync {
    /// `location` のリソースをロードする。
    fn load<'a>(
        &'a self,
        location: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Resource, String>> + Send + 'a>>;
}
