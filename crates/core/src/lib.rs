//! # pkgboot Core
//!
//! モジュール名からグルーテキストとバイナリを取得し、
//! バイナリをインスタンス化してエントリポイント `app` を実行する。
//!
//! ```text
//! name → グルーテキスト → Initializer → Bindings → インスタンス化 → app() → Bindings
//! ```
//!
//! ## 構成
//! - `loader`: リソース取得の抽象化（ファイル、HTTP、メモリ）
//! - `layout`: モジュール名からリソース位置を組み立てる規約
//! - `glue`: グルーテキストの評価（型付きマニフェストとして解釈）
//! - `bindings`: インスタンス化とエクスポート呼び出し
//! - `bootstrap`: 上記を直列に実行するブートストラッパー

pub mod bindings;
pub mod bootstrap;
pub mod error;
pub mod glue;
pub mod layout;
pub mod limits;
pub mod loader;

#[cfg(test)]
mod test_helpers;

pub use bindings::Bindings;
pub use bootstrap::Bootstrapper;
pub use error::BootstrapError;
pub use glue::{evaluate, Initializer};
pub use layout::ResourceLayout;
pub use limits::HostLimits;
pub use loader::{FileLoader, HttpLoader, MemoryLoader, Resource, ResourceLoader};
