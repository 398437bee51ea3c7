//! # pkgboot 共有型定義
//!
//! グルーマニフェスト（`pkg/<name>.json`）とその周辺のデータ構造を提供する。
//!
//! グルーテキストは任意コードとして評価せず、型付きのマニフェストとして解釈する。
//! マニフェストはバイナリモジュールのインポートとホスト関数の対応を宣言する。

use serde::{Deserialize, Serialize};

/// グルーが定義すべき既知のグローバル名。
pub const EXPECTED_GLOBAL: &str = "wasm_bindgen";

/// ブートストラップ時に呼び出す固定のエントリポイント名。
pub const ENTRY_POINT: &str = "app";

/// ホスト関数が読み書きするゲストメモリのエクスポート名。
pub const MEMORY_EXPORT: &str = "memory";

// ---------------------------------------------------------------------------
// グルーマニフェスト
// ---------------------------------------------------------------------------

/// グルーテキストの型付き表現。
///
/// ```json
/// {
///   "global": "wasm_bindgen",
///   "imports": [{ "module": "env", "name": "console_log", "host": "console_log" }],
///   "limits": { "fuel": 1000000 }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlueManifest {
    /// グルーが定義するグローバル名（`wasm_bindgen` であること）
    pub global: String,
    /// バイナリのインポートとホスト関数の対応表
    #[serde(default)]
    pub imports: Vec<ImportBinding>,
    /// モジュールが要求するリソース制限（Optional）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits: Option<ResourceLimits>,
}

/// バイナリのインポート1件とホスト関数の対応。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportBinding {
    /// インポートのモジュール名（例: "env"）
    pub module: String,
    /// インポートのフィールド名（例: "console_log"）
    pub name: String,
    /// 割り当てるホスト関数
    pub host: HostFunction,
}

/// グルーから割り当て可能なホスト関数の一覧。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostFunction {
    /// `(ptr: i32, len: i32)`: ゲストメモリのUTF-8文字列をinfo行として記録する
    ConsoleLog,
    /// `(ptr: i32, len: i32)`: ゲストメモリのUTF-8文字列をerror行として記録する
    ConsoleError,
    /// `() -> f64`: UNIXエポックからのミリ秒
    NowMs,
    /// `(ptr: i32, len: i32)`: 指定メッセージで現在の呼び出しを中断する
    Throw,
}

impl HostFunction {
    /// マニフェスト上の名前を返す。
    pub fn as_str(&self) -> &'static str {
        match self {
            HostFunction::ConsoleLog => "console_log",
            HostFunction::ConsoleError => "console_error",
            HostFunction::NowMs => "now_ms",
            HostFunction::Throw => "throw",
        }
    }
}

impl std::fmt::Display for HostFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// マニフェストが要求するリソース制限。
/// ホスト側の上限を超える値は無視される（上限で切り詰める）。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLimits {
    /// 命令実行数の上限（Fuel）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuel: Option<u64>,
    /// 線形メモリの上限（バイト）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_bytes: Option<u64>,
}

// ---------------------------------------------------------------------------
// 実行結果
// ---------------------------------------------------------------------------

/// ゲストのコンソール出力レベル。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsoleLevel {
    Info,
    Error,
}

/// ゲストがホスト関数経由で出力した1行。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleLine {
    pub level: ConsoleLevel,
    pub message: String,
}

/// インスタンス化済みモジュールの概要。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleHandle {
    /// バイナリの取得元URI
    pub source: String,
    /// バイナリのSHA-256ハッシュ（hex）
    pub wasm_hash: String,
    /// エクスポートされている関数名
    pub exports: Vec<String>,
}

/// `pkgboot locate` の出力。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleLocations {
    /// グルーテキストの位置
    pub glue: String,
    /// バイナリの位置
    pub binary: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_defaults() {
        let manifest: GlueManifest =
            serde_json::from_str(r#"{ "global": "wasm_bindgen" }"#).unwrap();
        assert_eq!(manifest.global, EXPECTED_GLOBAL);
        assert!(manifest.imports.is_empty());
        assert!(manifest.limits.is_none());
    }

    #[test]
    fn test_manifest_with_imports_and_limits() {
        let manifest: GlueManifest = serde_json::from_str(
            r#"{
                "global": "wasm_bindgen",
                "imports": [
                    { "module": "env", "name": "log", "host": "console_log" },
                    { "module": "env", "name": "now", "host": "now_ms" }
                ],
                "limits": { "fuel": 5000 }
            }"#,
        )
        .unwrap();

        assert_eq!(manifest.imports.len(), 2);
        assert_eq!(manifest.imports[0].host, HostFunction::ConsoleLog);
        assert_eq!(manifest.imports[1].host, HostFunction::NowMs);
        let limits = manifest.limits.unwrap();
        assert_eq!(limits.fuel, Some(5000));
        assert_eq!(limits.memory_bytes, None);
    }

    #[test]
    fn test_unknown_host_function_rejected() {
        let result: Result<GlueManifest, _> = serde_json::from_str(
            r#"{
                "global": "wasm_bindgen",
                "imports": [{ "module": "env", "name": "x", "host": "eval" }]
            }"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_host_function_names_match_serde() {
        for host in [
            HostFunction::ConsoleLog,
            HostFunction::ConsoleError,
            HostFunction::NowMs,
            HostFunction::Throw,
        ] {
            let json = serde_json::to_string(&host).unwrap();
            assert_eq!(json, format!("\"{}\"", host.as_str()));
        }
    }
}
