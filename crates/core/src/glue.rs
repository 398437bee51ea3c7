//! # グルー評価
//!
//! 取得したグルーテキストから初期化関数（`Initializer`）を導出する。
//!
//! グルーテキストを任意コードとして実行するのではなく、
//! 型付きの `GlueManifest` として解釈し、以下を検査する。
//! - UTF-8かつJSONとして正しいこと
//! - 既知のグローバル `wasm_bindgen` を定義していること
//! - インポートの対応表に重複や空の名前がないこと

use std::collections::HashSet;
use std::sync::Arc;

use pkgboot_types::{GlueManifest, EXPECTED_GLOBAL};

use crate::bindings::Bindings;
use crate::error::BootstrapError;
use crate::limits::HostLimits;
use crate::loader::ResourceLoader;

/// グルーテキストから導出された引数なしの初期化関数。
///
/// `init()` を呼ぶたびに新しい `Bindings` を生成する。
/// 生成された `Bindings` 同士は状態を共有しない。
pub struct Initializer {
    manifest: GlueManifest,
    loader: Arc<dyn ResourceLoader>,
    limits: HostLimits,
}

impl Initializer {
    pub fn manifest(&self) -> &GlueManifest {
        &self.manifest
    }

    /// 実効リソース制限（マニフェストの要求をホスト上限で切り詰めたもの）。
    pub fn limits(&self) -> HostLimits {
        self.limits
    }

    /// Bindingsを生成する。
    pub fn init(&self) -> Bindings {
        Bindings::new(self.manifest.clone(), Arc::clone(&self.loader), self.limits)
    }
}

/// グルーテキストを評価し、Initializerを返す。
///
/// # 引数
/// - `text`: 取得したグルーテキスト
/// - `loader`: Bindingsがバイナリ取得に使うローダー
/// - `host_limits`: ホスト側のリソース上限
pub fn evaluate(
    text: &[u8],
    loader: Arc<dyn ResourceLoader>,
    host_limits: &HostLimits,
) -> Result<Initializer, BootstrapError> {
    let text = std::str::from_utf8(text)
        .map_err(|e| BootstrapError::Evaluation(format!("UTF-8として不正なグルーテキスト: {e}")))?;
    let manifest: GlueManifest = serde_json::from_str(text)
        .map_err(|e| BootstrapError::Evaluation(format!("グルーマニフェストのパースに失敗: {e}")))?;

    if manifest.global != EXPECTED_GLOBAL {
        return Err(BootstrapError::Evaluation(format!(
            "グルーが {EXPECTED_GLOBAL} を定義していません（定義: {:?}）",
            manifest.global
        )));
    }

    let mut seen = HashSet::new();
    for binding in &manifest.imports {
        if binding.module.is_empty() || binding.name.is_empty() {
            return Err(BootstrapError::Evaluation(format!(
                "インポート名が空です: {:?}.{:?}",
                binding.module, binding.name
            )));
        }
        if !seen.insert((binding.module.as_str(), binding.name.as_str())) {
            return Err(BootstrapError::Evaluation(format!(
                "インポートが重複しています: {}.{}",
                binding.module, binding.name
            )));
        }
    }

    let limits = host_limits.resolve(manifest.limits.as_ref());
    tracing::debug!(
        imports = manifest.imports.len(),
        fuel = limits.fuel,
        memory_bytes = limits.memory_bytes,
        "グルーを評価しました"
    );

    Ok(Initializer {
        manifest,
        loader,
        limits,
    })
}
