//! # モジュールブートストラッパー
//!
//! ## 処理シーケンス
//! 1. グルーテキストの取得（`<base>/pkg/<name>.json`）
//! 2. グルーの評価 → Initializer
//! 3. Initializerの呼び出し → Bindings
//! 4. バイナリのインスタンス化（`<base>/pkg/<name>_bg.wasm`）
//! 5. エントリポイント `app` の呼び出し
//! 6. Bindingsを返す
//!
//! 各ステップは直列に実行し、リトライ・キャッシュは行わない。
//! 同じ名前で2回呼び出すと、全ステップを独立に繰り返す。

use std::sync::Arc;

use crate::bindings::Bindings;
use crate::error::BootstrapError;
use crate::glue;
use crate::layout::ResourceLayout;
use crate::limits::HostLimits;
use crate::loader::ResourceLoader;

/// モジュールブートストラッパー。
pub struct Bootstrapper {
    loader: Arc<dyn ResourceLoader>,
    layout: ResourceLayout,
    limits: HostLimits,
}

impl Bootstrapper {
    /// 新しいBootstrapperを作成する。
    ///
    /// # 引数
    /// - `loader`: グルーテキストとバイナリの取得に使うローダー
    /// - `layout`: モジュール名からリソース位置を組み立てる規約
    /// - `limits`: ホスト側のリソース上限
    pub fn new(
        loader: Arc<dyn ResourceLoader>,
        layout: ResourceLayout,
        limits: HostLimits,
    ) -> Self {
        Self {
            loader,
            layout,
            limits,
        }
    }

    /// `name` のモジュールをブートストラップし、`app` 実行後のBindingsを返す。
    pub async fn bootstrap(&self, name: &str) -> Result<Bindings, BootstrapError> {
        let result = self.bootstrap_inner(name).await;
        if let Err(e) = &result {
            tracing::warn!(name, error = %e, "ブートストラップに失敗しました");
        }
        result
    }

    async fn bootstrap_inner(&self, name: &str) -> Result<Bindings, BootstrapError> {
        // Step 1: グルーテキストの取得
        let glue_location = self.layout.glue_location(name);
        tracing::info!(name, location = %glue_location, "グルーテキストを取得中");
        let glue_text = self
            .loader
            .load(&glue_location)
            .await
            .map_err(|reason| BootstrapError::Retrieval {
                location: glue_location.clone(),
                reason,
            })?;

        // Step 2: グルーの評価
        let initializer =
            glue::evaluate(&glue_text.bytes, Arc::clone(&self.loader), &self.limits)?;

        // Step 3: Bindingsの生成
        let mut bindings = initializer.init();

        // Step 4: バイナリのインスタンス化
        let binary_location = self.layout.binary_location(name);
        tracing::info!(name, location = %binary_location, "バイナリをインスタンス化中");
        let module = bindings.instantiate(&binary_location).await?;
        tracing::debug!(
            source = %module.source,
            wasm_hash = %module.wasm_hash,
            exports = ?module.exports,
            "インスタンス化完了"
        );

        // Step 5: エントリポイントの呼び出し
        tracing::info!(name, "エントリポイントを実行中");
        bindings.app()?;

        Ok(bindings)
    }
}
