//! # pkgboot WASM実行環境
//!
//! バイナリモジュールのコンパイル・リンク・インスタンス化と、
//! エクスポート関数の呼び出しをwasmtimeを直接使用して実装する。
//!
//! ## 安全性確保
//! - Fuel制限: 命令実行数の上限（無限ループ防止）
//! - Memory制限: 線形メモリの上限（OOM防止）
//! - catch_unwind: パニックをキャッチし、呼び出し元への影響を遮断
//!
//! ## 状態のスコープ
//! `Store` はインスタンスごとに生成する。`Engine` は設定のみを保持し、
//! コンパイル済みモジュールのキャッシュは持たない。

mod host;

use host::HostState;

use std::panic::{self, AssertUnwindSafe};

use pkgboot_types::{ConsoleLine, ImportBinding};
use wasmtime::{Config, Engine, ExternType, Instance, Linker, Module, Store, Trap};

/// WASM実行環境のエラー型
#[derive(Debug, thiserror::Error)]
pub enum WasmError {
    /// WASMモジュールのコンパイルエラー
    #[error("WASMコンパイルエラー: {0}")]
    CompileError(String),
    /// インポート解決エラー
    #[error("WASMリンクエラー: {0}")]
    LinkError(String),
    /// インスタンス化エラー
    #[error("WASMインスタンス化エラー: {0}")]
    InstantiationError(String),
    /// 指定されたエクスポート関数が存在しない
    #[error("エクスポート関数が存在しません: {0}")]
    MissingExport(String),
    /// WASMモジュールの実行エラー（trap等）
    #[error("WASM実行エラー: {0}")]
    ExecutionError(String),
    /// Fuel制限超過
    #[error("Fuel制限を超過しました")]
    FuelExhausted,
    /// Memory制限超過
    #[error("Memory制限を超過しました")]
    MemoryLimitExceeded,
    /// WASMパニック
    #[error("WASMモジュールがパニックしました: {0}")]
    Panic(String),
    /// ホスト関数エラー
    #[error("ホスト関数エラー: {0}")]
    HostFunctionError(String),
    /// ゲストが `throw` ホスト関数で送出したエラー
    #[error("ゲストが例外を送出しました: {0}")]
    Thrown(String),
}

/// WASM実行ランナー。
pub struct WasmRunner {
    engine: Engine,
    /// Fuel制限（命令実行数の上限）
    fuel_limit: u64,
    /// Memory制限（バイト）
    memory_limit: usize,
}

impl WasmRunner {
    /// 新しいWasmRunnerを作成する。
    ///
    /// # 引数
    /// - `fuel_limit`: 命令実行数の上限（無限ループ防止）
    /// - `memory_limit`: 線形メモリの上限（バイト、OOM防止）
    pub fn new(fuel_limit: u64, memory_limit: usize) -> Result<Self, WasmError> {
        let mut config = Config::new();
        config.consume_fuel(true);
        let engine = Engine::new(&config)
            .map_err(|e| WasmError::CompileError(format!("エンジンの初期化に失敗: {e}")))?;
        Ok(Self {
            engine,
            fuel_limit,
            memory_limit,
        })
    }

    /// WASMバイナリをコンパイルし、ホスト関数をリンクしてインスタンス化する。
    ///
    /// catch_unwindによりパニックを遮断する。
    ///
    /// # 引数
    /// - `wasm_bytes`: WASMバイナリ（テキスト形式は受け付けない）
    /// - `imports`: インポートとホスト関数の対応表
    pub fn instantiate(
        &self,
        wasm_bytes: &[u8],
        imports: &[ImportBinding],
    ) -> Result<WasmInstance, WasmError> {
        let result =
            panic::catch_unwind(AssertUnwindSafe(|| self.instantiate_inner(wasm_bytes, imports)));

        match result {
            Ok(inner) => inner,
            Err(_) => Err(WasmError::Panic(
                "インスタンス化中にパニックが発生しました".to_string(),
            )),
        }
    }

    fn instantiate_inner(
        &self,
        wasm_bytes: &[u8],
        imports: &[ImportBinding],
    ) -> Result<WasmInstance, WasmError> {
        let module = Module::from_binary(&self.engine, wasm_bytes)
            .map_err(|e| WasmError::CompileError(format!("{e:#}")))?;

        let mut linker = Linker::new(&self.engine);
        host::link_imports(&mut linker, &module, imports)?;

        let mut store = Store::new(&self.engine, HostState::new(self.memory_limit));
        store.limiter(|state| &mut state.limiter);
        store
            .set_fuel(self.fuel_limit)
            .map_err(|e| WasmError::InstantiationError(format!("Fuelの設定に失敗: {e}")))?;

        let instantiated = linker.instantiate(&mut store, &module);
        let instance = match instantiated {
            Ok(instance) => instance,
            Err(_) if store.data().limiter.exceeded() => {
                return Err(WasmError::MemoryLimitExceeded)
            }
            Err(e) => return Err(classify(e, &store, WasmError::InstantiationError)),
        };

        let exports = module
            .exports()
            .filter(|e| matches!(e.ty(), ExternType::Func(_)))
            .map(|e| e.name().to_string())
            .collect();

        Ok(WasmInstance {
            store,
            instance,
            exports,
        })
    }
}

/// インスタンス化済みモジュール。ストアを専有する。
pub struct WasmInstance {
    store: Store<HostState>,
    instance: Instance,
    exports: Vec<String>,
}

impl WasmInstance {
    /// エクスポートされている関数名の一覧。
    pub fn exports(&self) -> &[String] {
        &self.exports
    }

    /// ゲストが出力したコンソール行。
    pub fn console(&self) -> &[ConsoleLine] {
        &self.store.data().console
    }

    /// 残りのFuel。
    pub fn remaining_fuel(&self) -> Option<u64> {
        self.store.get_fuel().ok()
    }

    /// 引数・戻り値なしのエクスポート関数を呼び出す。
    ///
    /// catch_unwindによりパニックを遮断する。
    pub fn call(&mut self, name: &str) -> Result<(), WasmError> {
        let result = panic::catch_unwind(AssertUnwindSafe(|| self.call_inner(name)));

        match result {
            Ok(inner) => inner,
            Err(_) => Err(WasmError::Panic(format!(
                "{name} の実行中にパニックが発生しました"
            ))),
        }
    }

    fn call_inner(&mut self, name: &str) -> Result<(), WasmError> {
        // メモリ超過の判定はこの呼び出し中の拒否に限る
        self.store.data_mut().limiter.reset();
        let func = self
            .instance
            .get_func(&mut self.store, name)
            .ok_or_else(|| WasmError::MissingExport(name.to_string()))?;
        let typed = func.typed::<(), ()>(&self.store).map_err(|e| {
            WasmError::ExecutionError(format!("{name} のシグネチャが () -> () ではありません: {e}"))
        })?;

        typed
            .call(&mut self.store, ())
            .map_err(|e| classify(e, &self.store, WasmError::ExecutionError))
    }
}

/// wasmtimeのエラーをWasmErrorに分類する。
fn classify(
    err: wasmtime::Error,
    store: &Store<HostState>,
    fallback: fn(String) -> WasmError,
) -> WasmError {
    if let Some(Trap::OutOfFuel) = err.downcast_ref::<Trap>() {
        return WasmError::FuelExhausted;
    }
    if let Some(thrown) = err.downcast_ref::<host::Thrown>() {
        return WasmError::Thrown(thrown.0.clone());
    }
    if let Some(host_err) = err.downcast_ref::<host::HostCallError>() {
        return WasmError::HostFunctionError(host_err.0.clone());
    }
    if store.data().limiter.exceeded() {
        return WasmError::MemoryLimitExceeded;
    }
    fallback(format!("{err:#}"))
}
