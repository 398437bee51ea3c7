//! # Bindings
//!
//! 初期化関数が生成する能力オブジェクト。
//! バイナリのインスタンス化と、インスタンス化後のエクスポート呼び出しを提供する。
//!
//! 各Bindingsは自身のストアとコンソール出力を専有し、他の呼び出しと共有しない。

use std::sync::Arc;

use pkgboot_types::{ConsoleLine, GlueManifest, ModuleHandle, ENTRY_POINT};
use pkgboot_wasm_host::{WasmInstance, WasmRunner};
use sha2::{Digest, Sha256};

use crate::error::BootstrapError;
use crate::limits::HostLimits;
use crate::loader::ResourceLoader;

pub struct Bindings {
    manifest: GlueManifest,
    loader: Arc<dyn ResourceLoader>,
    limits: HostLimits,
    instance: Option<WasmInstance>,
    module: Option<ModuleHandle>,
}

impl Bindings {
    pub(crate) fn new(
        manifest: GlueManifest,
        loader: Arc<dyn ResourceLoader>,
        limits: HostLimits,
    ) -> Self {
        Self {
            manifest,
            loader,
            limits,
            instance: None,
            module: None,
        }
    }

    pub fn manifest(&self) -> &GlueManifest {
        &self.manifest
    }

    pub fn limits(&self) -> HostLimits {
        self.limits
    }

    pub fn module(&self) -> Option<&ModuleHandle> {
        self.module.as_ref()
    }

    pub fn is_instantiated(&self) -> bool {
        self.instance.is_some()
    }

    /// ゲストが出力したコンソール行。インスタンス化前は空。
    pub fn console(&self) -> &[ConsoleLine] {
        match &self.instance {
            Some(instance) => instance.console(),
            None => &[],
        }
    }

    /// `location` のバイナリを取得し、インスタンス化する。
    ///
    /// 同じBindingsで2回目の呼び出しはエラーとなる。
    pub async fn instantiate(&mut self, location: &str) -> Result<ModuleHandle, BootstrapError> {
        if self.instance.is_some() {
            return Err(BootstrapError::Instantiation(
                "既にインスタンス化されています".to_string(),
            ));
        }

        let binary = self.loader.load(location).await.map_err(|e| {
            BootstrapError::Instantiation(format!("バイナリの取得に失敗 ({location}): {e}"))
        })?;
        let wasm_hash = hex::encode(Sha256::digest(&binary.bytes));
        tracing::debug!(source = %binary.source, %wasm_hash, size = binary.bytes.len(), "バイナリを取得しました");

        let runner = WasmRunner::new(self.limits.fuel, self.limits.memory_bytes)
            .map_err(|e| BootstrapError::Instantiation(e.to_string()))?;
        let instance = runner
            .instantiate(&binary.bytes, &self.manifest.imports)
            .map_err(|e| BootstrapError::Instantiation(e.to_string()))?;

        let handle = ModuleHandle {
            source: binary.source,
            wasm_hash,
            exports: instance.exports().to_vec(),
        };
        self.instance = Some(instance);
        self.module = Some(handle.clone());
        Ok(handle)
    }

    /// 固定のエントリポイント `app` を呼び出す。
    pub fn app(&mut self) -> Result<(), BootstrapError> {
        self.call(ENTRY_POINT)
    }

    /// 引数・戻り値なしのエクスポート関数を呼び出す。
    pub fn call(&mut self, export: &str) -> Result<(), BootstrapError> {
        let instance = self.instance.as_mut().ok_or_else(|| {
            BootstrapError::EntryPoint(format!(
                "{export} を呼び出せません: まだインスタンス化されていません"
            ))
        })?;
        instance
            .call(export)
            .map_err(|e| BootstrapError::EntryPoint(e.to_string()))
    }
}
