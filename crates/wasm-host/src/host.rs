//! # ホスト関数とストア状態
//!
//! グルーマニフェストの `imports` に従い、バイナリのインポートへ
//! ホスト関数を割り当てる。
//!
//! ## ホスト関数
//! - `console_log(ptr, len)`: ゲストメモリの文字列をinfo行として記録
//! - `console_error(ptr, len)`: ゲストメモリの文字列をerror行として記録
//! - `now_ms() -> f64`: UNIXエポックからのミリ秒
//! - `throw(ptr, len)`: 指定メッセージで呼び出しを中断

use std::time::{SystemTime, UNIX_EPOCH};

use pkgboot_types::{ConsoleLevel, ConsoleLine, HostFunction, ImportBinding, MEMORY_EXPORT};
use wasmtime::{Caller, Linker, Module, ResourceLimiter};

use crate::WasmError;

/// ホスト関数がアクセスするストアの状態。
/// インスタンスごとに生成され、呼び出し間で共有されない。
pub(crate) struct HostState {
    /// ゲストが出力したコンソール行（出力順）
    pub(crate) console: Vec<ConsoleLine>,
    /// 線形メモリの上限管理
    pub(crate) limiter: MemoryLimiter,
}

impl HostState {
    pub(crate) fn new(memory_limit: usize) -> Self {
        Self {
            console: Vec::new(),
            limiter: MemoryLimiter::new(memory_limit),
        }
    }
}

/// 線形メモリの拡張を上限で拒否するリミッタ。
/// 拒否した事実を記録し、エラー分類に使う。
pub(crate) struct MemoryLimiter {
    memory_limit: usize,
    exceeded: bool,
}

impl MemoryLimiter {
    fn new(memory_limit: usize) -> Self {
        Self {
            memory_limit,
            exceeded: false,
        }
    }

    /// 前回のリセット以降、上限超過で拡張を拒否したか。
    pub(crate) fn exceeded(&self) -> bool {
        self.exceeded
    }

    pub(crate) fn reset(&mut self) {
        self.exceeded = false;
    }
}

impl ResourceLimiter for MemoryLimiter {
    fn memory_growing(
        &mut self,
        _current: usize,
        desired: usize,
        _maximum: Option<usize>,
    ) -> wasmtime::Result<bool> {
        if desired > self.memory_limit {
            self.exceeded = true;
            return Ok(false);
        }
        Ok(true)
    }

    fn table_growing(
        &mut self,
        _current: usize,
        _desired: usize,
        _maximum: Option<usize>,
    ) -> wasmtime::Result<bool> {
        Ok(true)
    }
}

/// `throw` ホスト関数が送出するエラー。
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub(crate) struct Thrown(pub String);

/// ホスト関数の引数不正（範囲外ポインタ、UTF-8不正等）。
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub(crate) struct HostCallError(pub String);

/// バイナリの全インポートがマニフェストで解決されることを確認し、
/// ホスト関数をリンカに登録する。
pub(crate) fn link_imports(
    linker: &mut Linker<HostState>,
    module: &Module,
    imports: &[ImportBinding],
) -> Result<(), WasmError> {
    for import in module.imports() {
        let bound = imports
            .iter()
            .any(|b| b.module == import.module() && b.name == import.name());
        if !bound {
            return Err(WasmError::LinkError(format!(
                "未解決のインポート: {}.{}",
                import.module(),
                import.name()
            )));
        }
    }

    for binding in imports {
        define(linker, binding).map_err(|e| {
            WasmError::LinkError(format!(
                "{}.{} への {} の登録に失敗: {e}",
                binding.module, binding.name, binding.host
            ))
        })?;
    }
    Ok(())
}

fn define(linker: &mut Linker<HostState>, binding: &ImportBinding) -> wasmtime::Result<()> {
    let module = binding.module.as_str();
    let name = binding.name.as_str();
    match binding.host {
        HostFunction::ConsoleLog => {
            linker.func_wrap(
                module,
                name,
                |mut caller: Caller<'_, HostState>, ptr: i32, len: i32| {
                    record(&mut caller, ConsoleLevel::Info, ptr, len)
                },
            )?;
        }
        HostFunction::ConsoleError => {
            linker.func_wrap(
                module,
                name,
                |mut caller: Caller<'_, HostState>, ptr: i32, len: i32| {
                    record(&mut caller, ConsoleLevel::Error, ptr, len)
                },
            )?;
        }
        HostFunction::NowMs => {
            linker.func_wrap(module, name, || -> f64 {
                SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.as_secs_f64() * 1000.0)
                    .unwrap_or(0.0)
            })?;
        }
        HostFunction::Throw => {
            linker.func_wrap(
                module,
                name,
                |mut caller: Caller<'_, HostState>, ptr: i32, len: i32| -> wasmtime::Result<()> {
                    let message = read_guest_str(&mut caller, ptr, len)?;
                    Err(wasmtime::Error::new(Thrown(message)))
                },
            )?;
        }
    }
    Ok(())
}

fn record(
    caller: &mut Caller<'_, HostState>,
    level: ConsoleLevel,
    ptr: i32,
    len: i32,
) -> wasmtime::Result<()> {
    let message = read_guest_str(caller, ptr, len)?;
    match level {
        ConsoleLevel::Info => tracing::info!(target: "pkgboot::guest", "{message}"),
        ConsoleLevel::Error => tracing::error!(target: "pkgboot::guest", "{message}"),
    }
    caller.data_mut().console.push(ConsoleLine { level, message });
    Ok(())
}

/// ゲストメモリ `[ptr, ptr+len)` をUTF-8文字列として読み取る。
fn read_guest_str(
    caller: &mut Caller<'_, HostState>,
    ptr: i32,
    len: i32,
) -> wasmtime::Result<String> {
    let memory = caller
        .get_export(MEMORY_EXPORT)
        .and_then(|e| e.into_memory())
        .ok_or_else(|| {
            wasmtime::Error::new(HostCallError(format!(
                "ゲストが {MEMORY_EXPORT} をエクスポートしていません"
            )))
        })?;

    let out_of_bounds = || {
        wasmtime::Error::new(HostCallError(format!(
            "ゲストメモリの範囲外アクセス (ptr={ptr}, len={len})"
        )))
    };
    let start = usize::try_from(ptr).map_err(|_| out_of_bounds())?;
    let len = usize::try_from(len).map_err(|_| out_of_bounds())?;

    let data = memory.data(&*caller);
    let bytes = start
        .checked_add(len)
        .and_then(|end| data.get(start..end))
        .ok_or_else(out_of_bounds)?;

    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| wasmtime::Error::new(HostCallError(format!("UTF-8として不正な文字列: {e}"))))
}
