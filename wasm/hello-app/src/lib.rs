//! # hello-app ゲストモジュール
//!
//! `pkgboot run hello_app --base wasm/hello-app` で実行する最小のアプリ。
//!
//! ## ビルド
//! ```text
//! cargo build --release --target wasm32-unknown-unknown
//! cp target/wasm32-unknown-unknown/release/hello_app.wasm pkg/hello_app_bg.wasm
//! ```
//!
//! ## ホスト関数
//! グルー（`pkg/hello_app.json`）で以下を割り当てる。
//! - `console_log(ptr, len)` / `console_error(ptr, len)`
//! - `now_ms() -> f64`

#![no_std]

#[panic_handler]
fn panic(_info: &core::panic::PanicInfo) -> ! {
    core::arch::wasm32::unreachable()
}

// ---------------------------------------------------------------------------
// ホスト関数宣言
// ---------------------------------------------------------------------------

#[link(wasm_import_module = "env")]
extern "C" {
    fn console_log(ptr: *const u8, len: usize);
    fn console_error(ptr: *const u8, len: usize);
    fn now_ms() -> f64;
}

fn log(message: &str) {
    unsafe { console_log(message.as_ptr(), message.len()) }
}

fn error(message: &str) {
    unsafe { console_error(message.as_ptr(), message.len()) }
}

// ---------------------------------------------------------------------------
// エクスポート関数
// ---------------------------------------------------------------------------

/// エントリポイント。ブートストラップ時に1回だけ呼ばれる。
#[no_mangle]
pub extern "C" fn app() {
    log("hello-app: started");

    if unsafe { now_ms() } <= 0.0 {
        error("hello-app: host clock unavailable");
    }
}

/// 追加のエクスポート。`Bindings::call("greet")` で呼び出せる。
#[no_mangle]
pub extern "C" fn greet() {
    log("hello-app: greetings from the guest");
}
