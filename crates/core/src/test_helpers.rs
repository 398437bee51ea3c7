//! # テスト用共通ヘルパー
//!
//! loader, bindings, bootstrapテストで共有するモックサーバーとゲストモジュール。

/// `app` と `greet` をエクスポートし、それぞれ1行ずつ出力するゲスト。
pub const LOGGING_APP_WAT: &str = r#"
    (module
      (import "env" "console_log" (func $log (param i32 i32)))
      (memory (export "memory") 1)
      (data (i32.const 0) "hello")
      (data (i32.const 16) "app started")
      (func (export "greet") i32.const 0 i32.const 5 call $log)
      (func (export "app") i32.const 16 i32.const 11 call $log))
"#;

/// LOGGING_APP_WAT 用のグルーマニフェスト。
pub const LOGGING_APP_GLUE: &str = r#"{
    "global": "wasm_bindgen",
    "imports": [{ "module": "env", "name": "console_log", "host": "console_log" }]
}"#;

/// `app` をエクスポートしないゲスト。
pub const NO_APP_WAT: &str = r#"(module (func (export "main")))"#;

/// `app` が無限ループするゲスト。
pub const LOOPING_APP_WAT: &str = r#"(module (func (export "app") (loop $l (br $l))))"#;

pub fn logging_app_wasm() -> Vec<u8> {
    wat::parse_str(LOGGING_APP_WAT).unwrap()
}

/// テスト用モックHTTPサーバーを起動し、指定パスで指定データを返す。
/// 登録していないパスは404を返す。
pub async fn start_mock_storage(routes: Vec<(&str, Vec<u8>)>) -> u16 {
    use axum::routing::get;

    let mut app = axum::Router::new();
    for (path, data) in routes {
        app = app.route(
            path,
            get(move || {
                let d = data.clone();
                async move { d }
            }),
        );
    }

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    port
}
