//! # pkgboot CLI
//!
//! ## サブコマンド
//! - `run <name>`: モジュールをブートストラップし、結果をJSONで出力する
//! - `locate <name>`: グルーテキストとバイナリの位置をJSONで出力する
//!
//! ログはstderrに出力し、stdoutはJSON出力専用とする。

mod config;

use clap::{Parser, Subcommand};
use serde::Serialize;

use pkgboot_core::Bootstrapper;
use pkgboot_types::{ConsoleLine, ModuleHandle};

use crate::config::{BootConfig, SourceArgs};

#[derive(Parser)]
#[command(name = "pkgboot", version, about = "WASMモジュールのブートストラッパー")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// モジュールをブートストラップし、エントリポイント `app` を実行する
    Run {
        /// モジュール名（`pkg/<name>.json` と `pkg/<name>_bg.wasm` を使う）
        name: String,
        #[command(flatten)]
        source: SourceArgs,
    },
    /// モジュール名から組み立てたリソース位置を表示する
    Locate {
        name: String,
        #[command(flatten)]
        source: SourceArgs,
    },
}

/// `run` の出力。
#[derive(Serialize)]
struct RunSummary<'a> {
    name: &'a str,
    module: Option<&'a ModuleHandle>,
    console: &'a [ConsoleLine],
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Run { name, source } => run(&name, &source).await,
        Command::Locate { name, source } => {
            let config = BootConfig::from_env(&source)?;
            let locations = config.layout().locations(&name);
            println!("{}", serde_json::to_string_pretty(&locations)?);
            Ok(())
        }
    }
}

async fn run(name: &str, source: &SourceArgs) -> anyhow::Result<()> {
    let config = BootConfig::from_env(source)?;
    tracing::info!(
        base = %config.base,
        fuel = config.limits.fuel,
        memory_bytes = config.limits.memory_bytes,
        "設定を読み込みました"
    );

    let bootstrapper = Bootstrapper::new(config.loader()?, config.layout(), config.limits);
    let bindings = bootstrapper.bootstrap(name).await?;

    let summary = RunSummary {
        name,
        module: bindings.module(),
        console: bindings.console(),
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkgboot_types::ConsoleLevel;

    #[test]
    fn test_run_summary_shape() {
        let module = ModuleHandle {
            source: "file:///srv/www/pkg/demo_bg.wasm".to_string(),
            wasm_hash: "ab".repeat(32),
            exports: vec!["app".to_string()],
        };
        let console = [ConsoleLine {
            level: ConsoleLevel::Info,
            message: "app started".to_string(),
        }];
        let summary = RunSummary {
            name: "demo",
            module: Some(&module),
            console: &console,
        };

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["name"], "demo");
        assert_eq!(json["module"]["source"], "file:///srv/www/pkg/demo_bg.wasm");
        assert_eq!(json["module"]["exports"][0], "app");
        assert_eq!(json["console"][0]["level"], "info");
        assert_eq!(json["console"][0]["message"], "app started");
    }

    #[test]
    fn test_run_summary_without_module() {
        let summary = RunSummary {
            name: "demo",
            module: None,
            console: &[],
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert!(json["module"].is_null());
        assert_eq!(json["console"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_locate_output_shape() {
        let config = BootConfig::resolve(
            &SourceArgs {
                base: Some("https://cdn.example.com/app".to_string()),
                ..SourceArgs::default()
            },
            |_| None,
        )
        .unwrap();
        let json = serde_json::to_value(config.layout().locations("demo")).unwrap();
        assert_eq!(json["glue"], "https://cdn.example.com/app/pkg/demo.json");
        assert_eq!(json["binary"], "https://cdn.example.com/app/pkg/demo_bg.wasm");
    }
}
