//! # ファイルシステム ローダー
//!
//! リソース位置をローカルパスとして読み込む。
//! 開発・テスト環境用。

use std::future::Future;
use std::pin::Pin;

use super::{Resource, ResourceLoader};

/// ローカルファイルシステムからリソースを読み込むローダー。
#[derive(Debug, Default, Clone, Copy)]
pub struct FileLoader;

impl FileLoader {
    pub fn new() -> Self {
        Self
    }
}

impl ResourceLoader for FileLoader {
    fn load<'a>(
        &'a self,
        location: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Resource, String>> + Send + 'a>> {
        Box::pin(async move {
            let bytes = tokio::fs::read(location)
                .await
                .map_err(|e| format!("ファイルの読み込みに失敗 ({location}): {e}"))?;
            Ok(Resource {
                source: format!("file://{location}"),
                bytes,
            })
        })
    }
}
