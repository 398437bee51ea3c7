//! # メモリ ローダー
//!
//! グルーテキストとバイナリを事前にバッファとして受け取り、
//! 取得処理なしで返す。位置ごとの取得回数を記録する。

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;

use super::{Resource, ResourceLoader};

/// 事前に登録されたバッファを返すローダー。
#[derive(Default)]
pub struct MemoryLoader {
    resources: HashMap<String, Vec<u8>>,
    /// 位置ごとの取得回数（存在しない位置への取得も数える）
    fetches: Mutex<HashMap<String, usize>>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// リソースを登録する（ビルダー形式）。
    pub fn with(mut self, location: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(location, bytes);
        self
    }

    /// リソースを登録する。同じ位置は上書きする。
    pub fn insert(&mut self, location: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.resources.insert(location.into(), bytes.into());
    }

    /// `location` が取得された回数。
    pub fn fetch_count(&self, location: &str) -> usize {
        self.fetches
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(location)
            .copied()
            .unwrap_or(0)
    }

    /// 全位置の取得回数の合計。
    pub fn total_fetches(&self) -> usize {
        self.fetches
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .sum()
    }
}

impl ResourceLoader for MemoryLoader {
    fn load<'a>(
        &'a self,
        location: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Resource, String>> + Send + 'a>> {
        Box::pin(async move {
            *self
                .fetches
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .entry(location.to_string())
                .or_insert(0) += 1;

            let bytes = self
                .resources
                .get(location)
                .cloned()
                .ok_or_else(|| format!("リソースが存在しません: {location}"))?;
            Ok(Resource {
                source: format!("memory://{location}"),
                bytes,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_loader_counts_fetches() {
        let loader = MemoryLoader::new().with("./pkg/a.json", b"{}".to_vec());

        let resource = loader.load("./pkg/a.json").await.unwrap();
        assert_eq!(resource.bytes, b"{}");
        assert_eq!(resource.source, "memory://./pkg/a.json");
        loader.load("./pkg/a.json").await.unwrap();

        assert!(loader.load("./pkg/b.json").await.is_err());

        assert_eq!(loader.fetch_count("./pkg/a.json"), 2);
        assert_eq!(loader.fetch_count("./pkg/b.json"), 1);
        assert_eq!(loader.fetch_count("./pkg/c.json"), 0);
        assert_eq!(loader.total_fetches(), 3);
    }

    #[tokio::test]
    async fn test_memory_loader_insert_overwrites() {
        let mut loader = MemoryLoader::new().with("x", b"old".to_vec());
        loader.insert("x", b"new".to_vec());
        assert_eq!(loader.load("x").await.unwrap().bytes, b"new");
    }
}
