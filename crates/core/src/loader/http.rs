//! # HTTP ローダー
//!
//! リソース位置をURLとしてGETで取得する。
//! タイムアウトはこのローダーで設定する。

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use super::{Resource, ResourceLoader};

/// デフォルトのリクエストタイムアウト（秒）
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// URL経由でリソースを取得するローダー。
pub struct HttpLoader {
    client: reqwest::Client,
}

impl HttpLoader {
    /// 新しいHttpLoaderを作成する。
    ///
    /// # 引数
    /// - `timeout`: 1リクエストあたりのタイムアウト
    pub fn new(timeout: Duration) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| format!("HTTPクライアントの構築に失敗: {e}"))?;
        Ok(Self { client })
    }
}

impl ResourceLoader for HttpLoader {
    fn load<'a>(
        &'a self,
        location: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Resource, String>> + Send + 'a>> {
        Box::pin(async move {
            let response = self
                .client
                .get(location)
                .send()
                .await
                .map_err(|e| format!("HTTP取得に失敗 ({location}): {e}"))?;
            let status = response.status();
            if status != reqwest::StatusCode::OK {
                return Err(format!(
                    "HTTPエラー: ステータス {} ({location})",
                    status.as_u16()
                ));
            }
            let body = response
                .bytes()
                .await
                .map_err(|e| format!("レスポンスボディの読み取りに失敗 ({location}): {e}"))?;
            if body.is_empty() {
                return Err(format!("空のレスポンス ({location})"));
            }
            Ok(Resource {
                source: location.to_string(),
                bytes: body.to_vec(),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::start_mock_storage;

    fn loader() -> HttpLoader {
        HttpLoader::new(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_http_loader_ok() {
        let port = start_mock_storage(vec![("/pkg/a.json", b"{\"x\":1}".to_vec())]).await;
        let url = format!("http://127.0.0.1:{port}/pkg/a.json");

        let resource = loader().load(&url).await.unwrap();
        assert_eq!(resource.bytes, b"{\"x\":1}");
        assert_eq!(resource.source, url);
    }

    #[tokio::test]
    async fn test_http_loader_not_found() {
        let port = start_mock_storage(vec![("/pkg/a.json", b"{}".to_vec())]).await;
        let url = format!("http://127.0.0.1:{port}/pkg/missing.json");

        match loader().load(&url).await {
            Err(msg) => assert!(msg.contains("404")),
            Ok(_) => panic!("404が成功扱いになりました"),
        }
    }

    #[tokio::test]
    async fn test_http_loader_empty_body() {
        let port = start_mock_storage(vec![("/pkg/empty.json", Vec::new())]).await;
        let url = format!("http://127.0.0.1:{port}/pkg/empty.json");

        match loader().load(&url).await {
            Err(msg) => assert!(msg.contains("空のレスポンス")),
            Ok(_) => panic!("空のレスポンスが成功扱いになりました"),
        }
    }

    #[tokio::test]
    async fn test_http_loader_connection_refused() {
        // ポート1には通常何も待ち受けていない
        let result = loader().load("http://127.0.0.1:1/pkg/a.json").await;
        assert!(result.is_err());
    }
}
