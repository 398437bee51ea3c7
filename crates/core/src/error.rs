//! # ブートストラップ エラー型
//!
//! ブートストラップの各ステップに対応するエラー分類。
//! いずれもその場で回復せず、呼び出し元へそのまま返す。

/// ブートストラップエラー型。
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// グルーテキストの取得失敗（存在しない、通信失敗）
    #[error("リソースの取得に失敗 ({location}): {reason}")]
    Retrieval { location: String, reason: String },
    /// グルーテキストの評価失敗（不正なマニフェスト、既知のグローバル未定義）
    #[error("グルーの評価に失敗: {0}")]
    Evaluation(String),
    /// バイナリの取得・コンパイル・リンク・インスタンス化の失敗
    #[error("インスタンス化に失敗: {0}")]
    Instantiation(String),
    /// エントリポイントの不在・trap・例外送出
    #[error("エントリポイントの実行に失敗: {0}")]
    EntryPoint(String),
}
