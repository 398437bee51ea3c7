//! # リソース配置規約
//!
//! モジュール名から2つのリソース位置を組み立てる。
//! - グルーテキスト: `<base>/<pkg_dir>/<name>.json`
//! - バイナリ: `<base>/<pkg_dir>/<name>_bg.wasm`

use pkgboot_types::ModuleLocations;

/// デフォルトのベースパス
pub const DEFAULT_BASE: &str = ".";

/// デフォルトのパッケージディレクトリ
pub const DEFAULT_PKG_DIR: &str = "pkg";

/// リソース配置規約。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceLayout {
    base: String,
    pkg_dir: String,
}

impl ResourceLayout {
    /// 新しいResourceLayoutを作成する。
    ///
    /// # 引数
    /// - `base`: ベースパスまたはベースURL（末尾の `/` は取り除く、空なら `.`）
    pub fn new(base: impl Into<String>) -> Self {
        let base: String = base.into();
        let base = if base.is_empty() {
            DEFAULT_BASE.to_string()
        } else {
            // "/" は空文字列になり、prefix() でルートを表す
            base.trim_end_matches('/').to_string()
        };
        Self {
            base,
            pkg_dir: DEFAULT_PKG_DIR.to_string(),
        }
    }

    /// パッケージディレクトリを差し替える。空文字列ならベース直下に置く。
    pub fn with_pkg_dir(mut self, pkg_dir: impl Into<String>) -> Self {
        self.pkg_dir = pkg_dir.into().trim_matches('/').to_string();
        self
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// グルーテキストの位置。
    pub fn glue_location(&self, name: &str) -> String {
        format!("{}{name}.json", self.prefix())
    }

    /// バイナリの位置。
    pub fn binary_location(&self, name: &str) -> String {
        format!("{}{name}_bg.wasm", self.prefix())
    }

    pub fn locations(&self, name: &str) -> ModuleLocations {
        ModuleLocations {
            glue: self.glue_location(name),
            binary: self.binary_location(name),
        }
    }

    fn prefix(&self) -> String {
        if self.pkg_dir.is_empty() {
            format!("{}/", self.base)
        } else {
            format!("{}/{}/", self.base, self.pkg_dir)
        }
    }
}

impl Default for ResourceLayout {
    fn default() -> Self {
        Self::new(DEFAULT_BASE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let layout = ResourceLayout::default();
        assert_eq!(layout.glue_location("demo"), "./pkg/demo.json");
        assert_eq!(layout.binary_location("demo"), "./pkg/demo_bg.wasm");
    }

    #[test]
    fn test_url_base_trailing_slash() {
        let layout = ResourceLayout::new("https://cdn.example.com/apps/");
        assert_eq!(
            layout.glue_location("demo"),
            "https://cdn.example.com/apps/pkg/demo.json"
        );
        assert_eq!(
            layout.binary_location("demo"),
            "https://cdn.example.com/apps/pkg/demo_bg.wasm"
        );
    }

    #[test]
    fn test_root_base() {
        let layout = ResourceLayout::new("/");
        assert_eq!(layout.glue_location("demo"), "/pkg/demo.json");
    }

    #[test]
    fn test_empty_base_is_current_dir() {
        let layout = ResourceLayout::new("");
        assert_eq!(layout.base(), ".");
        assert_eq!(layout.glue_location("demo"), "./pkg/demo.json");
    }

    #[test]
    fn test_empty_pkg_dir() {
        let layout = ResourceLayout::new("/srv/www").with_pkg_dir("");
        assert_eq!(layout.glue_location("demo"), "/srv/www/demo.json");
        assert_eq!(layout.binary_location("demo"), "/srv/www/demo_bg.wasm");
    }

    #[test]
    fn test_locations() {
        let locations = ResourceLayout::new("/srv").with_pkg_dir("/dist/").locations("app");
        assert_eq!(locations.glue, "/srv/dist/app.json");
        assert_eq!(locations.binary, "/srv/dist/app_bg.wasm");
    }
}
