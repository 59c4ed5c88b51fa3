use std::env;

pub enum Environment {
    Development,
    Production,
}

/// ENV 環境変数から実行環境を判定する。未設定の場合はビルドプロファイルに従う。
pub fn which() -> Environment {
    #[cfg(debug_assertions)]
    let default_env = "development";
    #[cfg(not(debug_assertions))]
    let default_env = "production";

    match env::var("ENV").unwrap_or_else(|_| default_env.into()).as_str() {
        "production" => Environment::Production,
        _ => Environment::Development,
    }
}
