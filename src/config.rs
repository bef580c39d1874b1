use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "cppt-review";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Width of the label column in rendered reports ("Tanggal Lahir" + padding)
pub const LABEL_WIDTH: usize = 15;

/// Environment variable naming a JSON physician directory to use instead of the built-in one
pub const DIRECTORY_ENV: &str = "CPPT_REVIEW_DIRECTORY";

/// Default file name for exported review text
pub const DEFAULT_OUTPUT_NAME: &str = "review.txt";

/// Log filter used when `RUST_LOG` is unset
pub fn default_log_filter() -> &'static str {
    "cppt_review_lib=info,warn"
}

/// Physician directory path from the environment, if set and non-empty
pub fn directory_path_from_env() -> Option<PathBuf> {
    std::env::var_os(DIRECTORY_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}
