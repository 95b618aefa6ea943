use std::path::PathBuf;

use candlebin::Candlebin;

/// Shared state handed to every handler.
pub struct AppState {
    pub bin: Candlebin,
    /// Directory served under `/data`; must match the artifact store's directory.
    pub data_dir: PathBuf,
}

impl AppState {
    pub fn new(bin: Candlebin, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            bin,
            data_dir: data_dir.into(),
        }
    }
}
