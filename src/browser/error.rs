//! Browser control error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error(
        "Chrome/Chromium not found. Please install it:\n\
         - Arch/Manjaro: sudo pacman -S chromium\n\
         - Ubuntu/Debian: sudo apt install chromium-browser\n\
         - Fedora: sudo dnf install chromium\n\
         - Or set browser.chrome_path in the config file"
    )]
    ChromeNotFound,
    #[error("Browser support not compiled. Rebuild with: cargo build --features browser")]
    NotCompiled,
    #[error("Failed to launch browser: {0}")]
    Launch(String),
    #[error("Failed to connect to remote browser: {0}")]
    Remote(String),
    #[error("Navigation timeout of {0} ms exceeded")]
    NavigationTimeout(u128),
    #[error("{0}")]
    Navigation(String),
    #[error("Page is closed")]
    PageClosed,
    #[error("Browser protocol error: {0}")]
    Protocol(String),
}

#[cfg(feature = "browser")]
impl From<chromiumoxide::error::CdpError> for BrowserError {
    fn from(e: chromiumoxide::error::CdpError) -> Self {
        BrowserError::Protocol(e.to_string())
    }
}
