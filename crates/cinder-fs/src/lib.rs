use std::path::PathBuf;

pub mod fs;
pub mod toml;

/// Types that know where their configuration file lives when no path is given.
pub trait DefaultPathProvider: Sized {
    /// Path relative to the working directory.
    const DEFAULT_FILENAME: &'static str;

    #[must_use]
    fn default_path() -> PathBuf {
        Self::DEFAULT_FILENAME.into()
    }
}
