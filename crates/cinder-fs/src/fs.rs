use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tracing::info;

#[async_trait]
pub trait FileReadExt {
    async fn read_all(self) -> Result<Vec<u8>, tokio::io::Error>;

    /// Reads a secret stored on the first line of a file, such as a password file.
    /// The line terminator is not part of the secret.
    async fn read_secret_line(self) -> Result<String, tokio::io::Error>;
}

#[async_trait]
impl FileReadExt for PathBuf {
    #[tracing::instrument]
    async fn read_all(self) -> Result<Vec<u8>, tokio::io::Error> {
        info!(path = %self.display(), "reading file");

        let mut buf = vec![];
        tokio::fs::File::open(self)
            .await?
            .read_to_end(&mut buf)
            .await?;
        Ok(buf)
    }

    #[tracing::instrument]
    async fn read_secret_line(self) -> Result<String, tokio::io::Error> {
        let contents = String::from_utf8(self.read_all().await?)
            .map_err(|e| tokio::io::Error::new(tokio::io::ErrorKind::InvalidData, e))?;

        let line = contents.lines().next().unwrap_or_default();
        Ok(line.to_string())
    }
}
