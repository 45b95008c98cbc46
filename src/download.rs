use std::path::{Path, PathBuf};

use futures::StreamExt;
use reqwest::Client;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};

use crate::error::Error;
use crate::progress::DownloadBarHelper;

/// Write granularity for streaming the archive to disk.
const WRITE_BUFFER_SIZE: usize = 64 * 1024;

/// Local path and byte count of one completed download.
#[derive(Debug, PartialEq)]
pub struct DownloadResult {
    pub path: PathBuf,
    pub bytes_written: u64,
}

/// Streams the archive at `url` to `path` chunk by chunk, overwriting any
/// existing file. The payload is never held in memory as a whole; exports of
/// large workspaces can be far bigger than a comfortable allocation. When the
/// response declares a `Content-Length`, receiving fewer bytes than declared
/// is an error.
pub async fn download(client: &Client, url: &str, path: &Path) -> Result<DownloadResult, Error> {
    let response = client.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::DownloadError(format!(
            "Something went wrong downloading the export at {url}. Status code: {status}. Body: {body}",
            body = response.text().await?
        )));
    }

    let total_bytes = response.content_length();
    let progress = DownloadBarHelper::create(total_bytes);

    let mut out = BufWriter::with_capacity(WRITE_BUFFER_SIZE, File::create(path).await?);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|error| {
            Error::DownloadError(format!(
                "Download stream of {url} failed after {bytes_written} bytes: {error}"
            ))
        })?;
        out.write_all(&chunk).await?;
        bytes_written += chunk.len() as u64;
        progress.set_position(bytes_written);
    }

    out.flush().await?;

    if let Some(total) = total_bytes {
        if bytes_written != total {
            progress.abandon();
            return Err(Error::DownloadError(format!(
                "Download of {url} was truncated: received {bytes_written} of {total} declared bytes."
            )));
        }
    }

    progress.finish_with_message(format!("Downloaded {path}", path = path.display()));

    Ok(DownloadResult { path: path.to_path_buf(), bytes_written })
}

#[cfg(test)]
mod tests {
    use mockito::{mock, server_url};
    use reqwest::Client;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use crate::download::download;
    use crate::error::Error;

    fn archive_bytes(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    /// Serves exactly one response over a raw socket so the declared
    /// content length and the delivered body can disagree.
    async fn serve_once(header: String, body: Vec<u8>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await;
            socket.write_all(header.as_bytes()).await.unwrap();
            socket.write_all(&body).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        format!("http://{addr}/archive.zip")
    }

    #[tokio::test]
    async fn given_archive_body_when_downloaded_then_file_matches_byte_for_byte() {
        // Given
        let body = archive_bytes(130_000);
        let _m = mock("GET", "/archive-roundtrip.zip").with_status(200).with_body(body.clone()).create();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Export.zip");

        // When
        let result = download(&Client::new(), &format!("{}/archive-roundtrip.zip", server_url()), &path)
            .await
            .unwrap();

        // Then
        assert_eq!(result.bytes_written, 130_000);
        assert_eq!(std::fs::read(&path).unwrap(), body);
    }

    #[tokio::test]
    async fn given_non_success_status_when_downloaded_then_download_error() {
        // Given
        let _m = mock("GET", "/archive-gone.zip").with_status(404).with_body("gone").create();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Export.zip");

        // When
        let error = download(&Client::new(), &format!("{}/archive-gone.zip", server_url()), &path)
            .await
            .unwrap_err();

        // Then
        assert!(matches!(error, Error::DownloadError(_)));
    }

    #[tokio::test]
    async fn given_stream_shorter_than_declared_length_when_downloaded_then_download_error() {
        // Given
        let header =
            String::from("HTTP/1.1 200 OK\r\ncontent-length: 130000\r\nconnection: close\r\n\r\n");
        let url = serve_once(header, archive_bytes(100_000)).await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Export.zip");

        // When
        let error = download(&Client::new(), &url, &path).await.unwrap_err();

        // Then
        assert!(matches!(error, Error::DownloadError(_)));
    }

    #[tokio::test]
    async fn given_no_declared_length_when_downloaded_then_bytes_so_far_are_kept() {
        // Given
        let header = String::from("HTTP/1.1 200 OK\r\nconnection: close\r\n\r\n");
        let body = archive_bytes(1_000);
        let url = serve_once(header, body.clone()).await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Export.zip");

        // When
        let result = download(&Client::new(), &url, &path).await.unwrap();

        // Then
        assert_eq!(result.bytes_written, 1_000);
        assert_eq!(std::fs::read(&path).unwrap(), body);
    }
}
