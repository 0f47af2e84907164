use std::fmt;
use std::io::Cursor;
use std::path::Path;

use bytes::{Bytes, BytesMut};
use deposit_logging::deposit_debug;
use futures_util::StreamExt;
use md5::{Digest, Md5};
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE, EXPECT};
use reqwest::Method;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::io::ReaderStream;
use url::Url;

use crate::{AuthenticatedClient, DepositError, RawResponse};

/// Packaging identifier for zipped BagIt bags.
pub const BAGIT_PACKAGING: &str = "http://purl.org/net/sword/package/BagIt";

const MAX_PREALLOCATION: u64 = 8 * 1024 * 1024;

/// A finished package: a byte stream of declared length, read once.
pub struct PackagedPayload {
    reader: Box<dyn AsyncRead + Send + Unpin>,
    length: u64,
    mime_type: String,
    filename: String,
}

impl PackagedPayload {
    pub fn new(
        reader: impl AsyncRead + Send + Unpin + 'static,
        length: u64,
        mime_type: impl Into<String>,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            reader: Box::new(reader),
            length,
            mime_type: mime_type.into(),
            filename: filename.into(),
        }
    }

    pub fn from_bytes(
        bytes: impl Into<Vec<u8>>,
        mime_type: impl Into<String>,
        filename: impl Into<String>,
    ) -> Self {
        let bytes = bytes.into();
        let length = bytes.len() as u64;
        Self::new(Cursor::new(bytes), length, mime_type, filename)
    }

    pub async fn from_file(
        path: &Path,
        mime_type: impl Into<String>,
        filename: impl Into<String>,
    ) -> Result<Self, DepositError> {
        let file = tokio::fs::File::open(path)
            .await
            .map_err(DepositError::PayloadRead)?;
        let length = file
            .metadata()
            .await
            .map_err(DepositError::PayloadRead)?
            .len();
        Ok(Self::new(file, length, mime_type, filename))
    }

    pub fn length(&self) -> u64 {
        self.length
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Reads exactly `length` bytes, hashing each chunk as it arrives.
    pub(crate) async fn read_digested(self, chunk_size: usize) -> Result<DigestedBody, DepositError> {
        let declared = self.length;
        let limited = self.reader.take(declared);
        let mut stream = ReaderStream::with_capacity(limited, chunk_size.max(1));
        let mut hasher = Md5::new();
        let mut buffer = BytesMut::with_capacity(declared.min(MAX_PREALLOCATION) as usize);

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(DepositError::PayloadRead)?;
            hasher.update(&chunk);
            buffer.extend_from_slice(&chunk);
        }

        let read = buffer.len() as u64;
        if read != declared {
            return Err(DepositError::PayloadTruncated { declared, read });
        }

        Ok(DigestedBody {
            bytes: buffer.freeze(),
            md5_hex: hex::encode(hasher.finalize()),
        })
    }
}

impl fmt::Debug for PackagedPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PackagedPayload")
            .field("length", &self.length)
            .field("mime_type", &self.mime_type)
            .field("filename", &self.filename)
            .finish_non_exhaustive()
    }
}

pub(crate) struct DigestedBody {
    pub(crate) bytes: Bytes,
    pub(crate) md5_hex: String,
}

#[derive(Debug, Clone)]
pub struct UploadSettings {
    pub packaging: String,
    /// Sends `Expect: 100-continue`. Some endpoints reject large TLS bodies without it.
    pub expect_continue: bool,
    pub chunk_size: usize,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            packaging: BAGIT_PACKAGING.to_string(),
            expect_continue: true,
            chunk_size: 64 * 1024,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResponse {
    pub response: RawResponse,
    /// Hex MD5 sent in `Content-MD5`.
    pub content_md5: String,
    pub bytes_sent: u64,
}

/// Sends a package with its digest and SWORD headers. The response is not interpreted.
pub struct DigestingUploader<'a> {
    client: &'a AuthenticatedClient,
    settings: &'a UploadSettings,
}

impl<'a> DigestingUploader<'a> {
    pub fn new(client: &'a AuthenticatedClient, settings: &'a UploadSettings) -> Self {
        Self { client, settings }
    }

    /// `method` is POST for an initial deposit; continuations may use PUT or POST
    /// with `in_progress` set while more parts follow.
    pub async fn upload(
        &self,
        payload: PackagedPayload,
        destination: &Url,
        method: Method,
        in_progress: bool,
    ) -> Result<UploadResponse, DepositError> {
        let mime_type = payload.mime_type().to_string();
        let filename = payload.filename().to_string();
        let body = payload.read_digested(self.settings.chunk_size).await?;
        let bytes_sent = body.bytes.len() as u64;
        deposit_debug!(
            "Sending {} bytes to {} ({} {}, MD5 {}, In-Progress {})",
            bytes_sent,
            destination,
            method,
            mime_type,
            body.md5_hex,
            in_progress
        );

        let mut request = self
            .client
            .request(method, destination)
            .header(CONTENT_TYPE, mime_type)
            .header(CONTENT_DISPOSITION, format!("attachment; filename={filename}"))
            .header("Content-MD5", body.md5_hex.as_str())
            .header("Packaging", self.settings.packaging.as_str())
            .header("In-Progress", in_progress.to_string());
        if self.settings.expect_continue {
            request = request.header(EXPECT, "100-continue");
        }

        let response = self.client.send(request.body(body.bytes)).await?;
        Ok(UploadResponse {
            response,
            content_md5: body.md5_hex,
            bytes_sent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn digest_covers_exactly_the_declared_bytes() {
        let payload = PackagedPayload::new(Cursor::new(b"hello world".to_vec()), 5, "text/plain", "x");
        let body = payload.read_digested(2).await.unwrap();
        assert_eq!(&body.bytes[..], b"hello");
        assert_eq!(body.md5_hex, "5d41402abc4b2a76b9719d911017c592");
    }

    #[tokio::test]
    async fn short_stream_is_reported() {
        let payload = PackagedPayload::new(Cursor::new(b"abc".to_vec()), 10, "text/plain", "x");
        let err = payload.read_digested(4).await.err().unwrap();
        assert!(matches!(
            err,
            DepositError::PayloadTruncated {
                declared: 10,
                read: 3
            }
        ));
    }
}
