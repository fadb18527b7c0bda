//! HTTP probing and container sniffing

use bytes::{Bytes, BytesMut};
use reqwest::header::{CONTENT_TYPE, RANGE};
use reqwest::Client;
use thiserror::Error;

/// MPEG-TS packet size
const TS_PACKET_SIZE: usize = 188;
const TS_SYNC_BYTE: u8 = 0x47;
const EBML_MAGIC: [u8; 4] = [0x1A, 0x45, 0xDF, 0xA3];
const ISO_BMFF_BOXES: [&[u8; 4]; 5] = [b"ftyp", b"moov", b"mdat", b"free", b"wide"];
/// Largest playlist body accepted
pub const MAX_TEXT_BYTES: usize = 1 << 20;

/// Container guessed from leading bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    /// MP4 / MOV (ISO base media)
    IsoBmff,
    /// MKV / WebM
    Matroska,
    MpegTs,
    Flv,
    /// `#EXTM3U` playlist
    Playlist,
    Unknown,
}

impl Container {
    /// Playable by direct assignment to the surface
    pub fn is_native(&self) -> bool {
        matches!(self, Container::IsoBmff | Container::Matroska)
    }

    /// Demuxable by the segmented-transport backend
    pub fn is_transport(&self) -> bool {
        matches!(self, Container::MpegTs | Container::Flv)
    }
}

pub fn sniff(data: &[u8]) -> Container {
    if data.len() >= 8 && ISO_BMFF_BOXES.iter().any(|b| &data[4..8] == *b) {
        return Container::IsoBmff;
    }
    if data.starts_with(&EBML_MAGIC) {
        return Container::Matroska;
    }
    if data.starts_with(b"FLV") {
        return Container::Flv;
    }
    if data.first() == Some(&TS_SYNC_BYTE)
        && data.get(TS_PACKET_SIZE).map_or(true, |b| *b == TS_SYNC_BYTE)
    {
        return Container::MpegTs;
    }

    let text = data.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(data);
    let start = text.iter().position(|b| !b.is_ascii_whitespace()).unwrap_or(text.len());
    if text[start..].starts_with(b"#EXTM3U") {
        return Container::Playlist;
    }

    Container::Unknown
}

/// Media types the surface can take directly when the bytes are inconclusive
pub fn is_native_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    let streaming = ["video/mp2t", "video/x-flv", "application/vnd.apple.mpegurl", "audio/mpegurl"];
    (mime.starts_with("video/") || mime.starts_with("audio/")) && !streaming.contains(&mime.as_str())
}

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("body exceeds {0} bytes")]
    TooLarge(usize),
}

/// Leading bytes and content type of a resource
#[derive(Debug, Clone)]
pub struct ProbeResult {
    pub content_type: Option<String>,
    pub head: Bytes,
}

impl ProbeResult {
    pub fn container(&self) -> Container {
        sniff(&self.head)
    }
}

/// Fetch up to `limit` leading bytes of `url`
pub async fn fetch_head(client: &Client, url: &str, limit: usize) -> Result<ProbeResult, ProbeError> {
    let mut response = client
        .get(url)
        .header(RANGE, format!("bytes=0-{}", limit.saturating_sub(1)))
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(ProbeError::Status(status.as_u16()));
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let mut head = BytesMut::with_capacity(limit);
    while let Some(chunk) = response.chunk().await? {
        head.extend_from_slice(&chunk);
        if head.len() >= limit {
            break;
        }
    }
    head.truncate(limit);

    Ok(ProbeResult {
        content_type,
        head: head.freeze(),
    })
}

/// Fetch a whole text body (playlists), up to [`MAX_TEXT_BYTES`]
pub async fn fetch_text(client: &Client, url: &str) -> Result<String, ProbeError> {
    fetch_text_capped(client, url, MAX_TEXT_BYTES).await
}

async fn fetch_text_capped(client: &Client, url: &str, limit: usize) -> Result<String, ProbeError> {
    let mut response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(ProbeError::Status(status.as_u16()));
    }
    if response.content_length().is_some_and(|len| len > limit as u64) {
        return Err(ProbeError::TooLarge(limit));
    }

    let mut body = BytesMut::new();
    while let Some(chunk) = response.chunk().await? {
        if body.len() + chunk.len() > limit {
            return Err(ProbeError::TooLarge(limit));
        }
        body.extend_from_slice(&chunk);
    }

    Ok(String::from_utf8_lossy(&body).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::test_server::{Route, TestServer};

    #[test]
    fn test_sniff_iso_bmff() {
        let mp4 = b"\x00\x00\x00\x20ftypisom\x00\x00\x02\x00";
        assert_eq!(sniff(mp4), Container::IsoBmff);
        let mov = b"\x00\x00\x00\x14ftypqt  ";
        assert_eq!(sniff(mov), Container::IsoBmff);
    }

    #[test]
    fn test_sniff_matroska_and_flv() {
        assert_eq!(sniff(&[0x1A, 0x45, 0xDF, 0xA3, 0x9F, 0x42]), Container::Matroska);
        assert_eq!(sniff(b"FLV\x01\x05\x00\x00\x00\x09"), Container::Flv);
    }

    #[test]
    fn test_sniff_transport_stream() {
        let mut ts = vec![0u8; TS_PACKET_SIZE * 2];
        ts[0] = TS_SYNC_BYTE;
        ts[TS_PACKET_SIZE] = TS_SYNC_BYTE;
        assert_eq!(sniff(&ts), Container::MpegTs);

        // Second packet out of sync
        ts[TS_PACKET_SIZE] = 0;
        assert_eq!(sniff(&ts), Container::Unknown);
    }

    #[test]
    fn test_sniff_playlist() {
        assert_eq!(sniff(b"#EXTM3U\n#EXT-X-VERSION:3\n"), Container::Playlist);
        assert_eq!(sniff(b"\xEF\xBB\xBF\n #EXTM3U\n"), Container::Playlist);
        assert_eq!(sniff(b"<html>"), Container::Unknown);
    }

    #[test]
    fn test_native_content_types() {
        assert!(is_native_content_type("video/mp4"));
        assert!(is_native_content_type("Video/WebM; codecs=vp9"));
        assert!(is_native_content_type("audio/ogg"));
        assert!(!is_native_content_type("video/mp2t"));
        assert!(!is_native_content_type("application/vnd.apple.mpegurl"));
        assert!(!is_native_content_type("text/html"));
    }

    #[tokio::test]
    async fn test_fetch_head_truncates_to_limit() {
        let server = TestServer::start(vec![(
            "/clip.mp4",
            Route::ok("video/mp4", b"\x00\x00\x00\x20ftypisom".repeat(64)),
        )])
        .await;

        let probe = fetch_head(&Client::new(), &server.url("/clip.mp4"), 16)
            .await
            .unwrap();
        assert_eq!(probe.head.len(), 16);
        assert_eq!(probe.content_type.as_deref(), Some("video/mp4"));
        assert_eq!(probe.container(), Container::IsoBmff);
    }

    #[tokio::test]
    async fn test_fetch_status_error() {
        let server = TestServer::start(vec![]).await;

        let err = fetch_head(&Client::new(), &server.url("/missing.ts"), 16)
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::Status(404)));

        let err = fetch_text(&Client::new(), &server.url("/missing.m3u8"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::Status(404)));
    }

    #[tokio::test]
    async fn test_fetch_text_rejects_oversized_body() {
        let server = TestServer::start(vec![
            ("/small.m3u8", Route::ok("application/vnd.apple.mpegurl", b"#EXTM3U\n".to_vec())),
            ("/huge.m3u8", Route::ok("application/vnd.apple.mpegurl", vec![b'#'; 4096])),
        ])
        .await;
        let client = Client::new();

        let text = fetch_text_capped(&client, &server.url("/small.m3u8"), 1024)
            .await
            .unwrap();
        assert_eq!(text, "#EXTM3U\n");

        let err = fetch_text_capped(&client, &server.url("/huge.m3u8"), 1024)
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::TooLarge(1024)));
    }
}
