//! Payload sources feeding the decoder.
//!
//! Device discovery and connection handling live outside this crate; a
//! [`FrameSource`] is the seam where that transport hands over one raw buffer
//! per advertisement or notification. The bundled [`StdinSource`] reads one
//! hex-encoded payload per line, which is what BLE sniffers and `btmon`
//! post-processing scripts typically emit.

use crate::error::ScaleError;
use std::future::Future;
use std::pin::Pin;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

/// Channel buffer size for raw payloads.
pub const PAYLOAD_CHANNEL_BUFFER_SIZE: usize = 100;

/// A raw payload, or the reason it could not be obtained.
pub type PayloadResult = Result<Vec<u8>, ScaleError>;

/// Source abstraction to enable deterministic unit tests without Bluetooth hardware.
pub trait FrameSource: Send + Sync {
    fn start(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<mpsc::Receiver<PayloadResult>, ScaleError>> + Send + '_>>;
}

/// Reads hex payloads from standard input, one per line, until EOF.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinSource;

impl FrameSource for StdinSource {
    fn start(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<mpsc::Receiver<PayloadResult>, ScaleError>> + Send + '_>>
    {
        Box::pin(async move { Ok(spawn_line_reader(BufReader::new(tokio::io::stdin()))) })
    }
}

/// Parse a hex payload, tolerating `0x` prefixes and `:`/`-`/whitespace separators.
///
/// Each separated token may carry its own prefix, so sniffer output such as
/// `0x1D 0x02 0x80` parses the same as `1D0280`.
///
/// # Example
/// ```
/// use bodyscale_listener::source::parse_hex_payload;
///
/// assert_eq!(parse_hex_payload("0x1D02:80").unwrap(), vec![0x1D, 0x02, 0x80]);
/// assert_eq!(parse_hex_payload("0x1d 0x02 0x80").unwrap(), vec![0x1D, 0x02, 0x80]);
/// assert!(parse_hex_payload("1d0").is_err());
/// ```
pub fn parse_hex_payload(src: &str) -> PayloadResult {
    let src = src.trim();
    let digits: String = src
        .split(|c: char| c.is_whitespace() || c == ':' || c == '-')
        .map(|token| {
            token
                .strip_prefix("0x")
                .or_else(|| token.strip_prefix("0X"))
                .unwrap_or(token)
        })
        .collect();

    hex::decode(&digits).map_err(|e| ScaleError::Input(format!("invalid hex payload '{src}': {e}")))
}

/// Spawn a task forwarding every payload line of `reader` into a channel.
///
/// Blank lines and `#` comments are skipped. A line that is not valid UTF-8
/// is forwarded as an `Input` error and reading continues. The channel closes
/// at EOF or after an I/O error, which is forwarded first.
pub fn spawn_line_reader<R>(mut reader: R) -> mpsc::Receiver<PayloadResult>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel(PAYLOAD_CHANNEL_BUFFER_SIZE);

    tokio::spawn(async move {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            let payload = match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => match std::str::from_utf8(&buf) {
                    Ok(line) => {
                        let line = line.trim();
                        if line.is_empty() || line.starts_with('#') {
                            continue;
                        }
                        parse_hex_payload(line)
                    }
                    Err(e) => Err(ScaleError::Input(format!("input line is not UTF-8: {e}"))),
                },
                Err(e) => {
                    let _ = tx
                        .send(Err(ScaleError::Input(format!("failed to read input: {e}"))))
                        .await;
                    break;
                }
            };

            if tx.send(payload).await.is_err() {
                tracing::debug!("payload receiver dropped, stopping reader");
                break;
            }
        }
    });

    rx
}
