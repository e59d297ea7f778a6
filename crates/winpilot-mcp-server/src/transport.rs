//! Newline-delimited stdio transport
//!
//! Lines are handled strictly one at a time: a request is fully answered,
//! including any sleep inside a tool, before the next line is read.

use crate::engine::ProtocolEngine;
use crate::platform::Desktop;
use tokio::io::{AsyncBufRead, AsyncWrite};
use winpilot_mcp_protocol::{ProtocolError, decode_line, read_line, write_message};

/// Serve requests from `reader` until EOF, writing responses to `writer`
pub async fn serve<D, R, W>(
    engine: &ProtocolEngine<D>,
    reader: &mut R,
    writer: &mut W,
) -> Result<(), ProtocolError>
where
    D: Desktop,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut line = Vec::new();

    while read_line(reader, &mut line).await? {
        let Some(message) = decode_line(&line) else {
            tracing::debug!("Dropping undecodable line ({} bytes)", line.len());
            continue;
        };

        if let Some(response) = engine.handle(message).await {
            write_message(writer, &response).await?;
        }
    }

    tracing::debug!("Input closed");
    Ok(())
}
