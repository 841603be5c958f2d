use crate::error::Result;
use crate::relay::hub::Hub;
use log::{debug, info};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Broadcast every non-empty line from `reader` to all connected clients
///
/// Runs until the reader is exhausted and returns the number of lines sent.
pub async fn pump_lines<R>(reader: R, hub: &Hub) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut sent = 0;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        debug!("Broadcasting console input");
        let delivered = hub.broadcast(line);
        info!("Broadcast prompt to {} client(s)", delivered);
        sent += 1;
    }

    Ok(sent)
}
