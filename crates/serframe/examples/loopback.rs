//! Frame a fragmented stream from an in-memory link, push and pull style.
//!
//! Run with:
//!   cargo run --example loopback
//!
//! Against real hardware, use the CLI instead:
//!   cargo run --features cli -- listen /dev/ttyUSB0 --terminator "0D 0A"

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use serframe::frame::{DataFormat, ReaderConfig, RetryBudget, Terminator};
use serframe::session::{ChannelEvent, ChannelSession, SessionConfig};
use serframe::transport::MemoryChannel;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let link = MemoryChannel::new("loopback");
    let config = SessionConfig {
        reader: ReaderConfig::new(
            Some(Terminator::from_hex("0D 0A")?),
            RetryBudget::new(20, Duration::from_millis(5))?,
        ),
        data_format: DataFormat::Text,
        ..SessionConfig::default()
    };
    let session = Arc::new(ChannelSession::with_config(link.clone(), config));
    session.open()?;

    // Pull style: a reply split across three chunks.
    link.push_chunk(b"+CSQ: ");
    link.push_chunk(b"21,99");
    link.push_chunk(b"\r\n");
    if let Some(reply) = session.read_string()? {
        eprintln!("pulled {reply:?}");
    }

    // Push style: the watcher raises data notifications.
    session.on_frame(|frame| {
        if let Some(frame) = frame {
            eprintln!("pushed {} ({} bytes)", frame.to_hex(), frame.len());
        }
        Ok(())
    });
    session.on_diagnostic(|err| eprintln!("diagnostic: {err}"));
    session.start_watcher()?;

    link.push_chunk(b"OK\r\n");
    let deadline = Instant::now() + Duration::from_secs(1);
    while link.pending_chunks() > 0 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(10));
    }
    session.stop_watcher();

    // A notification on a dropped link reopens it once.
    link.drop_link();
    link.push_chunk(b"RING\r\n");
    session.notify(ChannelEvent::DataReady);
    eprintln!("link open after notification: {}", session.is_open());

    session.write_hex("41 54 0D")?;
    eprintln!("wrote {:?}", String::from_utf8_lossy(&link.written()));

    session.close()?;
    Ok(())
}
