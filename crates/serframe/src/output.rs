use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use serframe_frame::Frame;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct FrameOutput<'a> {
    port: &'a str,
    size: usize,
    hex: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    timestamp: String,
}

impl<'a> FrameOutput<'a> {
    fn new(frame: &'a Frame, port: &'a str) -> Self {
        Self {
            port,
            size: frame.len(),
            hex: frame.to_hex(),
            text: std::str::from_utf8(frame.as_bytes()).ok(),
            timestamp: now_unix_seconds(),
        }
    }
}

pub fn print_frame(frame: &Frame, port: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!("{}", frame_json(frame, port));
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["PORT", "SIZE", "HEX", "TEXT"])
                .add_row(vec![
                    port.to_string(),
                    frame.len().to_string(),
                    frame.to_hex(),
                    text_preview(frame.as_bytes()),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "port={} size={} hex={} text={}",
                port,
                frame.len(),
                frame.to_hex(),
                text_preview(frame.as_bytes())
            );
        }
        OutputFormat::Raw => {
            print_raw(frame.as_bytes());
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn frame_json(frame: &Frame, port: &str) -> String {
    serde_json::to_string(&FrameOutput::new(frame, port)).unwrap_or_else(|_| "{}".to_string())
}

fn text_preview(payload: &[u8]) -> String {
    match std::str::from_utf8(payload) {
        Ok(text) => text.escape_debug().to_string(),
        Err(_) => format!("<binary {} bytes>", payload.len()),
    }
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
