//! Drops expired notification records. Reads a JSON array on stdin, keeps
//! every record created at or after the cutoff, writes the survivors to
//! stdout. Only argument validation affects the exit code: a missing or
//! unparseable cutoff exits 1, everything else (including unreadable input,
//! which yields an empty list) exits 0.

use chrono::{DateTime, FixedOffset};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "notification_cleanup", disable_help_flag = true)]
struct Args {
    /// ISO-8601 cutoff; notifications older than this are dropped.
    cutoff: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct Notification {
    id: String,
    created_at: String,
    #[serde(flatten)]
    rest: serde_json::Map<String, serde_json::Value>,
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(_) => {
            eprintln!("usage: notification_cleanup <ISO-8601 timestamp>");
            return ExitCode::from(1);
        }
    };

    let cutoff = match DateTime::parse_from_rfc3339(&args.cutoff) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("invalid timestamp `{}`: {e}", args.cutoff);
            return ExitCode::from(1);
        }
    };

    let kept = cleanup(read_stdin().as_deref().unwrap_or(""), cutoff);
    match serde_json::to_string_pretty(&kept) {
        Ok(out) => println!("{out}"),
        Err(e) => eprintln!("serialize failed: {e}"),
    }
    ExitCode::SUCCESS
}

fn read_stdin() -> Option<String> {
    let mut buf = String::new();
    std::io::stdin().read_to_string(&mut buf).ok()?;
    Some(buf)
}

/// Keeps records created at or after the cutoff. Records with missing or
/// unparseable timestamps are expired conservatively, and junk input is
/// treated as an empty list.
fn cleanup(input: &str, cutoff: DateTime<FixedOffset>) -> Vec<Notification> {
    let records: Vec<Notification> = serde_json::from_str(input).unwrap_or_default();
    records
        .into_iter()
        .filter(|n| {
            DateTime::parse_from_rfc3339(&n.created_at)
                .map(|t| t >= cutoff)
                .unwrap_or(false)
        })
        .collect()
}
