mod calc;
mod ipc;
mod journal;
mod seed;
mod session;

use std::io::{self, BufRead, Write};

use serde_json::json;

fn main() {
    // Diagnostics go to stderr; stdout is reserved for the protocol.
    env_logger::init();
    log::info!("studiod {} starting", env!("CARGO_PKG_VERSION"));

    let mut state = ipc::AppState::new();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // Can't correlate without a parsed id; reply best-effort.
                let resp = json!({
                    "ok": false,
                    "error": { "code": "bad_json", "message": e.to_string() }
                });
                let _ = writeln!(stdout, "{resp}");
                let _ = stdout.flush();
                continue;
            }
        };

        let resp = ipc::handle_request(&mut state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }

    log::info!("stdin closed, shutting down");
}
