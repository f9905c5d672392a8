// Minimal integration test that drives the compiled binary through a PTY.
// A local listener stands in for the tracking server so the real TCP
// transport, event loop and crossterm input handling are all exercised.
//
// Notes:
// - Requires a TTY; uses expectrl which allocates a pseudo terminal.
// - Marked Unix-only and ignored by default to avoid CI/platform issues.
// - Run manually via: `cargo test --test integration_min_session -- --ignored`.

#![cfg(unix)]

use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::thread;
use std::time::Duration;

use expectrl::{spawn, Eof};

#[test]
#[ignore]
fn minimal_session_joins_counts_and_leaves() -> Result<(), Box<dyn std::error::Error>> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?.to_string();

    let server = thread::spawn(move || -> Vec<String> {
        let Ok((socket, _)) = listener.accept() else {
            return Vec::new();
        };
        let Ok(mut writer) = socket.try_clone() else {
            return Vec::new();
        };
        let mut received = Vec::new();
        for line in BufReader::new(socket).lines().map_while(Result::ok) {
            if line.contains("join-exercise") {
                let _ = writer.write_all(
                    b"{\"event\":\"exercise-count\",\"type\":\"squat\",\"data\":{\"count\":3}}\n",
                );
            }
            let leaving = line.contains("leave-exercise");
            received.push(line);
            if leaving {
                break;
            }
        }
        received
    });

    let home = tempfile::tempdir()?;
    let bin = assert_cmd::cargo::cargo_bin("formcoach");
    let cmd = format!(
        "env HOME={} {} squat --server {} --active-secs 2",
        home.path().display(),
        bin.display(),
        addr
    );

    let mut p = spawn(cmd)?;

    // Give the app a moment to initialize the terminal/alternate screen
    thread::sleep(Duration::from_millis(300));

    // Start the countdown, let it run briefly, then quit
    p.send(" ")?;
    thread::sleep(Duration::from_millis(500));
    p.send("q")?;

    p.expect(Eof)?;

    let received = server.join().map_err(|_| "fake server panicked")?;
    assert_eq!(
        received.first().map(String::as_str),
        Some(r#"{"op":"join-exercise","type":"squat"}"#)
    );
    assert_eq!(
        received.last().map(String::as_str),
        Some(r#"{"op":"leave-exercise"}"#)
    );
    Ok(())
}
