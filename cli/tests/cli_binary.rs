//! Runs the `parley` binary against its real stdin. No request reaches a model: the
//! sessions only start up and leave.

use std::io::{Read, Write};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc;
use std::time::{Duration, Instant};

fn spawn_parley(workdir: &Path) -> Child {
    Command::new(env!("CARGO_BIN_EXE_parley"))
        .current_dir(workdir)
        .env("XDG_CONFIG_HOME", workdir)
        .env("PARLEY_PROVIDER", "openai")
        .env("OPENAI_API_KEY", "sk-test")
        .env_remove("TAVILY_API_KEY")
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to spawn parley")
}

/// Streams the child's stdout into a channel so the test can wait for the prompt.
fn stdout_chunks(child: &mut Child) -> mpsc::Receiver<String> {
    let mut stdout = child.stdout.take().expect("stdout piped");
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let mut buf = [0u8; 1024];
        while let Ok(n) = stdout.read(&mut buf) {
            if n == 0 || tx.send(String::from_utf8_lossy(&buf[..n]).into_owned()).is_err() {
                break;
            }
        }
    });
    rx
}

fn read_until(rx: &mpsc::Receiver<String>, seen: &mut String, needle: &str, limit: Duration) -> bool {
    let deadline = Instant::now() + limit;
    while !seen.contains(needle) {
        let left = deadline.saturating_duration_since(Instant::now());
        match rx.recv_timeout(left) {
            Ok(chunk) => seen.push_str(&chunk),
            Err(_) => return false,
        }
    }
    true
}

fn wait_for_exit(child: &mut Child, limit: Duration) -> Option<std::process::ExitStatus> {
    let deadline = Instant::now() + limit;
    while Instant::now() < deadline {
        if let Some(status) = child.try_wait().expect("try_wait") {
            return Some(status);
        }
        std::thread::sleep(Duration::from_millis(50));
    }
    None
}

/// **Scenario**: Ctrl-C at the prompt ends the process even though stdin stays open.
#[cfg(unix)]
#[test]
fn interrupt_at_prompt_exits_process() {
    let dir = tempfile::tempdir().unwrap();
    let mut child = spawn_parley(dir.path());
    let _stdin = child.stdin.take();
    let rx = stdout_chunks(&mut child);
    let mut seen = String::new();

    assert!(
        read_until(&rx, &mut seen, "User: ", Duration::from_secs(20)),
        "no prompt, output so far:\n{seen}"
    );
    // The interrupt listener is installed when the prompt starts waiting.
    std::thread::sleep(Duration::from_millis(300));
    let killed = Command::new("kill")
        .args(["-INT", &child.id().to_string()])
        .status()
        .expect("run kill");
    assert!(killed.success());

    let status = wait_for_exit(&mut child, Duration::from_secs(5));
    if status.is_none() {
        let _ = child.kill();
    }
    let status = status.expect("parley still running after SIGINT");
    assert!(status.success(), "exit status {status}");
    read_until(&rx, &mut seen, "Exiting...", Duration::from_secs(1));
    assert!(seen.contains("Exiting..."), "{seen}");
}

/// **Scenario**: `exit` at the prompt ends the process with success.
#[test]
fn exit_command_exits_process() {
    let dir = tempfile::tempdir().unwrap();
    let mut child = spawn_parley(dir.path());
    child
        .stdin
        .as_mut()
        .expect("stdin piped")
        .write_all(b"exit\n")
        .expect("write stdin");
    let rx = stdout_chunks(&mut child);

    let status = wait_for_exit(&mut child, Duration::from_secs(20));
    if status.is_none() {
        let _ = child.kill();
    }
    assert!(status.expect("parley did not exit").success());
    let mut seen = String::new();
    read_until(&rx, &mut seen, "Exiting...", Duration::from_secs(1));
    assert!(seen.contains("Type 'memory' to see conversation history"), "{seen}");
    assert!(seen.contains("Exiting..."), "{seen}");
}

/// **Scenario**: Missing credentials stop startup with exit code 1.
#[test]
fn missing_credentials_exit_with_error() {
    let dir = tempfile::tempdir().unwrap();
    let out = Command::new(env!("CARGO_BIN_EXE_parley"))
        .current_dir(dir.path())
        .env("XDG_CONFIG_HOME", dir.path())
        .env("PARLEY_PROVIDER", "openai")
        .env_remove("OPENAI_API_KEY")
        .stdin(Stdio::null())
        .output()
        .expect("run parley");
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("Configuration error"));
}
