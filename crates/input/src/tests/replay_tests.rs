use super::*;

#[test]
fn tap_snippet_holds_then_releases() {
    assert_eq!(
        tap_snippet("Space", 50),
        "Send, {Space Down}\nSleep, 50\nSend, {Space Up}\n"
    );
}

#[test]
fn chord_snippet_nests_the_tapped_key() {
    let snippet = chord_snippet("Down", "Space", 50);
    let lines: Vec<&str> = snippet.lines().collect();
    assert_eq!(lines.first(), Some(&"Send, {Down Down}"));
    assert_eq!(lines.last(), Some(&"Send, {Down Up}"));
    assert!(snippet.contains("Send, {Space Down}\nSleep, 50\nSend, {Space Up}"));
}

#[cfg(unix)]
fn shell_driver(script: &str, timeout: Duration) -> (tempfile::TempDir, ReplayDriver) {
    let dir = tempfile::tempdir().expect("tempdir");
    let program = dir.path().join("replay.sh");
    std::fs::write(&program, script).expect("program");
    let driver = ReplayDriver::new(ReplayConfig {
        interpreter: "sh".into(),
        replay_program: program.clone(),
        mouse_program: program,
        action_timeout: timeout,
    });
    (dir, driver)
}

#[cfg(unix)]
#[tokio::test]
async fn successful_replay_program_delivers_the_tap() {
    let (dir, driver) = shell_driver(
        "cp \"$1\" \"$(dirname \"$0\")/last.ahk\"\n",
        Duration::from_secs(5),
    );
    driver
        .send(&InputStep::tap("y", 100))
        .await
        .expect("tap");
    let delivered = std::fs::read_to_string(dir.path().join("last.ahk")).expect("copied");
    assert_eq!(delivered, tap_snippet("y", 100));
}

#[cfg(unix)]
#[tokio::test]
async fn failing_replay_program_reports_stderr() {
    let (_dir, driver) = shell_driver("echo 'no hid gadget' >&2\nexit 3\n", Duration::from_secs(5));
    let err = driver
        .send(&InputStep::click(10, 20))
        .await
        .expect_err("should fail");
    assert!(err.to_string().contains("no hid gadget"));
}

#[cfg(unix)]
#[tokio::test]
async fn hung_replay_program_times_out() {
    let (_dir, driver) = shell_driver("sleep 5\n", Duration::from_millis(100));
    let err = driver
        .send(&InputStep::tap("End", 200))
        .await
        .expect_err("should time out");
    assert!(err.to_string().contains("timed out"));
}
