use std::process::Command;

#[test]
fn headless_smoke() {
    let bin = env!("CARGO_BIN_EXE_dotlife-app");
    let mut cmd = Command::new(bin);
    cmd.env("DOTLIFE_HEADLESS", "1")
        .env("DOTLIFE_HEADLESS_ROUNDS", "8")
        .env("RUST_LOG", "off");

    let status = cmd.status().expect("failed to run dotlife-app binary");
    assert!(status.success(), "headless run failed");
}
