use std::process::Command;

#[test]
fn help_lists_the_configuration_surface() {
    let bin = env!("CARGO_BIN_EXE_opcsim");
    let output = Command::new(bin)
        .arg("--help")
        .output()
        .expect("failed to run opcsim");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for flag in [
        "--endpoint",
        "--namespace-uri",
        "--equipment",
        "--tick-interval-ms",
        "--run-seconds",
        "--seed",
        "--metrics-addr",
        "--audit-log",
    ] {
        assert!(stdout.contains(flag), "help is missing {flag}");
    }
}
