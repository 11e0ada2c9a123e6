//! Integration tests for the `videoport-hal` CLI binary.
//!
//! These tests exercise the compiled binary via `std::process::Command`.
//! The inspector runs entirely against the built-in capability profile, so
//! no platform hardware is required.

use std::process::Command;

/// Helper: run the binary with the given args.
fn run(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_videoport-hal"))
        .args(args)
        .output()
        .expect("failed to execute binary")
}

// ── Help / usage ──────────────────────────────────────────────────────

#[test]
fn no_args_shows_usage() {
    let out = run(&[]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("USAGE:"), "expected usage text");
    assert!(stdout.contains("--ports"), "expected --ports in help");
}

#[test]
fn help_flag_shows_usage() {
    let out = run(&["--help"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("USAGE:"));
    assert!(stdout.contains("EXAMPLES:"));
}

#[test]
fn short_help_flag_shows_usage() {
    let out = run(&["-h"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("USAGE:"));
}

// ── Inspection against the built-in profile ───────────────────────────

#[test]
fn ports_lists_builtin_profile() {
    let out = run(&["--ports"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("hdmi:0"));
    assert!(stdout.contains("internal:0"));
}

#[test]
fn capabilities_shows_hdcp_support() {
    let out = run(&["--capabilities", "hdmi:0"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("HDMI0"));
    assert!(stdout.contains("1080p60"));
    assert!(stdout.contains("HDCP: supported"));
}

#[test]
fn output_settings_reports_defaults() {
    let out = run(&["--output-settings", "hdmi:0"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Resolution:"));
    assert!(stdout.contains("HDR output: false"));
}

#[test]
fn simulate_hdcp_reaches_authenticated() {
    let out = run(&["--simulate-hdcp", "hdmi:0"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Final status: Authenticated"));
    assert!(stdout.contains("Negotiated protocol: HDCP 2.x"));
}

// ── Error paths ───────────────────────────────────────────────────────

#[test]
fn unknown_flag_exits_nonzero() {
    let out = run(&["--bogus-flag", "value"]);
    assert!(!out.status.success());
}

#[test]
fn missing_value_exits_nonzero() {
    let out = run(&["--capabilities"]);
    assert!(!out.status.success());
}

#[test]
fn bad_port_selector_exits_nonzero() {
    let out = run(&["--capabilities", "hdmi0"]);
    assert!(!out.status.success());
}

#[test]
fn unknown_port_exits_nonzero() {
    // svideo is a valid type but absent from the built-in profile.
    let out = run(&["--output-settings", "svideo:0"]);
    assert!(!out.status.success());
}

#[test]
fn missing_profile_file_exits_nonzero() {
    let out = run(&["--profile", "/nonexistent/platform.toml", "--ports"]);
    assert!(!out.status.success());
}
