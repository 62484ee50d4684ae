//! Integration tests for invrun CLI
//!
//! These tests verify CLI commands work correctly end-to-end.

use std::process::Command;

/// Get the path to the invrun binary
fn invrun_binary() -> std::path::PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // Remove test executable name
    path.pop(); // Remove deps directory

    // In debug mode, binary is at target/debug/invrun
    path.push("invrun");

    if cfg!(windows) {
        path.set_extension("exe");
    }

    path
}

/// Run invrun command and return output
fn run_invrun(args: &[&str]) -> std::process::Output {
    Command::new(invrun_binary())
        .args(args)
        .output()
        .expect("Failed to execute invrun")
}

#[test]
fn test_invrun_version() {
    let output = run_invrun(&["--version"]);

    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("invrun"));
}

#[test]
fn test_invrun_help() {
    let output = run_invrun(&["--help"]);

    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage:"));
    assert!(stdout.contains("Commands:"));
}

#[test]
fn test_invrun_run_help() {
    let output = run_invrun(&["run", "--help"]);

    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("run"));
    assert!(stdout.contains("--mode"));
    assert!(stdout.contains("--credential"));
}

#[test]
fn test_invrun_prepare_help() {
    let output = run_invrun(&["prepare", "--help"]);

    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("prepare"));
    assert!(stdout.contains("--keep"));
}

#[test]
fn test_invrun_providers() {
    let output = run_invrun(&["providers"]);

    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ec2"));
    assert!(stdout.contains("gce"));
    assert!(stdout.contains("openstack"));
}

#[test]
fn test_invrun_invalid_command() {
    let output = run_invrun(&["invalid-command-that-does-not-exist"]);

    // Should fail with non-zero exit code
    assert!(!output.status.success());
}

// ============================================================================
// End-to-end workflow tests with temp directories
// ============================================================================

mod workflow_tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    /// Helper to verify no panic occurred in command output
    fn assert_no_panic(output: &std::process::Output, context: &str) {
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(
            !stderr.contains("panic") && !stderr.contains("RUST_BACKTRACE"),
            "{} panicked.\nstderr: {}",
            context,
            stderr
        );
    }

    #[test]
    fn test_prepare_ec2_script_mode() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let source = temp_dir.path().join("source.yml");
        fs::write(
            &source,
            "name: test-ec2\nkind: ec2\nsource_vars:\n  base_source_var: value_of_var\n",
        )
        .expect("Failed to write source file");

        let output = run_invrun(&[
            "prepare",
            source.to_str().unwrap(),
            "--mode",
            "script",
        ]);

        assert_no_panic(&output, "prepare in script mode");
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(output.status.success(), "prepare failed.\nstderr: {}", stderr);

        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("EC2_INI_PATH"));
        assert!(stdout.contains("ec2.ini"));
    }

    #[test]
    fn test_prepare_plugin_mode_emits_config() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let source = temp_dir.path().join("source.yml");
        fs::write(&source, "name: test-ec2\nkind: ec2\n").expect("Failed to write source file");

        let output = run_invrun(&[
            "prepare",
            source.to_str().unwrap(),
            "--mode",
            "plugin",
        ]);

        assert_no_panic(&output, "prepare in plugin mode");
        assert!(output.status.success());

        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("aws_ec2.yml"));
        assert!(stdout.contains("ANSIBLE_INVENTORY_ENABLED"));
    }

    #[test]
    fn test_prepare_rejects_plugin_mode_for_vmware() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let source = temp_dir.path().join("source.yml");
        fs::write(&source, "name: vc\nkind: vmware\n").expect("Failed to write source file");
        let credential = temp_dir.path().join("credential.yml");
        fs::write(
            &credential,
            "kind: vmware\ninputs:\n  host: https://vcenter.example.org\n  username: admin\n  password: shhh\n",
        )
        .expect("Failed to write credential file");

        let output = run_invrun(&[
            "prepare",
            source.to_str().unwrap(),
            "--credential",
            credential.to_str().unwrap(),
            "--mode",
            "plugin",
        ]);

        assert_no_panic(&output, "prepare vmware in plugin mode");
        assert!(!output.status.success());

        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("does not support plugin mode"));
    }

    #[test]
    fn test_prepare_missing_source_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let missing = temp_dir.path().join("nope.yml");

        let output = run_invrun(&["prepare", missing.to_str().unwrap()]);

        assert_no_panic(&output, "prepare with missing source file");
        assert!(!output.status.success());

        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("Failed to load source definition"));
    }

    #[test]
    fn test_prepare_invalid_mode() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let source = temp_dir.path().join("source.yml");
        fs::write(&source, "name: test-ec2\nkind: ec2\n").expect("Failed to write source file");

        let output = run_invrun(&["prepare", source.to_str().unwrap(), "--mode", "bogus"]);

        assert_no_panic(&output, "prepare with invalid mode");
        assert!(!output.status.success());

        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("is not a valid mode"));
    }

    #[test]
    fn test_prepare_missing_credential_fails() {
        // openstack cannot resolve vars without a credential
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let source = temp_dir.path().join("source.yml");
        fs::write(&source, "name: os\nkind: openstack\n").expect("Failed to write source file");

        let output = run_invrun(&["prepare", source.to_str().unwrap(), "--mode", "script"]);

        assert_no_panic(&output, "prepare openstack without credential");
        assert!(!output.status.success());
    }

    #[test]
    fn test_unknown_source_kind_fails() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let source = temp_dir.path().join("source.yml");
        fs::write(&source, "name: x\nkind: carrier_pigeon\n").expect("Failed to write source file");

        let output = run_invrun(&["prepare", source.to_str().unwrap()]);

        assert_no_panic(&output, "prepare with unknown source kind");
        assert!(!output.status.success());
    }
}
