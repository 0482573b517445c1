use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn svexport() -> Command {
    Command::cargo_bin("svexport").unwrap()
}

fn write_project(root: &Path) {
    fs::create_dir_all(root.join("include")).unwrap();
    fs::create_dir_all(root.join("rtl")).unwrap();

    fs::write(
        root.join("include/riscv_config.sv"),
        "// CONFIG: RVC\n\
         // compressed instruction support\n\
         `define RVC\n\
         // CONFIG: MUL\n\
         // hardware multiplier\n\
         //`define MUL\n",
    )
    .unwrap();

    fs::write(
        root.join("rtl/core.sv"),
        "module core;\n\
         // CONFIG_REGION: RVC\n\
         `ifdef RVC\n\
         decompressor u_dec();\n\
         `endif\n\
         // CONFIG_REGION: MUL\n\
         `ifdef MUL\n\
         multiplier u_mul();\n\
         `else\n\
         assign mul_res = '0;\n\
         `endif\n\
         endmodule\n",
    )
    .unwrap();
}

#[test]
fn shows_help_without_arguments() {
    svexport()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn exports_clean_core() {
    let project = TempDir::new().unwrap();
    write_project(project.path());
    let out = TempDir::new().unwrap();
    let dest = out.path().join("clean");

    svexport()
        .arg(project.path())
        .arg("-o")
        .arg(&dest)
        .arg("--output-format")
        .arg("plain")
        .assert()
        .success();

    let core = fs::read_to_string(dest.join("rtl/core.sv")).unwrap();
    assert!(core.contains("decompressor u_dec();"));
    assert!(!core.contains("`ifdef"));
    assert!(!core.contains("multiplier u_mul();"));
    assert!(core.contains("assign mul_res = '0;"));
    assert!(dest.join("GENERATED_EXPORT.md").exists());
}

#[test]
fn export_then_archive_leaves_tarball() {
    let project = TempDir::new().unwrap();
    write_project(project.path());
    let out = TempDir::new().unwrap();
    let dest = out.path().join("clean");

    svexport()
        .arg(project.path())
        .arg("-o")
        .arg(&dest)
        .arg("-z")
        .arg("--output-format")
        .arg("plain")
        .assert()
        .success();

    assert!(out.path().join("clean.tar.gz").exists());
    assert!(!dest.exists());
}

#[test]
fn malformed_config_fails_with_config_exit_code() {
    let project = TempDir::new().unwrap();
    write_project(project.path());
    fs::write(
        project.path().join("include/riscv_config.sv"),
        "// CONFIG: RVC\n// description but no define line\n",
    )
    .unwrap();

    let out = TempDir::new().unwrap();

    svexport()
        .arg(project.path())
        .arg("-o")
        .arg(out.path().join("clean"))
        .arg("--output-format")
        .arg("plain")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("CONFIG declaration"));
}

#[test]
fn refuses_existing_export_directory() {
    let project = TempDir::new().unwrap();
    write_project(project.path());

    let out = TempDir::new().unwrap();
    let dest = out.path().join("clean");
    fs::create_dir(&dest).unwrap();
    fs::write(dest.join("stale.txt"), "x\n").unwrap();

    svexport()
        .arg(project.path())
        .arg("-o")
        .arg(&dest)
        .arg("--output-format")
        .arg("plain")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn overwrites_config_with_backup() {
    let project = TempDir::new().unwrap();
    write_project(project.path());

    let new_config = project.path().join("minimal.sv");
    fs::write(&new_config, "// minimal configuration\n").unwrap();

    svexport()
        .arg(project.path())
        .arg("-i")
        .arg(&new_config)
        .arg("--output-format")
        .arg("plain")
        .assert()
        .success();

    let target = project.path().join("include/riscv_config.sv");
    assert_eq!(
        fs::read_to_string(target).unwrap(),
        "// minimal configuration\n"
    );
    assert!(project
        .path()
        .join("include/riscv_config.sv.bak")
        .exists());
}

#[test]
fn dry_run_lists_sources_without_writing() {
    let project = TempDir::new().unwrap();
    write_project(project.path());
    let out = TempDir::new().unwrap();
    let dest = out.path().join("clean");

    svexport()
        .arg(project.path())
        .arg("-o")
        .arg(&dest)
        .arg("--dry-run")
        .arg("--output-format")
        .arg("plain")
        .assert()
        .success()
        .stdout(predicate::str::contains("rtl/core.sv"))
        .stdout(predicate::str::contains("RVC"));

    assert!(!dest.exists());
}

#[test]
fn generate_config_writes_sample() {
    let dir = TempDir::new().unwrap();

    svexport()
        .current_dir(dir.path())
        .arg(".")
        .arg("--generate-config")
        .arg("--output-format")
        .arg("plain")
        .assert()
        .success();

    let content = fs::read_to_string(dir.path().join("svexport.toml")).unwrap();
    assert!(content.contains("[filters]"));
    assert!(content.contains("[synthesis]"));
}
