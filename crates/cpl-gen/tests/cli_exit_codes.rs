use std::fs;
use std::path::Path;
use std::process::Command;

use tempfile::tempdir;

const RUN_INFO: &str = "\
components:
  ATM: { grid: n96, resolution: [192, 144], model_levels: 85, soil_levels: 4 }
  OCN: { grid: orca1, resolution: [360, 290] }
coupling_frequencies:
  OCN2ATM: [3600]
executables: [atmos, ocean]
runtime: 86400
inidate: '19790101'
";

const GENERATE: [&str; 7] = [
    "generate",
    "--run-info",
    "run_info.yaml",
    "--couplings",
    "couplings.yaml",
    "--out",
    "out",
];

fn cpl_gen(args: &[&str], dir: &Path) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_cpl-gen"))
        .args(args)
        .current_dir(dir)
        .output()
        .expect("run cpl-gen")
}

fn write_inputs(dir: &Path, spec: &str) {
    fs::write(dir.join("run_info.yaml"), RUN_INFO).expect("run info");
    fs::write(
        dir.join("couplings.yaml"),
        format!("requests:\n  - origin: OCN\n    specs: ['{spec}']\n"),
    )
    .expect("couplings");
}

#[test]
fn generate_writes_outputs() {
    let dir = tempdir().expect("tempdir");
    write_inputs(dir.path(), "OCN_SST;25;t;ATM;1;CF;100");
    let output = cpl_gen(&GENERATE, dir.path());
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let namcouple = fs::read_to_string(dir.path().join("out/namcouple")).expect("namcouple");
    assert!(namcouple.contains(" OCN_SST ATM_SST 1 3600 1 rstrt.nc EXPORTED\n"));
    assert!(dir.path().join("out/cf_name_table.txt").exists());
    assert!(dir.path().join("out/namcouple.manifest.json").exists());
}

#[test]
fn unknown_mapping_exits_with_its_code() {
    let dir = tempdir().expect("tempdir");
    write_inputs(dir.path(), "SSTOCN;25;t;ATM;1;XY;100");
    let output = cpl_gen(&GENERATE, dir.path());
    assert_eq!(output.status.code(), Some(13));
    assert!(!dir.path().join("out").exists());
}

#[test]
fn check_prints_field_summary() {
    let dir = tempdir().expect("tempdir");
    write_inputs(dir.path(), "OCN_SST;25;t;ATM;1;CF;100");
    let output = cpl_gen(
        &["check", "--run-info", "run_info.yaml", "--couplings", "couplings.yaml"],
        dir.path(),
    );
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("OCN_SST -> ATM_SST"));
    assert!(stdout.ends_with("1 fields\n"));
}

#[test]
fn long_version_reports_manifest_schema() {
    let dir = tempdir().expect("tempdir");
    let output = cpl_gen(&["version", "--long"], dir.path());
    assert!(output.status.success());
    let info: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(info["version"], env!("CARGO_PKG_VERSION"));
    assert!(info.get("manifest_schema").is_some());
    assert!(info.get("git_commit").is_none());
}
