use std::path::PathBuf;
use std::process::{Command, Output};

fn scratch(name: &str) -> PathBuf {
    let dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("cli").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}

fn pressure_map(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pressure-map"))
        .args(args)
        .output()
        .expect("run pressure-map")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// 3×2 grid with one empty bin.
fn write_histogram(dir: &std::path::Path) -> PathBuf {
    let path = dir.join("field.dat");
    let text = "\
# Bins: 3 2
# X-range: 0 3
# Y-range: 0 2
0.5 0.5 1.0
1.5 0.5 2.0
2.5 0.5 nan

0.5 1.5 4.0
1.5 1.5 5.0
2.5 1.5 6.0
";
    std::fs::write(&path, text).unwrap();
    path
}

#[test]
fn missing_data_file_prints_usage_and_exits_1() {
    let out = pressure_map(&[]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("Usage"), "{}", stderr(&out));
}

#[test]
fn unknown_interpolation_exits_1() {
    let dir = scratch("unknown_mode");
    let input = write_histogram(&dir);
    let out = pressure_map(&[input.to_str().unwrap(), "lanczos"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("lanczos"), "{}", stderr(&out));
    assert!(!dir.join("field_lanczos.png").exists());
}

#[test]
fn out_of_range_sigma_is_an_error_not_a_crash() {
    let dir = scratch("huge_sigma");
    let input = write_histogram(&dir);
    let out = pressure_map(&[input.to_str().unwrap(), "--sigma", "1e300"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("sigma"), "{}", stderr(&out));
}

#[test]
fn help_exits_0() {
    let out = pressure_map(&["--help"]);
    assert_eq!(out.status.code(), Some(0));
}

#[test]
fn valid_file_writes_the_selected_map() {
    let dir = scratch("valid");
    let input = write_histogram(&dir);
    let out = pressure_map(&[
        input.to_str().unwrap(),
        "--skip-comparison",
        "--skip-smoothed",
    ]);
    assert!(out.status.success(), "{}", stderr(&out));

    let png = dir.join("field_bilinear.png");
    assert!(png.exists());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Pressure map saved to:"), "{stdout}");
    image::open(&png).unwrap();
}
