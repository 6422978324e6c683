use assert_cmd::cargo::cargo_bin_cmd;
use std::error::Error;
use std::fs;
use tempfile::tempdir;

#[test]
fn hypno_plot_writes_png() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let out = dir.path().join("hypno.png");
    // 20 minutes at 1 Hz: wake, N2, REM, artefact
    let mut labels = String::new();
    for (stage, seconds) in [(0, 300), (2, 400), (4, 300), (-1, 200)] {
        for _ in 0..seconds {
            labels.push_str(&format!("{stage}\n"));
        }
    }
    let mut cmd = cargo_bin_cmd!("somnus");
    cmd.args([
        "hypno-plot",
        "--out",
        out.to_str().expect("utf8 path"),
        "--sf",
        "1",
        "--tstart",
        "82800",
        "--grid",
        "--dpi",
        "40",
    ])
    .write_stdin(labels);
    cmd.assert().success();

    let bytes = fs::read(&out)?;
    assert!(bytes.len() > 8);
    assert_eq!(&bytes[1..4], b"PNG");
    Ok(())
}
