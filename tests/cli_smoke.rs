use std::path::PathBuf;

#[test]
fn cli_frame_writes_png() {
    let dir = PathBuf::from("target").join("cli_smoke");
    std::fs::create_dir_all(&dir).unwrap();

    let out_path = dir.join("out.png");
    let _ = std::fs::remove_file(&out_path);

    let exe = std::env::var_os("CARGO_BIN_EXE_nebula")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let mut p = PathBuf::from("target").join("debug");
            p.push(if cfg!(windows) {
                "nebula.exe"
            } else {
                "nebula"
            });
            p
        });

    let out_arg = out_path.to_string_lossy().to_string();

    let status = std::process::Command::new(exe)
        .args([
            "frame", "--mood", "sound", "--tick", "3", "--width", "64", "--height", "64", "--seed",
            "7", "--out",
        ])
        .arg(out_arg.as_str())
        .status()
        .unwrap();

    assert!(status.success());
    assert!(out_path.exists());
    assert!(std::fs::metadata(&out_path).unwrap().len() > 0);
}
