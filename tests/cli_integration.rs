use std::process::Command;
use tempfile::tempdir;

fn bin() -> String {
    env!("CARGO_BIN_EXE_oxiflate").to_string()
}

fn sample() -> Vec<u8> {
    b"the quick brown fox jumps over the lazy dog\n".repeat(500)
}

#[test]
fn cli_compress_decompress_roundtrip() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("input.txt");
    let packed = dir.path().join("input.txt.gz");
    let output = dir.path().join("output.txt");
    std::fs::write(&input, sample()).unwrap();

    let st = Command::new(bin())
        .args(["compress", "--gzip"])
        .arg(&input)
        .arg(&packed)
        .status()
        .unwrap();
    assert!(st.success());
    assert_eq!(&std::fs::read(&packed).unwrap()[..2], &[0x1f, 0x8b]);

    let st = Command::new(bin())
        .args(["decompress", "--gzip"])
        .arg(&packed)
        .arg(&output)
        .status()
        .unwrap();
    assert!(st.success());
    assert_eq!(std::fs::read(&output).unwrap(), sample());
}

#[test]
fn cli_stdout_output_is_zlib_by_default() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.txt");
    std::fs::write(&input, b"the quick brown fox").unwrap();

    let out = Command::new(bin()).arg("compress").arg(&input).output().unwrap();
    assert!(out.status.success());
    assert_eq!(out.stdout[0] & 0x0f, 8);
    assert_eq!(u16::from_be_bytes([out.stdout[0], out.stdout[1]]) % 31, 0);

    let packed = dir.path().join("in.z");
    std::fs::write(&packed, &out.stdout).unwrap();
    let out = Command::new(bin())
        .args(["decompress", "-c"])
        .arg(&packed)
        .output()
        .unwrap();
    assert!(out.status.success());
    assert_eq!(out.stdout, b"the quick brown fox");
}

#[test]
fn cli_byte_range() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.bin");
    let packed = dir.path().join("part.z");
    let data: Vec<u8> = (0..8192u32).map(|i| (i % 251) as u8).collect();
    std::fs::write(&input, &data).unwrap();

    let st = Command::new(bin())
        .args(["compress", "--offset", "1K", "--length", "2K"])
        .arg(&input)
        .arg(&packed)
        .status()
        .unwrap();
    assert!(st.success());

    let out = Command::new(bin()).arg("decompress").arg(&packed).output().unwrap();
    assert!(out.status.success());
    assert_eq!(out.stdout, &data[1024..3072]);
}

#[test]
fn cli_refuses_overwrite_without_force() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.txt");
    let output = dir.path().join("exists.z");
    std::fs::write(&input, b"payload").unwrap();
    std::fs::write(&output, b"keep me").unwrap();

    let st = Command::new(bin())
        .arg("compress")
        .arg(&input)
        .arg(&output)
        .status()
        .unwrap();
    assert!(!st.success());
    assert_eq!(std::fs::read(&output).unwrap(), b"keep me");

    let st = Command::new(bin())
        .args(["--force", "compress"])
        .arg(&input)
        .arg(&output)
        .status()
        .unwrap();
    assert!(st.success());
    assert_ne!(std::fs::read(&output).unwrap(), b"keep me");
}

#[test]
fn cli_corrupt_input_fails() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("bad.gz");
    std::fs::write(&input, b"\x1f\x8b\x08\x00garbage garbage garbage").unwrap();

    let out = Command::new(bin())
        .args(["decompress", "--gzip"])
        .arg(&input)
        .output()
        .unwrap();
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("decompress error"), "stderr: {stderr}");
}

#[test]
fn cli_missing_input_fails() {
    let dir = tempdir().unwrap();
    let out = Command::new(bin())
        .arg("compress")
        .arg(dir.path().join("absent.bin"))
        .output()
        .unwrap();
    assert!(!out.status.success());
}

#[test]
fn cli_json_stats() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.txt");
    let packed = dir.path().join("in.gz");
    std::fs::write(&input, sample()).unwrap();

    let out = Command::new(bin())
        .args(["--json", "compress", "--gzip", "--level", "9"])
        .arg(&input)
        .arg(&packed)
        .output()
        .unwrap();
    assert!(out.status.success());

    let v: serde_json::Value = serde_json::from_slice(&out.stderr).unwrap();
    assert_eq!(v["command"], "compress");
    assert_eq!(v["framing"], "gzip");
    assert_eq!(v["level"], 9);
    assert_eq!(v["input_size"], sample().len() as u64);
    assert_eq!(
        v["output_size"],
        std::fs::metadata(&packed).unwrap().len()
    );
}

#[test]
fn cli_config_works() {
    let out = Command::new(bin()).arg("config").output().unwrap();
    assert!(out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("DEFLATE_BLOCK_SIZE=16384"));
}

#[test]
fn cli_rejects_oversized_block() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.txt");
    std::fs::write(&input, b"x").unwrap();
    let st = Command::new(bin())
        .args(["compress", "--block-size", "1G"])
        .arg(&input)
        .status()
        .unwrap();
    assert!(!st.success());
}
