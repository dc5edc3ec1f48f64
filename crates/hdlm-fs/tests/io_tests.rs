use hdlm_fs::io;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_write_atomic_creates_parent_dirs() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join(".hdlm").join("libraries.toml");

    io::write_atomic(&path, b"[hdlm]\n").unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "[hdlm]\n");
}

#[test]
fn test_write_atomic_overwrites_existing() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("manifest.toml");
    fs::write(&path, "original").unwrap();

    io::write_text(&path, "updated").unwrap();

    assert_eq!(io::read_text(&path).unwrap(), "updated");
}

#[test]
fn test_write_atomic_leaves_no_temp_files() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("manifest.toml");

    io::write_atomic(&path, b"a").unwrap();
    io::write_atomic(&path, b"b").unwrap();

    let leftovers: Vec<_> = fs::read_dir(temp.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn test_concurrent_writers_do_not_interleave() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("manifest.toml");

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let path = path.clone();
            std::thread::spawn(move || {
                let body = format!("writer = {i}\n").repeat(200);
                io::write_text(&path, &body).unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let content = fs::read_to_string(&path).unwrap();
    let first = content.lines().next().unwrap().to_string();
    assert!(content.lines().all(|line| line == first));
    assert_eq!(content.lines().count(), 200);
}

#[test]
fn test_read_missing_file_names_path() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("missing.toml");
    let err = io::read_text(&path).unwrap_err();
    assert!(err.to_string().contains("missing.toml"));
}
