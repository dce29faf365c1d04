#![allow(dead_code)]

use assert_cmd::Command;
use std::path::Path;

/// Build a `twig` command running inside the given directory
pub fn twig_cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("twig").expect("Failed to find twig binary");
    cmd.current_dir(dir);
    cmd
}

/// Write a file, creating parent directories as needed
pub fn write_file(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create parent directories");
    }
    std::fs::write(path, content).expect("Failed to write file");
}
