mod common;

use assert_fs::fixture::{FileWriteStr, PathChild};
use fake::Fake;
use fake::faker::lorem::en::{Word, Words};
use predicates::prelude::predicate;

#[test]
fn new_repository_initiated_with_git_directory() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;

    common::twig_cmd(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^Initialized git directory at .+\n$")?);

    assert!(dir.path().join(".git/objects").is_dir());
    assert!(dir.path().join(".git/refs").is_dir());
    assert_eq!(
        std::fs::read_to_string(dir.path().join(".git/HEAD"))?,
        "ref: refs/heads/main\n"
    );

    Ok(())
}

#[test]
fn write_blob_object_successfully() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    common::twig_cmd(dir.path()).arg("init").assert().success();

    let file_name = format!("{}.txt", Word().fake::<String>());
    let file_content = Words(5..10).fake::<Vec<String>>().join(" ");
    dir.child(&file_name).write_str(&file_content)?;

    common::twig_cmd(dir.path())
        .arg("hash-object")
        .arg("-w")
        .arg(&file_name)
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^[0-9a-f]{40}\n$")?);

    Ok(())
}

#[test]
fn read_blob_object_back_verbatim() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    common::twig_cmd(dir.path()).arg("init").assert().success();

    let file_content = Words(5..10).fake::<Vec<String>>().join(" ");
    dir.child("data.txt").write_str(&file_content)?;

    let output = common::twig_cmd(dir.path())
        .arg("hash-object")
        .arg("-w")
        .arg("data.txt")
        .output()?;
    let oid = String::from_utf8(output.stdout)?.trim().to_string();

    common::twig_cmd(dir.path())
        .arg("cat-file")
        .arg("-p")
        .arg(&oid)
        .assert()
        .success()
        .stdout(file_content);

    Ok(())
}

#[test]
fn read_blob_object_with_uppercase_id() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    common::twig_cmd(dir.path()).arg("init").assert().success();

    dir.child("data.txt").write_str("hello")?;

    let output = common::twig_cmd(dir.path())
        .arg("hash-object")
        .arg("-w")
        .arg("data.txt")
        .output()?;
    let oid = String::from_utf8(output.stdout)?.trim().to_uppercase();

    common::twig_cmd(dir.path())
        .arg("cat-file")
        .arg("-p")
        .arg(&oid)
        .assert()
        .success()
        .stdout("hello");

    Ok(())
}

#[test]
fn write_tree_is_deterministic_across_repositories() -> Result<(), Box<dyn std::error::Error>> {
    let mut tree_oids = Vec::new();

    // same content created in different orders must hash identically
    for file_order in [["a.txt", "d/b.txt"], ["d/b.txt", "a.txt"]] {
        let dir = assert_fs::TempDir::new()?;
        common::twig_cmd(dir.path()).arg("init").assert().success();

        for file_name in file_order {
            let contents: &[u8] = if file_name == "a.txt" { b"hi" } else { b"yo" };
            common::write_file(&dir.path().join(file_name), contents);
        }

        let output = common::twig_cmd(dir.path()).arg("write-tree").output()?;
        assert!(output.status.success());
        tree_oids.push(String::from_utf8(output.stdout)?.trim().to_string());
    }

    assert_eq!(tree_oids[0], tree_oids[1]);

    Ok(())
}

#[test]
fn ls_tree_lists_names_in_ascending_order() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    common::twig_cmd(dir.path()).arg("init").assert().success();

    common::write_file(&dir.path().join("zebra.txt"), b"z");
    common::write_file(&dir.path().join("apple.txt"), b"a");
    common::write_file(&dir.path().join("mango/seed.txt"), b"m");

    let output = common::twig_cmd(dir.path()).arg("write-tree").output()?;
    let tree_oid = String::from_utf8(output.stdout)?.trim().to_string();

    common::twig_cmd(dir.path())
        .arg("ls-tree")
        .arg("--name-only")
        .arg(&tree_oid)
        .assert()
        .success()
        .stdout("apple.txt\nmango\nzebra.txt\n");

    Ok(())
}

#[test]
fn commit_tree_writes_commit_referencing_tree() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    common::twig_cmd(dir.path()).arg("init").assert().success();

    dir.child("a.txt").write_str("hi")?;
    let output = common::twig_cmd(dir.path()).arg("write-tree").output()?;
    let tree_oid = String::from_utf8(output.stdout)?.trim().to_string();

    let output = common::twig_cmd(dir.path())
        .arg("commit-tree")
        .arg(&tree_oid)
        .arg("-m")
        .arg("initial commit")
        .env("GIT_AUTHOR_NAME", "Ada Lovelace")
        .env("GIT_AUTHOR_EMAIL", "ada@example.com")
        .output()?;
    assert!(output.status.success());
    let commit_oid = String::from_utf8(output.stdout)?.trim().to_string();

    common::twig_cmd(dir.path())
        .arg("cat-file")
        .arg("-p")
        .arg(&commit_oid)
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("tree {tree_oid}\n")))
        .stdout(predicate::str::contains("author Ada Lovelace <ada@example.com>"))
        .stdout(predicate::str::contains("initial commit"));

    Ok(())
}
