mod common;

use twig::areas::database::Database;
use twig::areas::repository::Repository;
use twig::artifacts::checkout::CheckoutEngine;
use twig::artifacts::objects::commit::{Author, Commit};
use twig::artifacts::objects::object_type::ObjectType;
use twig::artifacts::tree_builder::TreeBuilder;
use twig::errors::GitError;

fn quiet_repository(path: &std::path::Path) -> Repository {
    let repository =
        Repository::new(path, Box::new(std::io::sink())).expect("Failed to open repository");
    repository.init().expect("Failed to init repository");
    repository
}

#[test]
fn built_tree_checks_out_byte_identical() -> Result<(), Box<dyn std::error::Error>> {
    let source = assert_fs::TempDir::new()?;
    let repository = quiet_repository(source.path());

    common::write_file(&source.path().join("a.txt"), b"hi");
    common::write_file(&source.path().join("d").join("b.txt"), b"yo");

    let builder = TreeBuilder::new(repository.workspace(), repository.database());
    let tree_oid = builder.build()?;

    // re-deriving the snapshot must yield the same id
    assert_eq!(builder.build()?, tree_oid);

    let commit = Commit::new(
        tree_oid,
        None,
        Author::new("Ada Lovelace".to_string(), "ada@example.com".to_string()),
        "snapshot".to_string(),
    );
    let commit_oid = repository.database().store(&commit)?;

    let destination = assert_fs::TempDir::new()?;
    CheckoutEngine::new(repository.database()).checkout(&commit_oid, destination.path())?;

    assert_eq!(std::fs::read(destination.path().join("a.txt"))?, b"hi");
    assert_eq!(std::fs::read(destination.path().join("d/b.txt"))?, b"yo");

    Ok(())
}

#[test]
fn commit_without_tree_line_fails_with_malformed_commit() -> Result<(), Box<dyn std::error::Error>>
{
    let dir = tempfile::tempdir()?;
    let database = Database::new(dir.path().join("objects").into_boxed_path());

    let payload = b"author A <a@b.c> 1700000000 +0000\ncommitter A <a@b.c> 1700000000 +0000\n\nno snapshot here\n";
    let commit_oid = database.store_raw(&ObjectType::Commit, payload)?;

    let destination = tempfile::tempdir()?;
    let error = CheckoutEngine::new(&database)
        .checkout(&commit_oid, destination.path())
        .unwrap_err();

    assert!(matches!(
        error.downcast_ref::<GitError>(),
        Some(GitError::MalformedCommit(_))
    ));

    Ok(())
}

#[test]
fn checking_out_missing_commit_reports_object_not_found()
-> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let database = Database::new(dir.path().join("objects").into_boxed_path());

    let absent = twig::artifacts::objects::object_id::ObjectId::hash_of(b"never stored")?;
    let destination = tempfile::tempdir()?;

    let error = CheckoutEngine::new(&database)
        .checkout(&absent, destination.path())
        .unwrap_err();

    assert!(matches!(
        error.downcast_ref::<GitError>(),
        Some(GitError::ObjectNotFound(_))
    ));

    Ok(())
}
