//! High-level repository operations
//!
//! `Repository` ties the object database and the workspace to one root path
//! and exposes the operations the CLI dispatches to. All configuration
//! (root path, remote URL, output writer) is passed in explicitly; nothing
//! is read from ambient process state.

use crate::areas::database::Database;
use crate::areas::workspace::{GIT_DIR, Workspace};
use crate::artifacts::checkout::CheckoutEngine;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::{Author, Commit};
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::pack::PackDecoder;
use crate::artifacts::transport::client::PackClient;
use crate::artifacts::tree_builder::TreeBuilder;
use anyhow::Context;
use std::cell::{RefCell, RefMut};
use std::io::Write;
use std::path::Path;

const HEAD_FILE_CONTENT: &str = "ref: refs/heads/main\n";

pub struct Repository {
    path: Box<Path>,
    writer: RefCell<Box<dyn Write>>,
    database: Database,
    workspace: Workspace,
}

impl Repository {
    pub fn new(path: &Path, writer: Box<dyn Write>) -> anyhow::Result<Self> {
        if !path.exists() {
            std::fs::create_dir_all(path)
                .context(format!("Unable to create repository root {}", path.display()))?;
        }
        let path = path.canonicalize()?;

        let database = Database::new(path.join(GIT_DIR).join("objects").into_boxed_path());
        let workspace = Workspace::new(path.clone().into_boxed_path());

        Ok(Repository {
            path: path.into_boxed_path(),
            writer: RefCell::new(writer),
            database,
            workspace,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn writer(&self) -> RefMut<'_, Box<dyn Write>> {
        self.writer.borrow_mut()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Scaffold `.git/{objects,refs}` and a HEAD pointing at `main`
    pub fn init(&self) -> anyhow::Result<()> {
        let git_path = self.path.join(GIT_DIR);
        std::fs::create_dir_all(self.database.objects_path())
            .context("Unable to create objects directory")?;
        std::fs::create_dir_all(git_path.join("refs"))
            .context("Unable to create refs directory")?;
        std::fs::write(git_path.join("HEAD"), HEAD_FILE_CONTENT)
            .context("Unable to create HEAD file")?;

        writeln!(
            self.writer(),
            "Initialized git directory at {}",
            self.path.display()
        )?;

        Ok(())
    }

    /// Print the content of an object (`cat-file -p`)
    pub fn cat_file(&self, sha: &str) -> anyhow::Result<()> {
        let object_id = ObjectId::try_parse(sha.to_string())?;
        let object = self.database.parse_object(&object_id)?;

        write!(self.writer(), "{}", object.display())?;

        Ok(())
    }

    /// Hash a file as a blob, optionally persisting it (`hash-object`)
    pub fn hash_object(&self, file: &str, write: bool) -> anyhow::Result<()> {
        let content = self.workspace.read_file(&self.path.join(file))?;
        let blob = Blob::new(content);

        let object_id = if write {
            self.database.store(&blob)?
        } else {
            blob.object_id()?
        };

        writeln!(self.writer(), "{object_id}")?;

        Ok(())
    }

    /// List a tree's entries (`ls-tree`)
    pub fn ls_tree(&self, sha: &str, name_only: bool) -> anyhow::Result<()> {
        let object_id = ObjectId::try_parse(sha.to_string())?;
        let tree = self
            .database
            .parse_object_as_tree(&object_id)?
            .context(format!("Object {object_id} is not a tree"))?;

        if name_only {
            for (name, _) in tree.entries() {
                writeln!(self.writer(), "{name}")?;
            }
        } else {
            writeln!(self.writer(), "{}", tree.display())?;
        }

        Ok(())
    }

    /// Snapshot the workspace into tree objects (`write-tree`)
    pub fn write_tree(&self) -> anyhow::Result<()> {
        let builder = TreeBuilder::new(&self.workspace, &self.database);
        let root_oid = builder.build()?;

        writeln!(self.writer(), "{root_oid}")?;

        Ok(())
    }

    /// Create a commit object for an existing tree (`commit-tree`)
    pub fn commit_tree(
        &self,
        tree: &str,
        parent: Option<&str>,
        message: &str,
    ) -> anyhow::Result<()> {
        let tree = ObjectId::try_parse(tree.to_string())?;
        let parent = parent
            .map(|parent| ObjectId::try_parse(parent.to_string()))
            .transpose()?;

        let commit = Commit::new(tree, parent, Author::load_from_env(), message.to_string());
        let commit_oid = self.database.store(&commit)?;

        writeln!(self.writer(), "{commit_oid}")?;

        Ok(())
    }

    /// Clone a remote repository over smart HTTP (`clone`)
    ///
    /// Initializes `destination`, fetches the remote HEAD packfile,
    /// materializes its objects, then checks the HEAD commit out into the
    /// fresh workspace.
    pub fn clone_from(
        remote_url: &str,
        destination: &Path,
        writer: Box<dyn Write>,
    ) -> anyhow::Result<Repository> {
        let repository = Repository::new(destination, writer)?;
        repository.init()?;

        let client = PackClient::new(remote_url);
        let (head, pack) = client.fetch()?;

        let stored = PackDecoder::new(&repository.database).decode(&pack)?;
        writeln!(repository.writer(), "Unpacked {} objects", stored.len())?;

        CheckoutEngine::new(&repository.database).checkout(&head, repository.workspace.path())?;
        writeln!(repository.writer(), "Checked out {head}")?;

        Ok(repository)
    }
}
