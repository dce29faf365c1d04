use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use twig::areas::repository::Repository;

#[derive(Parser)]
#[command(
    name = "twig",
    version = "0.1.0",
    about = "A minimal git implementation with a smart-HTTP fetch client",
    long_about = "twig is a small reimplementation of git's content-addressable \
    object store together with a smart-HTTP client that can clone a remote \
    repository. It is a learning project, not a git replacement.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "init",
        about = "Initialize a new repository",
        long_about = "Initializes a new repository in the current directory or at the specified path."
    )]
    Init {
        #[arg(index = 1, help = "The path to the repository")]
        path: Option<String>,
    },
    #[command(name = "cat-file", about = "Print the content of an object")]
    CatFile {
        #[arg(short = 'p', long, help = "The object SHA to print")]
        sha: String,
    },
    #[command(
        name = "hash-object",
        about = "Hash a file and optionally write it to the object database"
    )]
    HashObject {
        #[arg(short, long, required = false, help = "Write the object to the object database")]
        write: bool,
        #[arg(index = 1)]
        file: String,
    },
    #[command(name = "ls-tree", about = "List the contents of a tree object")]
    LsTree {
        #[arg(long, help = "Print only entry names")]
        name_only: bool,
        #[arg(index = 1, help = "The tree SHA to list")]
        sha: String,
    },
    #[command(
        name = "write-tree",
        about = "Snapshot the working directory into tree objects"
    )]
    WriteTree,
    #[command(name = "commit-tree", about = "Create a commit for an existing tree")]
    CommitTree {
        #[arg(index = 1, help = "The tree SHA to snapshot")]
        tree: String,
        #[arg(short, long, help = "The parent commit SHA")]
        parent: Option<String>,
        #[arg(short, long, help = "The commit message")]
        message: String,
    },
    #[command(
        name = "clone",
        about = "Clone a remote repository over smart HTTP",
        long_about = "Fetches the remote HEAD over the smart-HTTP upload-pack \
        protocol and checks it out into the given directory."
    )]
    Clone {
        #[arg(index = 1, help = "The remote repository URL")]
        url: String,
        #[arg(index = 2, help = "The destination directory")]
        directory: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let stdout = Box::new(std::io::stdout());

    match &cli.command {
        Commands::Init { path } => {
            let path = path.clone().unwrap_or_else(|| ".".to_string());
            let repository = Repository::new(Path::new(&path), stdout)?;
            repository.init()?;
        }
        Commands::CatFile { sha } => {
            let repository = Repository::new(Path::new("."), stdout)?;
            repository.cat_file(sha)?;
        }
        Commands::HashObject { write, file } => {
            let repository = Repository::new(Path::new("."), stdout)?;
            repository.hash_object(file, *write)?;
        }
        Commands::LsTree { name_only, sha } => {
            let repository = Repository::new(Path::new("."), stdout)?;
            repository.ls_tree(sha, *name_only)?;
        }
        Commands::WriteTree => {
            let repository = Repository::new(Path::new("."), stdout)?;
            repository.write_tree()?;
        }
        Commands::CommitTree {
            tree,
            parent,
            message,
        } => {
            let repository = Repository::new(Path::new("."), stdout)?;
            repository.commit_tree(tree, parent.as_deref(), message)?;
        }
        Commands::Clone { url, directory } => {
            Repository::clone_from(url, directory, stdout)?;
        }
    }

    Ok(())
}
