use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use clap::Parser;
#[cfg(feature = "rayon")]
use rayon::prelude::*;

use pathowners::{parser, OwnerIndex};

#[derive(Parser)]
#[command(version, about = "Resolve owners for paths in a working tree")]
struct Cli {
    /// Files or directories to resolve owners for.
    paths: Vec<PathBuf>,

    #[clap(short = 'f', long = "file")]
    rules_file: Option<PathBuf>,

    /// Check the rule file for syntax errors and exit.
    #[arg(long)]
    validate: bool,

    /// Print the canonical serialized form of the rule file and exit.
    #[arg(long)]
    canonical: bool,

    /// Write canonical output to this file instead of stdout.
    #[arg(short = 'o', long, requires = "canonical")]
    output: Option<PathBuf>,
}

impl Cli {
    fn rules_path(&self) -> PathBuf {
        self.rules_file
            .clone()
            .unwrap_or_else(|| PathBuf::from("./OWNERS"))
    }

    fn root_paths(&self) -> Vec<PathBuf> {
        if self.paths.is_empty() {
            vec![PathBuf::from(".")]
        } else {
            self.paths.clone()
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let rules_path = cli.rules_path();
    let source = fs::read(&rules_path)
        .with_context(|| format!("reading {}", rules_path.display()))?;
    let result = parser::parse_bytes(&source);

    if cli.validate {
        if result.errors.is_empty() {
            println!("{}: ok", rules_path.display());
            return Ok(());
        }
        for err in &result.errors {
            eprintln!("{}: {}", rules_path.display(), err);
        }
        bail!(
            "{}: {} invalid rule lines",
            rules_path.display(),
            result.errors.len()
        );
    }

    let index = result
        .try_into_index()
        .with_context(|| format!("parsing {}", rules_path.display()))?;

    if cli.canonical {
        match &cli.output {
            Some(path) => {
                let mut text = index.serialize();
                text.push('\n');
                fs::write(path, text)
                    .with_context(|| format!("writing {}", path.display()))?;
            }
            None => println!("{}", index.serialize()),
        }
        return Ok(());
    }

    for root_path in cli.root_paths() {
        if !root_path.exists() {
            eprintln!("error: path does not exist: {}", root_path.display());
            continue;
        }

        if root_path.is_dir() {
            let paths: Vec<String> = walk_files(&root_path)
                .map(|e| {
                    e.path()
                        .strip_prefix(".")
                        .unwrap_or(e.path())
                        .to_string_lossy()
                        .to_string()
                })
                .collect();
            print_owners(&index, &paths);
        } else {
            let path = root_path.to_string_lossy();
            print_line(&path, index.find_owners(&path));
        }
    }

    Ok(())
}

#[cfg(feature = "rayon")]
fn print_owners(index: &OwnerIndex, paths: &[String]) {
    let resolved: Vec<(&String, Vec<String>)> = paths
        .par_iter()
        .map(|path| (path, index.find_owners(path)))
        .collect();
    for (path, owners) in resolved {
        print_line(path, owners);
    }
}

#[cfg(not(feature = "rayon"))]
fn print_owners(index: &OwnerIndex, paths: &[String]) {
    for path in paths {
        print_line(path, index.find_owners(path));
    }
}

fn print_line(path: &str, mut owners: Vec<String>) {
    if owners.is_empty() {
        println!("{:<70}  (unowned)", path);
    } else {
        owners.sort();
        println!("{:<70}  {}", path, owners.join(" "));
    }
}

fn walk_files(root: impl AsRef<Path>) -> impl Iterator<Item = walkdir::DirEntry> {
    walkdir::WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|entry| !entry.file_type().is_dir())
        .filter(|entry| !entry.path().starts_with("./.git"))
}
