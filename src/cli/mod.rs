//! Argument parsing and subcommand dispatch for the `resolver` binary.

use crate::index::{self, CombineMode};
use crate::package::VersionedPackage;
use crate::resolver::{reduce_setup, render_oneline, render_tree, Resolver};
use crate::version::Version;
use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, author, about)]
pub struct Cli {
    /// Path to the index file to load.
    #[arg(short = 'I', long)]
    pub index: PathBuf,

    /// How multiple ranges given for the same requirement combine.
    #[arg(long, value_enum, default_value_t = Mode::Intersection)]
    pub mode: Mode,

    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    #[command(subcommand)]
    pub command: Command,
}

/// `clap`-facing mirror of [`CombineMode`] — the core stays free of a `clap` dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    Intersection,
    Union,
}

impl From<Mode> for CombineMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Intersection => CombineMode::Intersection,
            Mode::Union => CombineMode::Union,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the maximum known version of a package.
    Latest {
        /// Name of the package to look up.
        package: String,
    },
    /// Compute a setup that installs a given package at a given version.
    Satisfy {
        /// Name of the package to satisfy.
        package: String,
        /// Version of the package to satisfy.
        version: u32,
        /// Print the reduced setup as a single comma-joined line instead of a tree.
        #[arg(long)]
        oneline: bool,
    },
}

/// Entry point called from `main`; returns the process exit code.
pub fn run(cli: Cli) -> anyhow::Result<i32> {
    let text = std::fs::read_to_string(&cli.index)
        .with_context(|| format!("reading index file {}", cli.index.display()))?;
    let (index, deps) = index::load(&text, cli.mode.into()).context("loading index file")?;
    let resolver = Resolver::new(&index, &deps);

    match cli.command {
        Command::Latest { package } => match index.latest(&package) {
            Some(version) => {
                println!("{version}");
                Ok(0)
            }
            None => {
                println!("There is no package named '{package}'");
                Ok(0)
            }
        },
        Command::Satisfy {
            package,
            version,
            oneline,
        } => run_satisfy(&resolver, &deps, &package, Version::new(version), oneline),
    }
}

fn run_satisfy(
    resolver: &Resolver<'_>,
    deps: &crate::index::Dependencies,
    package: &str,
    version: Version,
    oneline: bool,
) -> anyhow::Result<i32> {
    let vp = VersionedPackage::new(package, version);
    let setup = resolver
        .solve(std::slice::from_ref(&vp))
        .context("solving for the requested package")?;

    let Some(setup) = setup else {
        println!("This package version can't be satisfied");
        return Ok(0);
    };

    let reduced = reduce_setup(deps, &setup, &[package]);

    if oneline {
        println!("{}", render_oneline(&reduced));
    } else {
        println!("This package can be satisfied with following packages:");
        print!("{}", render_tree(deps, &reduced, package));
    }

    Ok(0)
}
