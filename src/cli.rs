mod catalog;
mod losses;
mod nameplate;
mod plan;

use std::{fs, path::Path};

use clap::{Parser, Subcommand};

pub use self::{catalog::catalog, plan::plan};
use self::{catalog::CatalogArgs, plan::PlanArgs};
use crate::{catalog::CapacitorCatalog, prelude::*};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compute the load-loss test plan and print it.
    #[clap(name = "plan")]
    Plan(Box<PlanArgs>),

    /// Print the active capacitor-bank catalog.
    #[clap(name = "catalog")]
    Catalog(CatalogArgs),
}

/// The built-in catalog, unless a TOML replacement is given.
fn load_catalog(path: Option<&Path>) -> Result<CapacitorCatalog> {
    match path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read `{}`", path.display()))?;
            CapacitorCatalog::from_toml_str(&raw)
                .with_context(|| format!("failed to parse `{}`", path.display()))
        }
        None => Ok(CapacitorCatalog::default()),
    }
}
