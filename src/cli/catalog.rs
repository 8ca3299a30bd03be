use std::path::PathBuf;

use clap::Parser;

use crate::{cli::load_catalog, prelude::*};

#[must_use]
#[derive(Parser)]
pub struct CatalogArgs {
    /// TOML file replacing the built-in capacitor-bank catalog.
    #[clap(long = "catalog", env = "TAPIR_CATALOG")]
    pub catalog: Option<PathBuf>,
}

/// Dump the active catalog, so a copy can be edited and passed back in.
pub fn catalog(args: &CatalogArgs) -> Result {
    let catalog = load_catalog(args.catalog.as_deref())?;
    println!("{}", toml::to_string_pretty(&catalog)?);
    Ok(())
}
