use std::path::PathBuf;

use clap::Parser;

use crate::{
    cli::{load_catalog, losses::LossArgs, nameplate::NameplateArgs},
    core::Planner,
    prelude::*,
    tables::print_study,
};

#[must_use]
#[derive(Parser)]
pub struct PlanArgs {
    #[clap(flatten)]
    pub nameplate: NameplateArgs,

    #[clap(flatten)]
    pub losses: LossArgs,

    /// TOML file replacing the built-in capacitor-bank catalog.
    #[clap(long = "catalog", env = "TAPIR_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Emit the study as JSON instead of tables.
    #[clap(long = "json")]
    pub json: bool,
}

#[instrument(skip_all)]
pub fn plan(args: &PlanArgs) -> Result {
    let catalog = load_catalog(args.catalog.as_deref())?;
    let nameplate = args.nameplate.to_nameplate();
    let losses = args.losses.to_measurement();

    let study = Planner::builder()
        .nameplate(&nameplate)
        .losses(&losses)
        .catalog(&catalog)
        .build()
        .plan()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&study)?);
    } else {
        print_study(&study);
    }
    Ok(())
}
