//! The `fetch` subcommand: pull the source datasets into the static directory.

use anyhow::Result;

use crate::cli::{Cli, FetchArgs};

#[cfg(feature = "download")]
pub fn run(cli: &Cli, args: &FetchArgs) -> Result<()> {
    use crate::cli::FetchTarget;

    crate::common::ensure_dir_exists(&args.static_dir)?;

    match args.target {
        FetchTarget::Certificates => certificates(cli, args),
        FetchTarget::Income => income(cli, args),
        FetchTarget::Municipis => municipis(cli, args),
        FetchTarget::All => {
            certificates(cli, args)?;
            income(cli, args)?;
            municipis(cli, args)
        }
    }
}

#[cfg(not(feature = "download"))]
pub fn run(_cli: &Cli, _args: &FetchArgs) -> Result<()> {
    anyhow::bail!("fetch requires a build with the `download` feature")
}

#[cfg(feature = "download")]
fn certificates(cli: &Cli, args: &FetchArgs) -> Result<()> {
    let path =
        crate::fetch::fetch_certificates(&args.static_dir, args.limit, args.force, cli.verbose)?;
    println!("Fetched certificates into {}", path.display());
    Ok(())
}

#[cfg(feature = "download")]
fn income(cli: &Cli, args: &FetchArgs) -> Result<()> {
    use crate::common::{write_atomic, write_json_frame_bytes};
    use crate::fetch;

    let client = fetch::client()?;
    let lookup = fetch::fetch_sections_lookup(&client)?;
    let short_codes = fetch::short_code_map(&lookup)?;
    let income = fetch::fetch_income(&client, &short_codes, cli.verbose)?;

    let path = args.static_dir.join(fetch::INCOME_FILE);
    write_atomic(&path, &write_json_frame_bytes(&income)?, args.force)?;
    println!("Fetched {} income rows into {}", income.height(), path.display());
    Ok(())
}

#[cfg(feature = "download")]
fn municipis(cli: &Cli, args: &FetchArgs) -> Result<()> {
    use crate::common::write_atomic;
    use crate::fetch;

    let client = fetch::client()?;
    let entries = fetch::fetch_municipal_population(&client, cli.verbose)?;

    let path = args.static_dir.join(fetch::POB_FILE);
    write_atomic(&path, &serde_json::to_vec_pretty(&entries)?, args.force)?;
    println!("Fetched {} municipalities into {}", entries.len(), path.display());
    Ok(())
}
