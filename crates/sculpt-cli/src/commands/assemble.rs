use crate::cli::AssembleArgs;
use crate::error::{CliError, Result};
use sculpt::core::assembly;
use sculpt::core::io::pdb;
use sculpt::core::models::kind::COMPOSITION_NAMES;
use sculpt::core::tables::{self, PhiPsiEnergyTable};
use sculpt::core::topology::registry::TemplateRegistry;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

pub fn run(args: AssembleArgs) -> Result<()> {
    if !args.data_dir.is_dir() {
        return Err(CliError::Argument(format!(
            "data directory '{}' does not exist",
            args.data_dir.display()
        )));
    }
    let registry = TemplateRegistry::load(
        &args.data_dir.join("residues.toml"),
        &args.data_dir.join("patches.toml"),
    )?;
    info!(
        "Loaded {} residue templates from {}.",
        registry.residue_count(),
        args.data_dir.display()
    );

    let input = File::open(&args.input).map_err(|e| {
        CliError::Other(anyhow::anyhow!(
            "failed to open input '{}': {}",
            args.input.display(),
            e
        ))
    })?;
    let mut structure = assembly::build_structure(BufReader::new(input), &registry)?;
    if let Some(stem) = args.input.file_stem().and_then(|s| s.to_str()) {
        structure
            .set_name(stem)
            .map_err(|e| CliError::Structure(e.into()))?;
    }
    info!(
        "Assembled structure '{}': {} chain(s).",
        structure.name(),
        structure.chain_count()
    );
    for chain in structure.chains() {
        debug!(
            "Chain {} ({}): {} residue(s).",
            chain.name,
            chain.kind,
            chain.residue_count()
        );
    }

    if let Some(ligand_path) = &args.ligand {
        let reader = BufReader::new(File::open(ligand_path)?);
        assembly::attach_ligand(&mut structure, reader, &registry)?;
        info!("Attached ligand from {}.", ligand_path.display());
    }

    structure.compute_residue_contacts();

    if args.propensity_table.is_some() || args.rama_table.is_some() {
        let propensity = load_table(args.propensity_table.as_deref())?;
        let rama = load_table(args.rama_table.as_deref())?;
        tables::assign_propensity_and_rama(&mut structure, &propensity, &rama);
        info!("Assigned backbone-dependent energies.");
    }

    match &args.output {
        Some(path) => {
            let mut out = BufWriter::new(File::create(path)?);
            pdb::write_structure(&structure, &mut out)?;
            out.flush()?;
            info!("Wrote structure to {}.", path.display());
        }
        None => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            pdb::write_structure(&structure, &mut out)?;
        }
    }

    if args.composition {
        let tally = structure.amino_acid_composition();
        println!("Amino-acid composition of '{}':", structure.name());
        for (name, count) in COMPOSITION_NAMES.iter().zip(tally) {
            println!("  {name} {count}");
        }
    }
    Ok(())
}

fn load_table(path: Option<&Path>) -> Result<PhiPsiEnergyTable> {
    match path {
        Some(path) => Ok(PhiPsiEnergyTable::load(path)?),
        None => Ok(PhiPsiEnergyTable::default()),
    }
}
