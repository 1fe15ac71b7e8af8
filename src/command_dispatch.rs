//! Purpose: Hold top-level CLI command dispatch for `villagers`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: Each query command performs exactly the library query it is named after.
//! Invariants: Output envelopes are stable JSON objects keyed by the command's subject.

use super::*;

pub(super) fn dispatch_command(command: Command, source: &DataSource) -> Result<RunOutcome, Error> {
    let color_mode = source.color_mode;
    let cmd = command.name();
    match command {
        Command::Completion { shell } => {
            let mut cli = Cli::command();
            clap_complete::aot::generate(shell, &mut cli, "villagers", &mut io::stdout());
            Ok(RunOutcome::ok())
        }
        Command::Version => {
            emit_version_output(color_mode);
            Ok(RunOutcome::ok())
        }
        Command::Species => {
            let species = source.open(cmd).species_set()?;
            emit_json(json!({ "species": species }), color_mode);
            Ok(RunOutcome::ok())
        }
        Command::Villagers { species } => {
            let filter = SpeciesFilter::from(species);
            let names = source.open(cmd).villagers_by_species(&filter)?;
            let species = match &filter {
                SpeciesFilter::Any => Value::Null,
                SpeciesFilter::Only(species) => json!(species),
            };
            emit_json(json!({ "species": species, "villagers": names }), color_mode);
            Ok(RunOutcome::ok())
        }
        Command::Hobbies => {
            let groups = source.open(cmd).names_by_hobby()?;
            emit_json(hobby_groups_json(&groups), color_mode);
            Ok(RunOutcome::ok())
        }
        Command::Records { table } => {
            let records = source.open(cmd).all_records()?;
            if table {
                emit_table(
                    &["NAME", "SPECIES", "PERSONALITY", "HOBBY", "SAYING"],
                    &records_table_rows(&records),
                );
            } else {
                emit_json(records_json(&records)?, color_mode);
            }
            Ok(RunOutcome::ok())
        }
        Command::Motto { name } => {
            let motto = source.open(cmd).find_motto(&name)?;
            emit_json(json!({ "name": name, "motto": motto }), color_mode);
            Ok(RunOutcome::ok())
        }
        Command::Likeminded { name } => {
            let names = source.open(cmd).likeminded(&name)?;
            emit_json(json!({ "name": name, "villagers": names }), color_mode);
            Ok(RunOutcome::ok())
        }
    }
}
