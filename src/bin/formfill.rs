//! Command-line fill: `formfill <form-id> <values.json> <output.pdf>`.
//!
//! The values file is a JSON object of field name to value. Template and
//! sender-data locations come from the environment (`FORM_TEMPLATE_DIR`,
//! `OUTPUT_DIR` for generated secondary forms).

use std::collections::BTreeMap;
use std::process::ExitCode;

use formfill::config::Settings;
use formfill::fill::{fill, MutationPlan};
use formfill::forms::registry;
use formfill::pipeline::{derive_s0050, load_sender_data, run_passes, PassContext};
use formfill::schema::FieldStatus;

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 4 {
        eprintln!("usage: formfill <form-id> <values.json> <output.pdf>");
        return ExitCode::from(2);
    }
    let (form_id, values_path, output_path) = (&args[1], &args[2], &args[3]);

    match run(form_id, values_path, output_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        },
    }
}

fn run(form_id: &str, values_path: &str, output_path: &str) -> formfill::Result<()> {
    let settings = Settings::from_env();
    let entry = registry().get(form_id)?;

    let values: BTreeMap<String, String> =
        serde_json::from_str(&std::fs::read_to_string(values_path)?)?;

    let mut fields = entry.definition.instantiate();
    for field in &mut fields {
        if let Some(value) = values.get(&field.name) {
            field.set_value(value.clone(), FieldStatus::Manual);
        }
    }

    let ctx = PassContext {
        sender: load_sender_data(settings.sender_data_path()),
    };
    run_passes(form_id, &mut fields, &ctx);

    let template = settings.template_path(&entry.template_filename);
    let plan = MutationPlan::build(&fields);
    let outcome = fill(&template, output_path, &plan, &entry.burn_in)?;
    println!(
        "{}: {} of {} entries filled, {} warnings",
        output_path,
        outcome.filled,
        outcome.attempted,
        outcome.warnings.len()
    );

    // Secondary forms (S0051 generates the S0050 invoice).
    for generated_id in &entry.generates {
        let generated = registry().get(generated_id)?;
        let derived = derive_s0050(&fields, &ctx);
        let plan = MutationPlan::build(&derived);
        let out = settings
            .output_dir
            .join(format!("{}_ausgefuellt.pdf", generated_id));
        let template = settings.template_path(&generated.template_filename);
        match fill(&template, &out, &plan, &generated.burn_in) {
            Ok(o) => println!("{}: {} of {} entries filled", out.display(), o.filled, o.attempted),
            Err(e) => eprintln!("warning: could not generate {}: {}", generated_id, e),
        }
    }

    Ok(())
}
