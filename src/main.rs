
use indicatif::ParallelProgressIterator;
use log::{LevelFilter, debug, error, info, warn};
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Instant;
use strum::IntoEnumIterator;

use smile::aggregator::aggregate_family;
use smile::cli::common::{DatasetArgs, LearnerInputArgs};
use smile::cli::core::{Commands, get_cli};
use smile::cli::generate::{GenerateSettings, check_generate_settings};
use smile::cli::run::{RunSettings, check_run_settings};
use smile::cli::score::{ScoreSettings, check_score_settings};
use smile::data_types::observation::ObservationMatrix;
use smile::data_types::variant_id::{VariantFamily, VariantId};
use smile::data_types::work_layout::{WorkLayout, dataset_name_from_path};
use smile::learner::{LearnerConfigBuilder, LearnerError, failed_families, render_run_script, run_learner};
use smile::parsing::dataset::load_dataset;
use smile::util::json_io::save_json;
use smile::util::progress_bar::get_progress_style;
use smile::variant_generator::generate_variants;
use smile::writers::divergence_csv::write_family_outputs;
use smile::writers::variant_input::VariantInputWriter;

fn init_logging(verbosity: u8) {
    let filter_level: LevelFilter = match verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace
    };
    env_logger::builder()
        .format_timestamp_millis()
        .filter_level(filter_level)
        .init();
}

/// Creates a folder or exits
fn create_folder(folder: &Path, label: &str) {
    info!("Creating {label} at {folder:?}...");
    if let Err(e) = std::fs::create_dir_all(folder) {
        error!("Error while creating {label}: {e}");
        std::process::exit(exitcode::IOERR);
    }
}

/// Saves the effective settings next to the variant folders or exits
fn save_settings<T: serde::Serialize>(settings: &T, work_folder: &Path) {
    let cli_json = work_folder.join("cli_settings.json");
    info!("Saving CLI options to {cli_json:?}...");
    if let Err(e) = save_json(settings, &cli_json) {
        error!("Error while saving CLI options: {e:#}");
        std::process::exit(exitcode::IOERR);
    }
}

/// Step 1: loads the source table and derives the work layout, or exits
fn load_observation(dataset: &DatasetArgs) -> (ObservationMatrix, WorkLayout) {
    info!("Step 1: Reading the input table...");
    let observation = match load_dataset(&dataset.input_fn) {
        Ok(o) => o,
        Err(e) => {
            error!("Error while loading {:?}: {e:#}", dataset.input_fn);
            std::process::exit(exitcode::DATAERR);
        }
    };
    info!("\tRow number: {}", observation.row_number());
    info!("\tColumn number: {}", observation.column_number());
    info!("\tStage number: {}", observation.stage_number());
    info!("\tGene number: {}", observation.gene_number());
    info!("\tParameter (k): {}", dataset.k);
    debug!("Gene names: {:?}", observation.gene_names());

    let layout = WorkLayout::new(
        dataset.work_folder.clone(), dataset_name_from_path(&dataset.input_fn), dataset.k
    );
    (observation, layout)
}

/// Step 2: renders the run script and writes every variant folder in both families, or exits.
/// Returns every `(variant, family)` pair that was written.
fn prepare_variants(observation: &ObservationMatrix, layout: &WorkLayout, learner_inputs: &LearnerInputArgs) -> Vec<(VariantId, VariantFamily)> {
    info!("Step 2: Generating the learner input folders...");
    let script_fn = layout.run_script_path();
    if let Err(e) = render_run_script(&learner_inputs.run_script, layout.k(), &script_fn) {
        error!("Error while rendering run script: {e:#}");
        std::process::exit(exitcode::IOERR);
    }
    info!("\tRendered run script to {script_fn:?}");

    let variants = match generate_variants(observation.cells(), observation.stage_number(), observation.gene_number()) {
        Ok(v) => v,
        Err(e) => {
            error!("Error while generating variants: {e}");
            std::process::exit(exitcode::DATAERR);
        }
    };

    let input_writer = VariantInputWriter::new(learner_inputs.banlist.clone(), learner_inputs.whitelist.clone());
    let mut jobs = Vec::with_capacity(2 * variants.len());
    for generated in variants.iter() {
        for family in VariantFamily::iter() {
            let variant = generated.variant();
            let variant_dir = layout.variant_dir(variant, family);
            if let Err(e) = input_writer.write_variant(&variant_dir, generated.matrix(family)) {
                error!("Error while writing {family} variant {variant}: {e:#}");
                std::process::exit(exitcode::IOERR);
            }
            jobs.push((variant, family));
        }
    }
    info!("\tWrote {} variant folders to {:?}", jobs.len(), layout.work_folder());
    jobs
}

/// Step 3: runs the learner on every prepared folder in parallel.
/// Returns the failures; they are logged but the remaining runs continue.
fn run_all_learners(settings: &RunSettings, layout: &WorkLayout, jobs: Vec<(VariantId, VariantFamily)>) -> Vec<LearnerError> {
    info!("Step 3: Running the learner on {} variant folders...", jobs.len());
    let learner_config = match LearnerConfigBuilder::default()
        .script(layout.run_script_path())
        .shell(settings.shell.clone())
        .timeout(settings.timeout())
        .build() {
        Ok(lc) => lc,
        Err(e) => {
            error!("Error while building learner config: {e:?}");
            std::process::exit(exitcode::SOFTWARE);
        }
    };

    let style = get_progress_style();
    let outcomes: Vec<Result<(), LearnerError>> = jobs.into_par_iter()
        .map(|(variant, family)| {
            let variant_dir = layout.variant_dir(variant, family);
            run_learner(&learner_config, variant, family, &variant_dir)
                .map(|output| {
                    debug!("{family} {variant} => {:?} in {} seconds", output.result_path(), output.elapsed().as_secs_f64());
                })
        })
        .progress_with_style(style)
        .collect();

    let failures: Vec<LearnerError> = outcomes.into_iter()
        .filter_map(|r| r.err())
        .collect();
    for e in failures.iter() {
        error!("Learner failure: {e:#}");
    }
    failures
}

/// Step 4: scores each family independently and writes its tables.
/// Families in `skip_families` are counted as failed without looking at their outputs.
/// Returns the number of families that could not be scored.
fn score_all_families(observation: &ObservationMatrix, layout: &WorkLayout, output_folder: &Path, skip_families: &BTreeSet<VariantFamily>) -> usize {
    info!("Step 4: Calculating the Jensen-Shannon divergence between learned networks...");
    let gene_names = observation.gene_names();
    let mut unscored_families = 0;
    for family in VariantFamily::iter() {
        if skip_families.contains(&family) {
            error!("Skipping the {family} family because of learner failures, no output written");
            unscored_families += 1;
            continue;
        }

        let table = match aggregate_family(layout, family, &gene_names, observation.stage_number()) {
            Ok(t) => t,
            Err(e) => {
                error!("Error while scoring the {family} family, no output written: {e:#}");
                unscored_families += 1;
                continue;
            }
        };

        if let Err(e) = write_family_outputs(&table, output_folder, layout.dataset_name(), family) {
            error!("Error while saving {family} outputs: {e:#}");
            std::process::exit(exitcode::IOERR);
        }
    }
    unscored_families
}

fn run_pipeline(settings: RunSettings) {
    // start the timer
    let start_time = Instant::now();

    // set up logging before we check the other settings
    init_logging(settings.verbosity);
    let settings = match check_run_settings(settings) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while verifying settings: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };

    // set up the number of threads for rayon
    match rayon::ThreadPoolBuilder::new().num_threads(settings.threads).build_global() {
        Ok(()) => {},
        Err(e) => {
            error!("Error while building thread pool: {e}");
            std::process::exit(exitcode::OSERR);
        }
    };

    create_folder(&settings.dataset.work_folder, "work folder");
    create_folder(&settings.output_folder, "output folder");
    save_settings(&settings, &settings.dataset.work_folder);

    let (observation, layout) = load_observation(&settings.dataset);
    let jobs = prepare_variants(&observation, &layout, &settings.learner_inputs);
    let learner_failures = run_all_learners(&settings, &layout, jobs);
    let failed_learner_families = failed_families(&learner_failures);
    if !learner_failures.is_empty() {
        warn!("{} learner runs failed, affected families will not be scored: {failed_learner_families:?}", learner_failures.len());
    }
    let unscored_families = score_all_families(&observation, &layout, &settings.output_folder, &failed_learner_families);

    info!("Pipeline completed in {} seconds.", start_time.elapsed().as_secs_f64());
    if !learner_failures.is_empty() || unscored_families > 0 {
        error!("Learner failures: {}; unscored families: {unscored_families}", learner_failures.len());
        std::process::exit(exitcode::SOFTWARE);
    }
}

fn run_generate(settings: GenerateSettings) {
    let start_time = Instant::now();
    init_logging(settings.verbosity);
    let settings = match check_generate_settings(settings) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while verifying settings: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };

    create_folder(&settings.dataset.work_folder, "work folder");
    save_settings(&settings, &settings.dataset.work_folder);

    let (observation, layout) = load_observation(&settings.dataset);
    prepare_variants(&observation, &layout, &settings.learner_inputs);
    info!("Generation completed in {} seconds.", start_time.elapsed().as_secs_f64());
}

fn run_score(settings: ScoreSettings) {
    let start_time = Instant::now();
    init_logging(settings.verbosity);
    let settings = match check_score_settings(settings) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while verifying settings: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };

    create_folder(&settings.output_folder, "output folder");
    let (observation, layout) = load_observation(&settings.dataset);
    let unscored_families = score_all_families(&observation, &layout, &settings.output_folder, &BTreeSet::new());

    info!("Scoring completed in {} seconds.", start_time.elapsed().as_secs_f64());
    if unscored_families > 0 {
        std::process::exit(exitcode::SOFTWARE);
    }
}

fn main() {
    let cli = get_cli();
    match cli.command {
        Commands::Run(settings) => {
            run_pipeline(*settings);
        },
        Commands::Generate(settings) => {
            run_generate(*settings);
        },
        Commands::Score(settings) => {
            run_score(*settings);
        }
    }

    info!("Process finished successfully.");
}
