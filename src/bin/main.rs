use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use ontology_importer::config::Config;
use ontology_importer::importer::Importer;
use ontology_importer::logger;
use ontology_importer::store::InMemoryEntityStore;

/// Imports an OWL ontology or a tagged JSON document as vocabularies, tags and nodes.
#[derive(Parser, Debug)]
#[command(name = "ontology-importer")]
#[command(version, about, long_about = None)]
struct Args {
    /// Source file (`.owl`, `.rdf` or `.json`)
    file: PathBuf,

    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Do not import vocabularies
    #[arg(long)]
    skip_vocabularies: bool,

    /// Do not import nodes
    #[arg(long)]
    skip_nodes: bool,

    /// Also create nodes for classes below the bundle classes
    #[arg(long)]
    classes_as_nodes: bool,

    /// With --classes-as-nodes, only leaf classes become nodes
    #[arg(long)]
    only_leaf_classes: bool,

    /// Replace vocabularies and nodes that already exist
    #[arg(long)]
    overwrite: bool,

    /// Size above which ontologies are streamed, e.g. `100MB`
    #[arg(long)]
    threshold: Option<String>,

    /// Print the mapped records as JSON instead of importing them
    #[arg(long)]
    dump: bool,
}

impl Args {
    fn config(&self) -> ontology_importer::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };
        let import = &mut config.import;
        import.import_vocabularies &= !self.skip_vocabularies;
        import.import_nodes &= !self.skip_nodes;
        import.classes_as_nodes |= self.classes_as_nodes;
        import.only_leaf_classes_as_nodes |= self.only_leaf_classes;
        import.overwrite |= self.overwrite;
        if let Some(threshold) = &self.threshold {
            import.streaming_threshold.clone_from(threshold);
        }
        import.validate()?;
        Ok(config)
    }
}

fn run(args: &Args) -> ontology_importer::Result<()> {
    let config = args.config()?;
    let _guard = logger::init(&config.logger)?;
    let importer = Importer::new(config.import.clone());

    if args.dump {
        let records = importer.records(&args.file)?;
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    let mut store = InMemoryEntityStore::new(config.import.overwrite);
    let summary = importer.run(&args.file, &mut store)?;
    for warning in &summary.warnings {
        eprintln!("{} {warning}", "warning:".yellow().bold());
    }
    println!("{}", summary.message().green());
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}
