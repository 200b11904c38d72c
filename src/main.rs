//! Form Canvas CLI
//!
//! Usage:
//!   form-canvas [OPTIONS] [FILE]
//!
//! Options:
//!   -c, --config <FILE>     Drop detection thresholds (TOML format)
//!   -s, --schema <FILE>     Property schema overrides (TOML format)
//!   --validate              Validate the form and report errors
//!   --values <FILE>         Entered values for --validate (JSON object, id -> value)
//!   --pointer <X,Y>         Show the drop intent at a pointer position
//!   -g, --geometry <FILE>   Rendered element bounds for --pointer (TOML format)
//!   --describe <TYPE>       Show the property schema of an element type
//!   --save <DIR>            Persist the normalised form into a storage directory
//!   -d, --debug             Print the grid to stderr and enable debug logging
//!   -h, --help              Print help

use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use form_canvas::layout::GeometrySnapshot;
use form_canvas::schema::{FormValues, Schema};
use form_canvas::store::DEFAULT_STORAGE_KEY;
use form_canvas::{
    validate_form, DropConfig, DropResolver, ElementStore, ElementType, FileStorage, FormState,
    Point, SchemaRegistry,
};

#[derive(Parser)]
#[command(name = "form-canvas")]
#[command(about = "Inspect, validate, and hit-test visual form layouts")]
struct Cli {
    /// Form state JSON file (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Drop detection thresholds (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Property schema overrides (TOML format)
    #[arg(short, long)]
    schema: Option<PathBuf>,

    /// Validate the form and report errors
    #[arg(long)]
    validate: bool,

    /// Entered values for --validate (JSON object mapping element id to value)
    #[arg(long)]
    values: Option<PathBuf>,

    /// Show the drop intent at a pointer position, e.g. --pointer 120,48
    #[arg(long, value_parser = parse_point)]
    pointer: Option<Point>,

    /// Rendered element bounds for --pointer (TOML format)
    #[arg(short, long)]
    geometry: Option<PathBuf>,

    /// Show the property schema of an element type
    #[arg(long)]
    describe: Option<ElementType>,

    /// Persist the normalised form into a storage directory
    #[arg(long)]
    save: Option<PathBuf>,

    /// Debug mode: print the grid to stderr and enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn parse_point(s: &str) -> Result<Point, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got '{}'", s))?;
    let x: f64 = x.trim().parse().map_err(|e| format!("bad x '{}': {}", x, e))?;
    let y: f64 = y.trim().parse().map_err(|e| format!("bad y '{}': {}", y, e))?;
    Ok(Point::new(x, y))
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let registry = match &cli.schema {
        Some(path) => match SchemaRegistry::from_file(path) {
            Ok(r) => r,
            Err(e) => {
                eprintln!("Error loading schema '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => SchemaRegistry::default(),
    };

    // Schema description needs no form input
    if let Some(element_type) = cli.describe {
        match registry.schema(element_type) {
            Some(schema) => print_schema(element_type, schema),
            None => {
                eprintln!("No schema defined for '{}'", element_type);
                std::process::exit(1);
            }
        }
        return;
    }

    // If no input file and stdin is a terminal (interactive), show intro help
    if cli.input.is_none() && io::stdin().is_terminal() {
        print_intro();
        return;
    }

    let (source, filename) = read_input(cli.input.as_deref());

    let state = match FormState::from_json(&source) {
        Ok(state) => state,
        Err(e) => {
            eprint!("{}", e.format(&source, &filename));
            std::process::exit(1);
        }
    };

    if cli.debug {
        print_grid(&state);
    }

    if let Some(dir) = &cli.save {
        save_state(dir, &source);
    }

    if let Some(pointer) = cli.pointer {
        show_intent(&cli, &state, pointer);
        return;
    }

    if cli.validate {
        validate(&cli, &state);
        return;
    }

    match state.to_json() {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn read_input(path: Option<&Path>) -> (String, String) {
    match path {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => (content, path.display().to_string()),
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => (buffer, "<stdin>".to_string()),
                Err(e) => {
                    eprintln!("Error reading from stdin: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }
}

fn save_state(dir: &Path, source: &str) {
    let mut store = ElementStore::open(FileStorage::new(dir), DEFAULT_STORAGE_KEY);
    if let Err(e) = store.import_from_json(source) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    eprintln!(
        "Saved {} element(s) to {}",
        store.element_count(),
        store.storage().path_for(DEFAULT_STORAGE_KEY).display()
    );
}

fn show_intent(cli: &Cli, state: &FormState, pointer: Point) {
    let config = match &cli.config {
        Some(path) => match DropConfig::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => DropConfig::default(),
    };

    let geometry = match &cli.geometry {
        Some(path) => match GeometrySnapshot::from_file(path) {
            Ok(g) => g,
            Err(e) => {
                eprintln!("Error loading geometry '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => {
            eprintln!("Error: --pointer needs --geometry");
            std::process::exit(1);
        }
    };

    match DropResolver::new(config).resolve(pointer, &state.grid, &geometry) {
        Some(intent) => match serde_json::to_string_pretty(&intent) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
        None => println!("no drop target at {},{}", pointer.x, pointer.y),
    }
}

fn validate(cli: &Cli, state: &FormState) {
    let values: FormValues = match &cli.values {
        Some(path) => {
            let parsed = fs::read_to_string(path)
                .map_err(|e| e.to_string())
                .and_then(|content| serde_json::from_str(&content).map_err(|e| e.to_string()));
            match parsed {
                Ok(values) => values,
                Err(e) => {
                    eprintln!("Error loading values '{}': {}", path.display(), e);
                    std::process::exit(1);
                }
            }
        }
        None => FormValues::new(),
    };

    let result = validate_form(state, &values, &[]);
    if result.is_valid() {
        println!("Form is valid");
        return;
    }
    for error in &result.errors {
        println!("{}", error);
    }
    std::process::exit(1);
}

fn print_grid(state: &FormState) {
    eprintln!("=== Grid ===");
    for (r, row) in state.grid.rows().iter().enumerate() {
        let cells: Vec<String> = row
            .iter()
            .map(|e| format!("{} ({}) \"{}\"", e.id, e.element_type, e.label()))
            .collect();
        eprintln!("row {}: {}", r, cells.join(" | "));
    }
    eprintln!("=== End Grid ===");
}

fn print_schema(element_type: ElementType, schema: &Schema) {
    println!("{} ({})", schema.label, element_type);
    for section in &schema.sections {
        println!();
        println!("[{}]", section.label);
        for group in &section.groups {
            println!("  {}", group.label);
            for definition in &group.properties {
                let mut line = format!(
                    "    {:<16} {:<28} {:?}",
                    definition.name, definition.label, definition.kind
                );
                if definition.required {
                    line.push_str(" required");
                }
                if let Some(default) = &definition.default {
                    line.push_str(&format!(" default={}", default));
                }
                if definition.condition.is_some() {
                    line.push_str(" (conditional)");
                }
                println!("{}", line);
            }
        }
    }
}

fn print_intro() {
    println!(
        r#"Form Canvas - inspect, validate, and hit-test visual form layouts

USAGE:
    form-canvas [OPTIONS] [FILE]
    cat form.json | form-canvas

OPTIONS:
    -c, --config       Drop detection thresholds (TOML file)
    -s, --schema       Property schema overrides (TOML file)
    --validate         Validate the form and report errors
    --values           Entered values for --validate (JSON file)
    --pointer X,Y      Show the drop intent at a pointer position
    -g, --geometry     Rendered element bounds for --pointer (TOML file)
    --describe TYPE    Show the property schema of an element type
    --save DIR         Persist the normalised form into a storage directory
    -d, --debug        Print the grid and enable debug logging
    -h, --help         Print help

ELEMENT TYPES:
    input, textarea, select, checkbox, radio-group, button, container

QUICK START:
    form-canvas form.json --validate
    form-canvas form.json --pointer 120,48 --geometry bounds.toml"#
    );
}
