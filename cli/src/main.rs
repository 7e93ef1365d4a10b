//! statebook CLI — read-only inspection of a saved-state document.
//!
//! # Usage
//!
//! ```text
//! statebook path [--file <name>] [--dir <path>]
//! statebook dump [--file <name>] [--dir <path>]
//! statebook classes [--file <name>] [--dir <path>]
//! statebook get <class> [property] [--file <name>] [--dir <path>]
//! ```

use std::process;

use statebook_core::{DocumentStore, SavedDocument, StoreConfig};

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    /// Print the resolved document path.
    Path,
    /// Print the whole document as JSON.
    Dump,
    /// List the class names present in the document.
    Classes,
    /// Print one class's records, or one property's value.
    Get {
        class: String,
        property: Option<String>,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Options {
    file: Option<String>,
    dir: Option<String>,
}

/// Parse CLI arguments into a typed Command plus store options.
///
/// Arguments are expected WITHOUT the program name (i.e., `args` should
/// be `["dump"]`, not `["statebook", "dump"]`).
fn parse_args(args: &[&str]) -> Result<(Command, Options), String> {
    if args.is_empty() {
        return Err("No command specified. Usage: statebook <path|dump|classes|get> [flags]".into());
    }

    let (positional, options) = split_flags(args)?;
    let command = match positional[0] {
        "path" => Command::Path,
        "dump" => Command::Dump,
        "classes" => Command::Classes,
        "get" => {
            if positional.len() < 2 {
                return Err("Usage: statebook get <class> [property]".into());
            }
            Command::Get {
                class: positional[1].to_string(),
                property: positional.get(2).map(|s| s.to_string()),
            }
        }
        other => return Err(format!("Unknown command: '{}'", other)),
    };
    Ok((command, options))
}

/// Separate `--file <name>` / `--dir <path>` flags from positional args.
fn split_flags<'a>(args: &[&'a str]) -> Result<(Vec<&'a str>, Options), String> {
    let mut positional = Vec::new();
    let mut options = Options::default();
    let mut i = 0;
    while i < args.len() {
        match args[i] {
            "--file" => {
                i += 1;
                options.file = Some(take_arg(args, i, "--file")?);
            }
            "--dir" => {
                i += 1;
                options.dir = Some(take_arg(args, i, "--dir")?);
            }
            flag if flag.starts_with("--") => {
                return Err(format!("Unknown flag: '{}'", flag));
            }
            value => positional.push(value),
        }
        i += 1;
    }
    if positional.is_empty() {
        return Err("No command specified. Usage: statebook <path|dump|classes|get> [flags]".into());
    }
    Ok((positional, options))
}

fn take_arg(args: &[&str], i: usize, flag: &str) -> Result<String, String> {
    args.get(i)
        .map(|s| s.to_string())
        .ok_or_else(|| format!("Missing value for {}", flag))
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

const DEFAULT_FILE: &str = "state.json";

fn open_store(options: &Options) -> DocumentStore {
    let mut config = StoreConfig::new(options.file.as_deref().unwrap_or(DEFAULT_FILE));
    if let Some(dir) = &options.dir {
        config = config.with_base_dir(dir);
    }
    DocumentStore::new(config)
}

fn load_document(store: &DocumentStore) -> Result<SavedDocument, String> {
    let path = store
        .document_path()
        .ok_or_else(|| "no document path configured".to_string())?;
    if !path.exists() {
        return Err(format!("no saved state at {}", path.display()));
    }
    store
        .load()
        .ok_or_else(|| format!("cannot read {}", path.display()))
}

fn run(command: Command, options: Options) -> Result<(), String> {
    let store = open_store(&options);
    match command {
        Command::Path => {
            let path = store
                .document_path()
                .ok_or_else(|| "no document path configured".to_string())?;
            println!("{}", path.display());
        }
        Command::Dump => {
            let doc = load_document(&store)?;
            let json = doc.to_json().map_err(|e| e.to_string())?;
            println!("{}", json);
        }
        Command::Classes => {
            let doc = load_document(&store)?;
            for class in doc.classes() {
                println!("{}", class);
            }
        }
        Command::Get { class, property } => {
            let doc = load_document(&store)?;
            match property {
                Some(property) => {
                    let record = doc
                        .property(&class, &property)
                        .ok_or_else(|| format!("no record for {}.{}", class, property))?;
                    match &record.value {
                        Some(value) => println!("{}", value),
                        None => println!("(nil)"),
                    }
                }
                None => print_class(&doc, &class)?,
            }
        }
    }
    Ok(())
}

fn print_class(doc: &SavedDocument, class: &str) -> Result<(), String> {
    if !doc.classes().contains(&class) {
        return Err(format!("no records for class '{}'", class));
    }
    for record in doc.properties_for(class) {
        match &record.value {
            Some(value) => println!("{} = {}", record.property, value),
            None => println!("{} = (nil)", record.property),
        }
    }
    for record in doc.lists_for(class) {
        println!("{} = [{}]", record.list, record.items.join(", "));
    }
    for record in doc.tuple_lists_for(class) {
        let pairs: Vec<String> = record
            .pairs
            .iter()
            .map(|(a, b)| format!("({}, {})", a, b))
            .collect();
        println!("{} = [{}]", record.list, pairs.join(", "));
    }
    Ok(())
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let arg_refs: Vec<&str> = args[1..].iter().map(|s| s.as_str()).collect();

    let (command, options) = match parse_args(&arg_refs) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("statebook: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run(command, options) {
        eprintln!("statebook: {}", e);
        process::exit(1);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
