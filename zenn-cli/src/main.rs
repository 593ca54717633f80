// Command-line interface for zenn Markdown
//
// This binary provides commands for inspecting, converting and table-editing Markdown files
// in the Zenn dialect. The heavy lifting lives in zenn-babel; this crate wires it to files,
// configuration and the terminal.
//
// Converting:
//
// The conversion needs a to and from pair. The from is auto-detected from the file extension,
// while being overwrittable by an explicit --from flag.
// Usage:
//  zenn-md <input> --to <format> [--from <format>] [--output <file>]  - Convert between formats (default)
//  zenn-md convert <input> --to <format> [--from <format>] [--output <file>]  - Same as above (explicit)
//  zenn-md inspect <path> [<transform>]      - Execute a transform (defaults to config, "tree-treeviz")
//  zenn-md table <path> <command> --cell <p> - Apply a table command and print the Markdown
//  zenn-md --list-transforms                 - List available transforms
//
// Extra Parameters:
//
// Configuration keys can be overridden per run with --extra-<parameter-name> <value>.
// Example:
//  zenn-md post.md --to markdown --extra-bullet-marker "*"

mod transforms;

use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use std::collections::HashMap;
use std::fs;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use zenn_babel::formats::{MarkdownFormat, MarkupFormat};
use zenn_babel::table::{EditorState, Path, TableCommand};
use zenn_babel::transforms::{parse_with_options, serialize_with_options};
use zenn_babel::FormatRegistry;
use zenn_config::{Loader, ZennConfig};

/// Parse extra-* arguments from command line args
/// Returns (cleaned_args_without_extras, extra_params_map)
///
/// Supports both:
/// - `--extra-<key> <value>` (explicit value)
/// - `--extra-<key>` (boolean flag, defaults to "true")
/// - `--extras-<key>` (alias for `--extra-<key>`)
fn parse_extra_args(args: &[String]) -> (Vec<String>, HashMap<String, String>) {
    let mut cleaned_args = Vec::new();
    let mut extra_params = HashMap::new();
    let mut i = 0;

    while i < args.len() {
        let arg = &args[i];

        let key_opt = if let Some(key) = arg.strip_prefix("--extra-") {
            Some(key)
        } else {
            arg.strip_prefix("--extras-")
        };

        if let Some(key) = key_opt {
            // a following non-flag argument is the value; dash runs are markers, not flags
            let has_value = args
                .get(i + 1)
                .is_some_and(|next| !next.starts_with('-') || next.chars().all(|c| c == '-'));

            if has_value {
                extra_params.insert(key.to_string(), args[i + 1].clone());
                i += 2;
            } else {
                extra_params.insert(key.to_string(), "true".to_string());
                i += 1;
            }
            continue;
        }

        cleaned_args.push(arg.clone());
        i += 1;
    }

    (cleaned_args, extra_params)
}

fn build_cli() -> Command {
    Command::new("zenn-md")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A tool for converting, inspecting and table-editing Zenn Markdown")
        .long_about(
            "zenn-md works with Markdown written in the Zenn dialect: embeds (@[card](url)),\n\
            math ($x$, $$...$$), mermaid fences and GFM tables.\n\n\
            Commands:\n  \
            - convert: Transform between document formats (markdown, markup, json, treeviz)\n  \
            - inspect: View internal representations (markup, document tree)\n  \
            - table:   Run a table command on the cell at a path\n\n\
            Extra Parameters:\n  \
            Use --extra-<name> [value] to override a configuration key for one run\n  \
            (embed-origin, front-matter, bullet-marker, emphasis-delimiter,\n  \
            strong-delimiter, horizontal-rule).\n\n\
            Examples:\n  \
            zenn-md inspect post.md                     # View tree visualization\n  \
            zenn-md inspect post.md markup-html         # View editor markup\n  \
            zenn-md post.md --to json                   # Document JSON (outputs to stdout)\n  \
            zenn-md post.md --to markdown -o clean.md   # Normalize Markdown into a file\n  \
            zenn-md table post.md add-row-after --cell 2.1.0",
        )
        .arg_required_else_help(true)
        .subcommand_required(false)
        .arg(
            Arg::new("list-transforms")
                .long("list-transforms")
                .help("List available transforms")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to a zenn.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log more (-v info, -vv debug, -vvv trace); RUST_LOG takes precedence")
                .action(ArgAction::Count)
                .global(true),
        )
        .subcommand(
            Command::new("inspect")
                .about("Inspect internal representations of a Markdown file")
                .long_about(
                    "View a Markdown file at different processing stages.\n\n\
                    Transforms (stage-format):\n  \
                    - markup-html:   Intermediate markup as HTML\n  \
                    - tree-json:     Document tree as JSON\n  \
                    - tree-outline:  Document tree on one line\n  \
                    - tree-treeviz:  Document tree visualization (default)\n\n\
                    Examples:\n  \
                    zenn-md inspect post.md                  # Tree visualization (default)\n  \
                    zenn-md inspect post.md tree-json        # Document JSON",
                )
                .arg(
                    Arg::new("path")
                        .help("Path to the Markdown file")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("transform")
                        .help("Transform to apply (stage-format). Defaults to 'tree-treeviz'")
                        .required(false)
                        .value_parser(clap::builder::PossibleValuesParser::new(
                            transforms::AVAILABLE_TRANSFORMS,
                        ))
                        .index(2)
                        .value_hint(ValueHint::Other),
                ),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert between document formats (default command)")
                .long_about(
                    "Convert documents between different formats.\n\n\
                    Supported formats:\n  \
                    - markdown: Zenn Markdown (.md)\n  \
                    - markup:   Editor markup HTML (.html)\n  \
                    - json:     Document tree JSON (.json)\n  \
                    - treeviz:  Tree visualization (output only)\n\n\
                    The source format is auto-detected from the file extension.\n\
                    Output goes to stdout by default, or use -o to specify a file.",
                )
                .arg(
                    Arg::new("input")
                        .help("Input file path")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("from")
                        .long("from")
                        .help("Source format (auto-detected from file extension if not specified)")
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("to")
                        .long("to")
                        .help("Target format (required)")
                        .required(true)
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output file path (defaults to stdout)")
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("table")
                .about("Apply a table command and print the resulting Markdown")
                .long_about(
                    "Run one table command against the table enclosing a cell.\n\n\
                    The cell is a dot-separated child-index path from the document root,\n\
                    e.g. 2.1.0 is block 2, row 1, cell 0. Paths reaching inside the cell\n\
                    work too.\n\n\
                    Commands:\n  \
                    add-row-before, add-row-after, delete-row,\n  \
                    add-column-before, add-column-after, delete-column, toggle-header-row",
                )
                .arg(
                    Arg::new("path")
                        .help("Path to the Markdown file")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("command")
                        .help("Table command (kebab-case or camelCase)")
                        .required(true)
                        .index(2)
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("cell")
                        .long("cell")
                        .value_name("PATH")
                        .help("Dot-separated path of the selected cell")
                        .required(true)
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output file path (defaults to stdout)")
                        .value_hint(ValueHint::FilePath),
                ),
        )
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let (cleaned_args, mut extra_params) = parse_extra_args(&args);

    let cli = build_cli();
    let matches = match cli.clone().try_get_matches_from(&cleaned_args) {
        Ok(m) => m,
        Err(e) => {
            // a bare file argument means the default convert command
            if cleaned_args.len() > 1
                && !cleaned_args[1].starts_with('-')
                && !matches!(
                    cleaned_args[1].as_str(),
                    "inspect" | "convert" | "table" | "help"
                )
            {
                let mut new_args = vec![cleaned_args[0].clone(), "convert".to_string()];
                new_args.extend_from_slice(&cleaned_args[1..]);

                match cli.try_get_matches_from(&new_args) {
                    Ok(m) => m,
                    Err(e2) => e2.exit(),
                }
            } else {
                e.exit();
            }
        }
    };

    init_logging(matches.get_count("verbose"));

    if matches.get_flag("list-transforms") {
        handle_list_transforms_command();
        return;
    }

    let mut config = load_cli_config(matches.get_one::<String>("config").map(|s| s.as_str()));
    apply_config_overrides(&mut config, &mut extra_params);
    for key in extra_params.keys() {
        eprintln!("Warning: ignoring unknown parameter --extra-{key}");
    }

    match matches.subcommand() {
        Some(("inspect", sub_matches)) => {
            let path = required_arg(sub_matches, "path");
            let transform = sub_matches
                .get_one::<String>("transform")
                .cloned()
                .unwrap_or_else(|| config.inspect.default_transform.clone());
            handle_inspect_command(path, &transform, &config);
        }
        Some(("convert", sub_matches)) => {
            let input = required_arg(sub_matches, "input");
            let to = required_arg(sub_matches, "to");
            let registry = registry_from_config(&config);

            let from = match sub_matches.get_one::<String>("from") {
                Some(f) => f.to_string(),
                None => match registry.detect_format_from_filename(input) {
                    Some(detected) => detected,
                    None => {
                        eprintln!("Error: Could not detect format from filename '{input}'");
                        eprintln!("Please specify --from explicitly");
                        std::process::exit(1);
                    }
                },
            };

            let output = sub_matches.get_one::<String>("output").map(|s| s.as_str());
            handle_convert_command(&registry, input, &from, to, output);
        }
        Some(("table", sub_matches)) => {
            let path = required_arg(sub_matches, "path");
            let command = required_arg(sub_matches, "command");
            let cell = required_arg(sub_matches, "cell");
            let output = sub_matches.get_one::<String>("output").map(|s| s.as_str());
            handle_table_command(path, command, cell, output, &config);
        }
        _ => {
            eprintln!("Unknown subcommand. Use --help for usage information.");
            std::process::exit(1);
        }
    }
}

/// Installs the stderr subscriber; `RUST_LOG` wins over `-v`.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn required_arg<'a>(matches: &'a ArgMatches, name: &str) -> &'a str {
    match matches.get_one::<String>(name) {
        Some(value) => value.as_str(),
        None => {
            eprintln!("Error: missing required argument <{name}>");
            std::process::exit(1);
        }
    }
}

fn read_input(path: &str) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{path}': {e}");
        std::process::exit(1);
    })
}

fn write_output(output: Option<&str>, text: &str) {
    match output {
        Some(path) => {
            fs::write(path, text).unwrap_or_else(|e| {
                eprintln!("Error writing file '{path}': {e}");
                std::process::exit(1);
            });
            info!(path, bytes = text.len(), "wrote output");
        }
        None if text.ends_with('\n') => print!("{text}"),
        None => println!("{text}"),
    }
}

/// Handle the inspect command
fn handle_inspect_command(path: &str, transform: &str, config: &ZennConfig) {
    let source = read_input(path);
    let output = transforms::execute_transform(&source, transform, &(&config.parse).into())
        .unwrap_or_else(|e| {
            eprintln!("Execution error: {e}");
            std::process::exit(1);
        });

    print!("{output}");
}

/// Handle the convert command
fn handle_convert_command(
    registry: &FormatRegistry,
    input: &str,
    from: &str,
    to: &str,
    output: Option<&str>,
) {
    for name in [from, to] {
        if let Err(e) = registry.get(name) {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }

    let source = read_input(input);
    debug!(input, from, to, "converting");

    let doc = registry.parse(&source, from).unwrap_or_else(|e| {
        eprintln!("Parse error: {e}");
        std::process::exit(1);
    });

    let result = registry.serialize(&doc, to).unwrap_or_else(|e| {
        eprintln!("Serialization error: {e}");
        std::process::exit(1);
    });

    write_output(output, &result);
}

/// Handle the table command
fn handle_table_command(
    path: &str,
    command: &str,
    cell: &str,
    output: Option<&str>,
    config: &ZennConfig,
) {
    let Some(command) = TableCommand::from_name(command) else {
        let names: Vec<&str> = TableCommand::ALL.iter().map(|c| c.name()).collect();
        eprintln!(
            "Error: unknown table command '{command}'. Available: {}",
            names.join(", ")
        );
        std::process::exit(1);
    };
    let selection: Path = cell.parse().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });

    let source = read_input(path);
    let doc = parse_with_options(&source, &(&config.parse).into());
    let mut state = EditorState::new(doc, selection);

    if let Err(e) = state.apply(command) {
        eprintln!("Table error: {e}");
        std::process::exit(1);
    }

    let markdown = serialize_with_options(&state.doc, &(&config.serialize).into());
    write_output(output, &markdown);
}

/// Handle the list-transforms command
fn handle_list_transforms_command() {
    println!("Available transforms:\n");
    println!("Stages:");
    println!("  markup  - Intermediate markup (Markdown parsed, embeds and math resolved)");
    println!("  tree    - Document tree (final editor document)\n");

    println!("Formats:");
    println!("  html    - HTML (markup only)");
    println!("  json    - Document JSON (tree only)");
    println!("  outline - One-line outline (tree only)");
    println!("  treeviz - Tree visualization (tree only)\n");

    println!("Available transform combinations:");
    for transform_name in transforms::AVAILABLE_TRANSFORMS {
        println!("  {transform_name}");
    }

    println!("\nConversion formats:");
    let registry = FormatRegistry::default();
    for format_name in registry.list_formats() {
        println!("  {format_name}");
    }

    println!("\nTable commands:");
    for command in TableCommand::ALL {
        println!("  {}", command.name());
    }
}

fn load_cli_config(explicit_path: Option<&str>) -> ZennConfig {
    let loader = Loader::new().with_optional_file("zenn.toml");
    let loader = if let Some(path) = explicit_path {
        loader.with_file(path)
    } else {
        loader
    };

    loader.build().unwrap_or_else(|err| {
        eprintln!("Failed to load configuration: {err}");
        std::process::exit(1);
    })
}

/// Formats built with the configured parse and serialize options.
fn registry_from_config(config: &ZennConfig) -> FormatRegistry {
    let mut registry = FormatRegistry::default();
    registry.register(MarkdownFormat::new(
        (&config.parse).into(),
        (&config.serialize).into(),
    ));
    registry.register(MarkupFormat::new(config.parse.embed_origin.clone()));
    registry
}

fn apply_config_overrides(config: &mut ZennConfig, extra_params: &mut HashMap<String, String>) {
    if let Some(raw) = extra_params.remove("embed-origin") {
        config.parse.embed_origin = raw;
    }
    if let Some(raw) = extra_params.remove("front-matter") {
        config.parse.front_matter = parse_bool_arg("front-matter", &raw);
    }

    if let Some(raw) = take_override(extra_params, &["bullet-marker", "bullet"]) {
        config.serialize.bullet_marker = parse_char_arg("bullet-marker", &raw);
    }
    if let Some(raw) = take_override(extra_params, &["emphasis-delimiter", "em"]) {
        config.serialize.emphasis_delimiter = parse_char_arg("emphasis-delimiter", &raw);
    }
    if let Some(raw) = take_override(extra_params, &["strong-delimiter", "strong"]) {
        config.serialize.strong_delimiter = raw;
    }
    if let Some(raw) = take_override(extra_params, &["horizontal-rule", "hr"]) {
        config.serialize.horizontal_rule = raw;
    }
}

fn take_override(map: &mut HashMap<String, String>, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(value) = map.remove(*key) {
            return Some(value);
        }
    }
    None
}

fn parse_bool_arg(flag: &str, raw: &str) -> bool {
    match raw.to_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => true,
        "false" | "0" | "no" | "n" => false,
        other => {
            eprintln!("Invalid boolean value '{other}' for --extra-{flag}");
            std::process::exit(1);
        }
    }
}

fn parse_char_arg(flag: &str, raw: &str) -> char {
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => c,
        _ => {
            eprintln!("Invalid single character '{raw}' for --extra-{flag}");
            std::process::exit(1);
        }
    }
}
