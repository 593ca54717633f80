use clap::{Arg, ArgAction, Command, ValueHint};
use clap_complete::{generate_to, shells::*};
use std::env;
use std::io::Error;

// Mirror of the transforms from src/transforms.rs
// We need to duplicate this here since build scripts can't access src/ modules
const AVAILABLE_TRANSFORMS: &[&str] = &["markup-html", "tree-json", "tree-outline", "tree-treeviz"];

const TABLE_COMMANDS: &[&str] = &[
    "add-row-before",
    "add-row-after",
    "delete-row",
    "add-column-before",
    "add-column-after",
    "delete-column",
    "toggle-header-row",
];

const FORMATS: &[&str] = &["json", "markdown", "markup", "treeviz"];

fn main() -> Result<(), Error> {
    let outdir = match env::var_os("OUT_DIR") {
        None => return Ok(()),
        Some(outdir) => outdir,
    };

    let mut cmd = Command::new("zenn-md")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A tool for converting, inspecting and table-editing Zenn Markdown")
        .arg_required_else_help(true)
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
                .help("Path to a zenn.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .subcommand(
            Command::new("inspect")
                .arg(
                    Arg::new("path")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("transform")
                        .value_parser(clap::builder::PossibleValuesParser::new(
                            AVAILABLE_TRANSFORMS,
                        ))
                        .index(2),
                ),
        )
        .subcommand(
            Command::new("convert")
                .arg(
                    Arg::new("input")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("from")
                        .long("from")
                        .value_parser(clap::builder::PossibleValuesParser::new(FORMATS)),
                )
                .arg(
                    Arg::new("to")
                        .long("to")
                        .required(true)
                        .value_parser(clap::builder::PossibleValuesParser::new(FORMATS)),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("table")
                .arg(
                    Arg::new("path")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("command")
                        .required(true)
                        .index(2)
                        .value_parser(clap::builder::PossibleValuesParser::new(TABLE_COMMANDS)),
                )
                .arg(Arg::new("cell").long("cell").required(true)),
        );

    // Generate completions for bash
    generate_to(Bash, &mut cmd, "zenn-md", &outdir)?;

    // Generate completions for zsh
    generate_to(Zsh, &mut cmd, "zenn-md", &outdir)?;

    // Generate completions for fish
    generate_to(Fish, &mut cmd, "zenn-md", &outdir)?;

    println!("cargo:warning=Shell completions generated in {outdir:?}");

    Ok(())
}
