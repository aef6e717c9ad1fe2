// build.rs

use clap::{Arg, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Common argument: pack location
fn pack_arg() -> Arg {
    Arg::new("pack")
        .required(true)
        .value_name("PACK")
        .help("Pack directory or .zip file")
}

fn feature_args() -> [Arg; 2] {
    [
        Arg::new("feature").required(true).help("Feature id"),
        Arg::new("value")
            .required(true)
            .help("Target value (true/false, or a state name)"),
    ]
}

fn build_cli() -> Command {
    Command::new("packset")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Declarative feature switching for Minecraft resource packs")
        .subcommand_required(true)
        .subcommand(
            Command::new("show")
                .about("Show categories, features and their current values")
                .arg(pack_arg())
                .arg(
                    Arg::new("lang")
                        .short('l')
                        .long("lang")
                        .env("PACKSET_LANG")
                        .default_value("en_us")
                        .help("Language code for display labels"),
                ),
        )
        .subcommand(
            Command::new("status")
                .about("Check that every feature resolves to a legal state")
                .arg(pack_arg()),
        )
        .subcommand(
            Command::new("plan")
                .about("Preview the renames needed to change a feature")
                .arg(pack_arg())
                .args(feature_args()),
        )
        .subcommand(
            Command::new("set")
                .about("Change a feature")
                .arg(pack_arg())
                .args(feature_args())
                .arg(
                    Arg::new("dry_run")
                        .long("dry-run")
                        .action(clap::ArgAction::SetTrue)
                        .help("Show what would be renamed without making changes"),
                ),
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completion scripts")
                .arg(
                    Arg::new("shell")
                        .required(true)
                        .value_parser(["bash", "elvish", "fish", "powershell", "zsh"])
                        .help("Shell type"),
                ),
        )
}

/// Render `packset.1` into `man/` under the package root
fn write_man_page(manifest_dir: &Path) -> io::Result<PathBuf> {
    let man_dir = manifest_dir.join("man");
    fs::create_dir_all(&man_dir)?;

    let mut page = Vec::new();
    Man::new(build_cli()).render(&mut page)?;

    let man_path = man_dir.join("packset.1");
    fs::write(&man_path, page)?;
    Ok(man_path)
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let Some(manifest_dir) = env::var_os("CARGO_MANIFEST_DIR").map(PathBuf::from) else {
        println!("cargo:warning=CARGO_MANIFEST_DIR not set, skipping man page");
        return;
    };

    match write_man_page(&manifest_dir) {
        Ok(path) => println!("cargo:warning=Man page generated at {}", path.display()),
        Err(e) => println!("cargo:warning=Failed to generate man page: {}", e),
    }
}
