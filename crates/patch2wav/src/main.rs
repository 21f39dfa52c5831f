//! patch2wav binary

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use synth::data::{load_patch_file, validate_patch_names, UniquePatchList};
use synth::synthesize_patch;

use clap::Parser;

use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "console sound patch to wave file compiler")]
#[command(arg_required_else_help = true)]
struct Args {
    #[arg(value_name = "JSON_FILE", help = "patch project json file")]
    input: PathBuf,

    #[arg(
        short = 'p',
        long,
        value_name = "NAME",
        help = "compile a single patch (default: every patch in the file)"
    )]
    patch: Option<String>,

    #[arg(
        short = 'o',
        long,
        value_name = "PATH",
        help = "output wave file (with --patch) or output directory"
    )]
    output: Option<PathBuf>,
}

macro_rules! error {
    ($($arg:tt)*) => {{
        eprintln!($($arg)*);
        std::process::exit(1);
    }};
}

fn main() {
    let args = Args::parse();

    let patches = load_patches(&args.input);

    match args.patch {
        Some(name) => {
            let patch = match patches.get(&name) {
                Some(p) => p,
                None => error!("Unknown patch: {}", name),
            };

            let wav = match synthesize_patch(patch) {
                Ok(wav) => wav,
                Err(why) => error!("Cannot synthesise {}: {}", name, why),
            };

            let out = args
                .output
                .unwrap_or_else(|| PathBuf::from(format!("{}.wav", name)));
            write_wave_file(out, wav);
        }

        None => {
            let out_dir = args.output.unwrap_or_else(|| PathBuf::from("."));

            for (name, patch) in patches.list() {
                let wav = match synthesize_patch(patch) {
                    Ok(wav) => wav,
                    Err(why) => error!("Cannot synthesise {}: {}", name, why),
                };

                write_wave_file(out_dir.join(format!("{}.wav", name)), wav);
            }
        }
    }
}

fn load_patches(path: &std::path::Path) -> UniquePatchList {
    let file = match load_patch_file(path) {
        Ok(f) => f,
        Err(why) => error!("{}", why),
    };

    match validate_patch_names(file) {
        Ok(patches) => patches,
        Err(why) => error!("Cannot load {}:\n{}", path.display(), why),
    }
}

fn write_wave_file(path: PathBuf, data: Vec<u8>) {
    match fs::write(&path, data) {
        Ok(()) => (),
        Err(why) => error!("Error writing {}: {}", path.display(), why),
    }
}
