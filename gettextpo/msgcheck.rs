//
// Copyright (c) 2026 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! msgcheck - validate and normalize PO message catalogs
//!
//! Reads each input catalog, reports every problem found on standard
//! error, optionally runs the catalog-wide checks and re-writes the
//! catalog in canonical form.

use clap::Parser;
use gettextrs::{LocaleCategory, bind_textdomain_codeset, gettext, setlocale, textdomain};
use posixutils_gettextpo::{Catalog, Error, WriteOptions};
use std::path::{Path, PathBuf};
use std::process::exit;

/// msgcheck - validate and normalize PO message catalogs
#[derive(Parser)]
#[command(
    version,
    about = gettext("msgcheck - validate and normalize PO message catalogs"),
    disable_help_flag = true,
    disable_version_flag = true
)]
struct Args {
    #[arg(short = 'c', long = "check", help = gettext("Check plural forms, newlines and format strings"))]
    check: bool,

    #[arg(short = 'v', long = "verbose", help = gettext("Print the number of messages in each file"))]
    verbose: bool,

    #[arg(short = 'w', long = "width", default_value_t = 79, help = gettext("Set the output page width"))]
    width: usize,

    #[arg(long = "no-wrap", help = gettext("Do not break long message lines"))]
    no_wrap: bool,

    #[arg(short = 'o', long = "output-file", help = gettext("Write the catalog to this file"))]
    output: Option<PathBuf>,

    #[arg(short, long, action = clap::ArgAction::HelpLong, help = gettext("Print help"))]
    help: Option<bool>,

    #[arg(short = 'V', long, action = clap::ArgAction::Version, help = gettext("Print version"))]
    version: Option<bool>,

    #[arg(required = true, help = gettext("Input .po files"))]
    files: Vec<PathBuf>,
}

/// Print every diagnostic carried by `err`, prefixed with the program name
fn report(file: &str, err: &Error) {
    match err.report() {
        Some(report) => {
            for diagnostic in report.diagnostics() {
                if diagnostic.location.is_some() {
                    eprintln!("msgcheck: {}", diagnostic);
                } else {
                    eprintln!("msgcheck: {}: {}", file, diagnostic);
                }
            }
        }
        None => eprintln!("msgcheck: {}: {}", file, err),
    }
}

fn process_file(path: &Path, args: &Args, options: &WriteOptions) -> bool {
    let name = path.display().to_string();
    let mut ok = true;

    let catalog = match Catalog::read(path) {
        Ok(catalog) => catalog,
        Err(e) => {
            report(&name, &e);
            return false;
        }
    };

    if args.verbose {
        println!("{}: {} {}", name, catalog.len(), gettext("messages"));
    }

    if args.check {
        if let Err(e) = catalog.check_all() {
            report(&name, &e);
            ok = false;
        }
    }

    if let Some(ref output) = args.output {
        if let Err(e) = catalog.write_with(output, options) {
            report(&output.display().to_string(), &e);
            ok = false;
        }
    }

    ok
}

fn main() {
    // Set up localization
    setlocale(LocaleCategory::LcAll, "");
    if textdomain("posixutils-rs").is_err() {
        // Ignore error - translation may not be available
    }
    let _ = bind_textdomain_codeset("posixutils-rs", "UTF-8");

    env_logger::init();

    let args = Args::parse();

    if args.output.is_some() && args.files.len() != 1 {
        eprintln!(
            "msgcheck: {}",
            gettext("an output file requires exactly one input file")
        );
        exit(1);
    }

    let options = WriteOptions {
        width: args.width,
        wrap: !args.no_wrap,
    };

    let mut exit_code = 0;
    for path in &args.files {
        if !process_file(path, &args, &options) {
            exit_code = 1;
        }
    }

    exit(exit_code)
}
