
extern crate clap;
#[macro_use] extern crate log;
extern crate fern;
extern crate chrono;
extern crate term_grid;

pub mod assembler;
pub mod error;
pub mod toolchain;
pub mod translator;

#[cfg(test)]
mod cpu;

use clap::{Arg, ArgMatches, App, AppSettings, SubCommand};
use term_grid::{Grid, GridOptions, Direction, Filling, Cell};

use std::fs;
use std::path::{Path, PathBuf};

use translator::parser::SourceFile;

fn main() {
    let args = process_arguments();
    // -v may be given before or after the subcommand.
    let verbosity = match args.subcommand() {
        (_, Some(sub)) => args.occurrences_of("verbose").max(sub.occurrences_of("verbose")),
        _ => args.occurrences_of("verbose"),
    };
    initialize_logging(verbosity);

    debug!("Arguments:\n\tVerbosity: {}\n\tSubcommand: {}",
        match verbosity {
            0 => log::LevelFilter::Error.to_string(),
            1 => log::LevelFilter::Warn.to_string(),
            2 => log::LevelFilter::Info.to_string(),
            3 | _ => log::LevelFilter::Debug.to_string(),
        },
        args.subcommand_name().unwrap_or("None"),
    );

    match args.subcommand() {
        ("asm", Some(sub)) => run_assembler(sub),
        ("vm", Some(sub)) => run_translator(sub),
        ("build", Some(sub)) => run_build(sub),
        _ => {
            error!("fatal: no subcommand given");
            std::process::exit(1);
        }
    }
}

fn run_assembler(args: &ArgMatches) {
    let ipath = Path::new(args.value_of("INPUT").unwrap_or_default());
    let source = read_file(ipath);

    if args.is_present("preprocess") {
        let opath = output_path(args, preprocess_path(ipath));
        write_file(&opath, &assembler::preprocess(&source));
        return;
    }

    let opath = output_path(args, ipath.with_extension("hack"));

    let encoded = match assembler::Assembler::new().run(&source) {
        Err(err) => {
            error!("fatal: unable to assemble `{}`: {}", ipath.display(), err);
            std::process::exit(1);
        },
        Ok(encoded) => encoded,
    };

    if args.is_present("print-debug") {
        let mut grid = Grid::new(GridOptions {
            filling:     Filling::Spaces(1),
            direction:   Direction::LeftToRight,
        });

        for ins in encoded.iter() {
            grid.add(Cell::from(format!("0x{:04X}:", ins.index)));
            grid.add(Cell::from(ins.source.clone()));
            grid.add(Cell::from("=>".to_string()));
            grid.add(Cell::from(ins.binary()));
        }

        println!("{}", grid.fit_into_columns(4));
    }

    info!("assembled {} instruction(s) from `{}`", encoded.len(), ipath.display());
    write_file(&opath, &assembler::render(&encoded));
}

fn run_translator(args: &ArgMatches) {
    let ipath = Path::new(args.value_of("INPUT").unwrap_or_default());
    let files = read_sources(ipath);
    let config = translator::Config {
        bootstrap: args.is_present("bootstrap"),
        annotate: args.is_present("annotate"),
    };

    let opath = output_path(args, derived_path(ipath, "asm"));
    match translator::translate(&files, config) {
        Err(err) => {
            error!("fatal: unable to translate `{}`: {}", ipath.display(), err);
            std::process::exit(1);
        },
        Ok(asm) => write_file(&opath, &asm),
    }
}

fn run_build(args: &ArgMatches) {
    let ipath = Path::new(args.value_of("INPUT").unwrap_or_default());
    let files = read_sources(ipath);
    let config = translator::Config {
        bootstrap: args.is_present("bootstrap"),
        annotate: false,
    };

    let opath = output_path(args, derived_path(ipath, "hack"));
    match toolchain::build(&files, config) {
        Err(err) => {
            error!("fatal: unable to build `{}`: {}", ipath.display(), err);
            std::process::exit(1);
        },
        Ok(binary) => write_file(&opath, &binary),
    }
}

/// Reads a single `.vm` file, or every `.vm` file of a directory in file name order.
fn read_sources(ipath: &Path) -> Vec<SourceFile> {
    let paths = if ipath.is_dir() {
        let entries = match fs::read_dir(ipath) {
            Err(err) => {
                error!("fatal: unable to read directory `{}`: {}", ipath.display(), err);
                std::process::exit(1);
            },
            Ok(entries) => entries,
        };
        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && path.extension().map_or(false, |ext| ext == "vm"))
            .collect();
        paths.sort();
        paths
    } else {
        vec![ipath.to_path_buf()]
    };

    if paths.is_empty() {
        warn!("no .vm files found in `{}`", ipath.display());
    }

    paths
        .iter()
        .map(|path| {
            let name = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
            debug!("reading `{}` as `{}`", path.display(), name);
            SourceFile::new(&name, &read_file(path))
        })
        .collect()
}

/// A file swaps its extension; a directory `foo/` becomes `foo/foo.<ext>`.
fn derived_path(ipath: &Path, extension: &str) -> PathBuf {
    if ipath.is_dir() {
        let stem = ipath
            .canonicalize()
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_os_string()))
            .unwrap_or_else(|| "out".into());
        ipath.join(stem).with_extension(extension)
    } else {
        ipath.with_extension(extension)
    }
}

/// Cleaned assembly is still assembly, so it never takes the `.hack` name.
fn preprocess_path(ipath: &Path) -> PathBuf {
    ipath.with_extension("pre.asm")
}

fn output_path(args: &ArgMatches, default: PathBuf) -> PathBuf {
    match args.value_of("output") {
        Some(filename) => PathBuf::from(filename),
        None => default,
    }
}

fn read_file(path: &Path) -> String {
    match fs::read_to_string(path) {
        Err(err) => {
            error!("fatal: unable to open input file `{}`: {}", path.display(), err);
            std::process::exit(1);
        },
        Ok(text) => text,
    }
}

fn write_file(path: &Path, contents: &str) {
    if let Err(err) = fs::write(path, contents) {
        error!("fatal: unable to write to output file `{}`: {}", path.display(), err);
        std::process::exit(1);
    }
    info!("wrote `{}`", path.display());
}

fn process_arguments() -> ArgMatches<'static> {
    let output = Arg::with_name("output")
        .short("o")
        .takes_value(true)
        .help("write output to an outfile");
    let bootstrap = Arg::with_name("bootstrap")
        .short("b")
        .takes_value(false)
        .help("emit startup code that sets SP to 256 and calls Sys.init");

    App::new(option_env!("CARGO_PKG_NAME").unwrap_or("hasm"))
        .version(option_env!("CARGO_PKG_VERSION").unwrap_or("unknown"))
        .author(option_env!("CARGO_PKG_AUTHORS").unwrap_or(""))
        .about(option_env!("CARGO_PKG_DESCRIPTION").unwrap_or(""))
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(Arg::with_name("verbose")
            .short("v")
            .multiple(true)
            .takes_value(false)
            .global(true)
            .help("Sets the level of verbosity"))
        .subcommand(SubCommand::with_name("asm")
            .about("assembles a .asm file into a .hack file")
            .arg(Arg::with_name("INPUT")
                .help("Sets the input file to use")
                .required(true)
                .multiple(false)
                .index(1))
            .arg(output.clone())
            .arg(Arg::with_name("preprocess")
                .short("e")
                .takes_value(false)
                .help("preprocess only"))
            .arg(Arg::with_name("print-debug")
                .short("d")
                .alias("show")
                .alias("s")
                .takes_value(false)
                .help("prints the debug information alongside the assembly to STDOUT")))
        .subcommand(SubCommand::with_name("vm")
            .about("translates a .vm file, or a directory of them, into a .asm file")
            .arg(Arg::with_name("INPUT")
                .help("Sets the input file or directory to use")
                .required(true)
                .multiple(false)
                .index(1))
            .arg(output.clone())
            .arg(bootstrap.clone())
            .arg(Arg::with_name("annotate")
                .short("a")
                .takes_value(false)
                .help("precede each command's code with the command as a comment")))
        .subcommand(SubCommand::with_name("build")
            .about("translates and assembles .vm code straight into a .hack file")
            .arg(Arg::with_name("INPUT")
                .help("Sets the input file or directory to use")
                .required(true)
                .multiple(false)
                .index(1))
            .arg(output)
            .arg(bootstrap))
        .get_matches()
}

fn initialize_logging(verbosity: u64) {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(match verbosity {
            0 => log::LevelFilter::Error,
            1 => log::LevelFilter::Warn,
            2 => log::LevelFilter::Info,
            3 | _ => log::LevelFilter::Debug,
        })
        .chain(std::io::stderr())
        .apply().ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_path_for_file() {
        assert_eq!(derived_path(Path::new("prog/Max.asm"), "hack"), PathBuf::from("prog/Max.hack"));
        assert_eq!(derived_path(Path::new("SimpleAdd.vm"), "asm"), PathBuf::from("SimpleAdd.asm"));
    }

    #[test]
    fn test_derived_path_for_directory() {
        let dir = std::env::temp_dir().join("hasm_derived_path_test");
        fs::create_dir_all(&dir).unwrap();
        assert_eq!(derived_path(&dir, "asm"), dir.join("hasm_derived_path_test.asm"));
    }

    #[test]
    fn test_preprocess_path() {
        assert_eq!(preprocess_path(Path::new("prog/Max.asm")), PathBuf::from("prog/Max.pre.asm"));
        assert_ne!(preprocess_path(Path::new("Add.asm")), derived_path(Path::new("Add.asm"), "hack"));
    }

    #[test]
    fn test_read_sources_directory() {
        let dir = std::env::temp_dir().join("hasm_read_sources_test");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("Sys.vm"), "function Sys.init 0\n").unwrap();
        fs::write(dir.join("Main.vm"), "push constant 1\n").unwrap();
        fs::write(dir.join("notes.txt"), "not bytecode\n").unwrap();

        let files = read_sources(&dir);
        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Main", "Sys"]);
        assert_eq!(files[0].text, "push constant 1\n");
    }
}
