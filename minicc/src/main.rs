#[macro_use]
extern crate clap;

mod demos;

use clap::Arg;
use std::fs::File;
use std::io::prelude::*;
use std::path::{Path, PathBuf};

use minicc_codegen::{gen_code_passe_2, CodegenConfig};
use minicc_sema::analyse_passe_1;

#[derive(Debug)]
enum Error {
    UnknownProgram(String),
    Sema(minicc_sema::SemaError),
    Io(std::io::Error, PathBuf),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::UnknownProgram(name) => write!(
                f,
                "Unknown demo program \"{}\" (run with --list to see the available ones)",
                name
            ),
            Error::Sema(err) => write!(f, "{}", err),
            Error::Io(err, path) => write!(f, "Writing output file \"{}\" failed: {}", path.display(), err),
        }
    }
}

fn main() {
    env_logger::init();

    let matches = app_from_crate!()
        .arg(
            Arg::with_name("PROGRAM")
                .help("Sets the bundled demo program to compile")
                .required_unless("list")
                .index(1),
        )
        .arg(
            Arg::with_name("list")
                .short("l")
                .long("list")
                .help("Lists the available demo programs and exits"),
        )
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .takes_value(true)
                .value_name("OUTPUT")
                .help("Sets the output file to write the generated assembly to"),
        )
        .arg(
            Arg::with_name("registers")
                .short("r")
                .long("registers")
                .takes_value(true)
                .value_name("N")
                .help("Sets the size of the code generator's temporary register window"),
        )
        .get_matches();

    if matches.is_present("list") {
        for name in demos::names() {
            println!("{}", name);
        }
        return;
    }

    let program = matches.value_of("PROGRAM").unwrap();
    let output = matches.value_of("output");
    let max_registers = matches
        .value_of("registers")
        .map(|s| s.parse().expect("--registers must be a small positive integer"))
        .unwrap_or(CodegenConfig::DEFAULT_MAX_REGISTERS);

    if let Err(err) = run(program, output, max_registers) {
        eprintln!("{}", err);
        std::process::exit(1);
    }
}

fn run(program: &str, output: Option<&str>, max_registers: u8) -> Result<(), Error> {
    let (mut ast, root) = demos::build(program).ok_or_else(|| Error::UnknownProgram(program.to_owned()))?;

    analyse_passe_1(&mut ast, root).map_err(Error::Sema)?;
    log::info!("pass 1 (semantic analysis) succeeded for \"{}\"", program);

    let config = CodegenConfig::new(max_registers, CodegenConfig::DEFAULT_DATA_SEGMENT_BASE);
    let asm = gen_code_passe_2(&ast, root, config);
    log::info!("pass 2 (code generation) produced {} bytes of assembly", asm.len());

    let output_path: PathBuf = output
        .map(PathBuf::from)
        .unwrap_or_else(|| Path::new(program).with_extension("asm"));

    let mut file = File::create(&output_path).map_err(|err| Error::Io(err, output_path.clone()))?;
    file.write_all(asm.as_bytes())
        .map_err(|err| Error::Io(err, output_path))?;

    Ok(())
}
