use clap::Parser as _;
use color_print::{cformat, cprintln};
use cvm::{compile::generate, Error, Lexer, Parser};
use itertools::Itertools;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

const HELP_TEMPLATE: &str = "\
{before-help}{bin} {version}
  {author}
  {about}

{usage-heading}
{tab}{usage}

{all-args}{after-help}";

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum Stage {
    Tokens,
    Ast,
    Code,
}

#[derive(Debug, clap::Parser)]
#[clap(author, version, about, help_template = HELP_TEMPLATE)]
struct Args {
    /// Source file
    input: PathBuf,

    /// Output file [default: input with `.s` extension]
    #[clap(short, long)]
    output: Option<PathBuf>,

    /// Print progress and the generated listing
    #[clap(short, long)]
    verbose: bool,

    /// Dump a stage result as YAML
    #[clap(short, long, value_enum)]
    dump: Option<Stage>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let file = args.input.display().to_string();

    let source = match std::fs::read_to_string(&args.input) {
        Ok(source) => source,
        Err(err) => {
            Error::Io(err).print_diag("");
            return ExitCode::FAILURE;
        }
    };

    match run(&args, &file, &source) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            err.print_diag(&source);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args, file: &str, source: &str) -> Result<(), Error> {
    if args.verbose {
        cprintln!("<s>CVM Compiler</> by kanade-k-1228");
        println!("  < {}", file);
        println!("1. Lex");
    }
    let tokens = Lexer::new(file, source).parse()?;
    if args.dump == Some(Stage::Tokens) {
        dump(&tokens)?;
    }

    if args.verbose {
        println!("2. Parse");
    }
    let ast = Parser::new(tokens).parse()?;
    if args.dump == Some(Stage::Ast) {
        dump(&ast)?;
    }

    if args.verbose {
        println!("3. Generate");
    }
    let code = generate(file, &ast)?;
    if args.dump == Some(Stage::Code) {
        dump(&code)?;
    }
    if args.verbose {
        for line in &code.lines {
            println!("{}", line.cformat());
        }
        cprintln!("  <s>labels</>: {}", code.labels().join(", "));
    }

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| args.input.with_extension("s"));
    if args.verbose {
        println!("4. Write");
        println!("{}", cformat!("  > <u>{}</>", output.display()));
    }
    write(&output, &code.to_string())
}

fn dump<T: Serialize>(value: &T) -> Result<(), Error> {
    print!("{}", serde_yaml::to_string(value)?);
    Ok(())
}

/// Write to a sibling temporary, then rename into place
fn write(path: &Path, text: &str) -> Result<(), Error> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    std::fs::write(&tmp, text)?;
    if let Err(err) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(err.into());
    }
    Ok(())
}
