use clap::Parser as CliParser;
use minicc::driver::{CompileOptions, CompilerDriver};
use std::path::PathBuf;
use std::process::exit;

/// CLI interface using clap
#[derive(CliParser, Debug)]
#[clap(name = "minicc", about = "MiniC compiler targeting ARM32")]
struct Cli {
    /// Input MiniC source file
    #[clap(value_parser)]
    input_file: PathBuf,

    /// Output file for the generated assembly (stdout if omitted)
    #[clap(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Print the AST before code generation
    #[clap(long)]
    dump_ast: bool,

    /// Print the lowered IR before code generation
    #[clap(long)]
    dump_ir: bool,

    /// Enable verbose diagnostic output
    #[clap(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    if !run(&cli) {
        exit(1);
    }
}

fn run(cli: &Cli) -> bool {
    let mut driver = CompilerDriver::new(CompileOptions {
        dump_ast: cli.dump_ast,
        dump_ir: cli.dump_ir,
    });

    let output = match driver.compile_file(&cli.input_file) {
        Ok(output) => output,
        Err(err) => {
            driver.diagnostics().print_all();
            eprintln!("error: {}", err);
            return false;
        }
    };

    if let Some(dump) = &output.ast_dump {
        println!("{}", dump);
    }
    if let Some(dump) = &output.ir_dump {
        print!("{}", dump);
    }

    match &cli.output {
        Some(path) => {
            if let Err(err) = std::fs::write(path, &output.asm) {
                eprintln!("error: {}", err);
                return false;
            }
        }
        None => print!("{}", output.asm),
    }
    true
}
