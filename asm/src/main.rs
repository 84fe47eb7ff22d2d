use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
};

use asx::{
    dump,
    msg::{self, Msg},
    parser, Config, Error,
};
use color_print::{ceprintln, cprintln};

const HELP_TEMPLATE: &str = "\
{before-help}{bin} {version}
  {author}
  {about}

{usage-heading}
{tab}{usage}

{all-args}{after-help}";

#[derive(Debug, clap::Parser)]
#[clap(author, version, about, help_template = HELP_TEMPLATE)]
struct Args {
    /// Input file
    #[clap(default_value = "main.s")]
    input: String,

    /// Output object file
    #[clap(short, long, default_value = "main.obj")]
    output: String,

    /// Dump the listing and symbol table
    #[clap(short, long)]
    dump: bool,

    /// Write a YAML symbol map
    #[clap(short, long)]
    map: Option<String>,

    /// Buckets in the symbol table
    #[clap(long, default_value_t = 100)]
    table_size: usize,
}

fn main() {
    use clap::Parser;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args: Args = Args::parse();

    match assemble(&args) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => {
            ceprintln!("<red,bold>fatal</>: {}", err);
            std::process::exit(2);
        }
    }
}

/// `Ok(false)` when the source had errors.
fn assemble(args: &Args) -> Result<bool, Error> {
    println!("VM520 Assembler");

    println!("1. Read File and Parse Lines");
    println!("  < {}", args.input);
    let file = File::open(&args.input).map_err(|e| Error::FileOpen(args.input.clone(), e))?;
    let raw = BufReader::new(file)
        .lines()
        .collect::<Result<Vec<_>, _>>()
        .map_err(Error::FileRead)?;

    let mut lines = vec![];
    let mut msgs = vec![];
    for (idx, text) in raw.iter().enumerate() {
        match parser::parse_line(idx + 1, text) {
            Ok(Some(line)) => lines.push(line),
            Ok(None) => {}
            Err(err) => msgs.push(Msg::parse(idx + 1, &err)),
        }
    }
    if msg::has_error(&msgs) {
        msg::dump(&msgs, &args.input, &raw);
        return Ok(false);
    }

    println!("2. Assemble");
    println!("  > {}", args.output);
    let file =
        File::create(&args.output).map_err(|e| Error::FileCreate(args.output.clone(), e))?;
    let mut out = BufWriter::new(file);
    let config = Config {
        table_size: args.table_size,
    };
    let asm = asx::run(&lines, &mut out, &config).map_err(|err| match err {
        Error::Io(e) => Error::FileWrite(args.output.clone(), e),
        err => err,
    })?;
    drop(out);

    let msgs: Vec<Msg> = asm.diagnostics().iter().map(Msg::from).collect();
    msg::dump(&msgs, &args.input, &raw);

    if asm.error_count() > 0 {
        if let Err(err) = std::fs::remove_file(&args.output) {
            log::warn!("could not remove {}: {}", args.output, err);
        }
        for (kind, count) in asm.counts() {
            ceprintln!("  <red>{:>4}</> {}", count, kind);
        }
        ceprintln!("<red,bold>{} error(s)</>, no object written", asm.error_count());
        return Ok(false);
    }

    if args.dump {
        dump::print_dump(asm.listing(), asm.symbols(), &raw);
    }

    if let Some(path) = &args.map {
        println!("  > {}", path);
        let file = File::create(path).map_err(|e| Error::FileCreate(path.clone(), e))?;
        let mut out = BufWriter::new(file);
        dump::write_map(&mut out, asm.symbols())?;
        out.flush().map_err(|e| Error::FileWrite(path.clone(), e))?;
    }

    cprintln!("<green,bold>done</>: {} words", asm.pc());
    Ok(true)
}
