use crate::{DecodeError, Int64Mode, Options, StreamDecoder, pump_reader};
use std::env;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};

fn print_help(program: &str) {
    eprintln!(
        "Usage: {prog} [OPTIONS] [INPUT]\n\
         \n\
         INPUT: optional BSON input file. When omitted, reads from stdin.\n\
         \n\
         Options:\n\
           -o, --output FILE         Write output to FILE (default stdout)\n\
               --chunk-size BYTES    Read size while streaming (default 65536)\n\
               --no-header           Documents are not preceded by a length header\n\
               --array               Input is a sequence of documents; output a JSON array\n\
               --int64 MODE          false|number|string|auto (default string)\n\
               --validate-lengths    Check declared document lengths\n\
               --pretty              Buffer the whole output and pretty-print it\n\
               --config FILE         Load options from a JSON file (flags override it)\n\
               --log                 Print the decode log to stderr\n\
           -h, --help                Show this help\n",
        prog = program
    );
}

struct CliMode {
    input: Option<String>,
    output: Option<String>,
    chunk_size: usize,
    pretty: bool,
}

enum Flag {
    NoHeader,
    Array,
    Int64(Int64Mode),
    ValidateLengths,
    Log,
}

fn parse_args() -> (Options, CliMode) {
    let mut args: Vec<String> = env::args().collect();
    let program = args
        .first()
        .cloned()
        .unwrap_or_else(|| "bsonjson".to_string());
    if !args.is_empty() {
        args.remove(0);
    }

    let mut config: Option<String> = None;
    let mut flags: Vec<Flag> = Vec::new();
    let mut input: Option<String> = None;
    let mut output: Option<String> = None;
    let mut chunk_size: usize = 65536;
    let mut pretty = false;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help(&program);
                std::process::exit(0);
            }
            "-o" | "--output" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Missing FILE for --output");
                    std::process::exit(2);
                }
                output = Some(args[i].clone());
            }
            "--chunk-size" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Missing BYTES for --chunk-size");
                    std::process::exit(2);
                }
                chunk_size = args[i].parse().unwrap_or(65536);
            }
            "--no-header" => flags.push(Flag::NoHeader),
            "--array" => flags.push(Flag::Array),
            "--validate-lengths" => flags.push(Flag::ValidateLengths),
            "--log" => flags.push(Flag::Log),
            "--pretty" => {
                pretty = true;
            }
            "--int64" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Missing MODE for --int64");
                    std::process::exit(2);
                }
                match args[i].parse::<Int64Mode>() {
                    Ok(mode) => flags.push(Flag::Int64(mode)),
                    Err(msg) => {
                        eprintln!("{}", msg);
                        std::process::exit(2);
                    }
                }
            }
            "--config" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Missing FILE for --config");
                    std::process::exit(2);
                }
                config = Some(args[i].clone());
            }
            s if s.starts_with('-') => {
                eprintln!("Unknown option: {}", s);
                std::process::exit(2);
            }
            path => {
                input = Some(path.to_string());
            }
        }
        i += 1;
    }

    let mut opts = match config {
        Some(path) => match load_config(&path) {
            Ok(o) => o,
            Err(msg) => {
                eprintln!("Cannot load config {}: {}", path, msg);
                std::process::exit(2);
            }
        },
        None => Options::default(),
    };
    for flag in flags {
        match flag {
            Flag::NoHeader => opts.has_header = false,
            Flag::Array => opts.array_of_bsons = true,
            Flag::Int64(mode) => opts.preserve_int64 = mode,
            Flag::ValidateLengths => opts.validate_lengths = true,
            Flag::Log => opts.logging = true,
        }
    }
    if opts.logging {
        opts.log_json_path = true;
    }

    let mode = CliMode {
        input,
        output,
        chunk_size,
        pretty,
    };
    (opts, mode)
}

#[cfg(feature = "serde")]
fn load_config(path: &str) -> Result<Options, String> {
    let text = fs::read_to_string(path).map_err(|e| e.to_string())?;
    serde_json::from_str(&text).map_err(|e| e.to_string())
}

#[cfg(not(feature = "serde"))]
fn load_config(_path: &str) -> Result<Options, String> {
    Err("built without the `serde` feature".to_string())
}

fn report(d: &mut StreamDecoder) {
    for w in d.take_warnings() {
        eprintln!("warning: {}", w);
    }
    for e in d.take_log() {
        match e.path {
            Some(path) => eprintln!("log: {} at {} ({}) [{}]", e.message, e.position, path, e.context),
            None => eprintln!("log: {} at {} [{}]", e.message, e.position, e.context),
        }
    }
}

fn stream_all<R: Read, W: Write>(
    reader: &mut R,
    writer: &mut W,
    opts: &Options,
    chunk_size: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut d = StreamDecoder::new(opts.clone());
    let res = pump_reader(&mut d, reader, writer, chunk_size, report);
    // partial output and diagnostics go out even when decoding failed
    report(&mut d);
    writer.flush()?;
    res?;
    Ok(())
}

fn decode_all(d: &mut StreamDecoder, content: &[u8]) -> Result<String, DecodeError> {
    let mut out = d.push(content)?;
    out.push_str(&d.finish()?);
    Ok(out)
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (opts, mode) = parse_args();

    let mut out_writer: Box<dyn Write> = if let Some(ref o) = mode.output {
        Box::new(BufWriter::new(File::create(o)?))
    } else {
        Box::new(BufWriter::new(io::stdout()))
    };

    if mode.pretty {
        let content = match &mode.input {
            Some(path) => fs::read(path)?,
            None => {
                let mut content = Vec::new();
                io::stdin().read_to_end(&mut content)?;
                content
            }
        };
        let mut d = StreamDecoder::new(opts.clone());
        let decoded = decode_all(&mut d, &content);
        report(&mut d);
        let v: serde_json::Value = serde_json::from_str(&decoded?)?;
        let pretty = serde_json::to_string_pretty(&v)?;
        out_writer.write_all(pretty.as_bytes())?;
        out_writer.flush()?;
        return Ok(());
    }

    match &mode.input {
        None => {
            let mut stdin = io::stdin();
            stream_all(&mut stdin, &mut out_writer, &opts, mode.chunk_size)
        }
        Some(path) => {
            let mut reader = BufReader::new(File::open(path)?);
            stream_all(&mut reader, &mut out_writer, &opts, mode.chunk_size)
        }
    }
}
