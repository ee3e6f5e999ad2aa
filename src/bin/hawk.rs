//! hawk: generate a curl command line carrying a Hawk `Authorization` header for a request.

use clap::Parser;
use hawkc::{algorithm_by_name, Context};
use std::process::exit;
use tracing_subscriber::filter::LevelFilter;

#[derive(Parser, Debug)]
#[command(
    name = "hawk",
    about = "Generate curl command line invocations from request data and Hawk parameters"
)]
struct Args {
    /// Id to put in the 'id' header parameter
    #[arg(short = 'i')]
    id: String,

    /// Password used to compute the MAC
    #[arg(short = 'p')]
    password: String,

    /// Host to use for the request
    #[arg(short = 'H')]
    host: String,

    /// URI path to use for the request
    #[arg(short = 'P')]
    path: String,

    /// HTTP method to use
    #[arg(short = 'M', default_value = "GET")]
    method: String,

    /// Port to use for the request
    #[arg(short = 'O', default_value = "80")]
    port: String,

    /// Algorithm to use for HMAC generation
    #[arg(short = 'a', default_value = "sha1")]
    algorithm: String,

    /// Arbitrary string to put into the 'ext' header parameter
    #[arg(short = 'e')]
    ext: Option<String>,

    /// Number of seconds to use for clock offset
    #[arg(short = 'o', default_value_t = 0, allow_negative_numbers = true)]
    offset: i64,

    /// Verbose mode to print some diagnostic messages
    #[arg(short = 'v')]
    verbose: bool,
}

/// Route the library's `log` records to stderr. Diagnostics go to stderr so stdout carries
/// only the command line.
fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let algorithm = match algorithm_by_name(&args.algorithm) {
        Ok(algorithm) => algorithm,
        Err(e) => {
            eprintln!("Algorithm not known: {}", e);
            exit(4);
        }
    };

    let mut ctx = Context::new();
    ctx.set_clock_offset(args.offset);
    ctx.set_algorithm(algorithm);
    ctx.set_password(&args.password);
    ctx.set_method(&args.method);
    ctx.set_path(&args.path);
    ctx.set_host(&args.host);
    ctx.set_port(&args.port);
    ctx.set_id(&args.id);
    if let Some(ext) = &args.ext {
        ctx.set_ext(ext);
    }

    let required = match ctx.calculate_authorization_header_length() {
        Ok(len) => len,
        Err(_) => {
            eprintln!("Error calculating header buffer size: {}", ctx.error_message());
            exit(2);
        }
    };
    log::debug!("authorization header needs {} bytes", required);

    let mut buffer = match ctx.allocate(required) {
        Ok(buffer) => buffer,
        Err(_) => {
            eprintln!(
                "Unable to allocate {} bytes, {}",
                required,
                ctx.error_message()
            );
            exit(3);
        }
    };

    let len = match ctx.create_authorization_header(&mut buffer) {
        Ok(len) => len,
        Err(_) => {
            eprintln!("Error creating header: {}", ctx.error_message());
            exit(4);
        }
    };

    log::debug!("wrote {} byte header", len);
    println!(
        "curl -v http://{}:{}{} -H 'Authorization: {}'",
        args.host,
        args.port,
        args.path,
        String::from_utf8_lossy(&buffer[..len])
    );
}
