use std::error::Error;
use std::io::Write;
use std::sync::Arc;

use imem::cli::{OptionArgs, options_for_url};
use imem::{
    Access, CallbackTable, ImemProtocol, ImemStream, MemoryBackend, OpenFlags, set_callbacks,
};
use sarge::prelude::*;

fn print_usage() {
    eprintln!("Usage:");
    eprintln!(
        "  imem_probe --data <text> [--url <imem:name[?opts]>] [--option name=value ...] [--nonblock]"
    );
    eprintln!();
    eprintln!("Writes <text> to an in-memory imem URL through the registered callbacks,");
    eprintln!("then reads it back and reports every transfer.");
    eprintln!();
    eprintln!("Options:");
    for opt in imem::OPTIONS {
        eprintln!(
            "  {:<10} {} (default {}, range {}..={})",
            opt.name, opt.help, opt.default, opt.min, opt.max
        );
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let mut reader = ArgumentReader::new();

    let url_ref = reader.add::<String>(tag::both('u', "url"));
    let data_ref = reader.add::<String>(tag::both('d', "data"));
    let option_ref = reader.add::<OptionArgs>(tag::both('o', "option"));
    let nonblock_ref = reader.add::<bool>(tag::long("nonblock"));

    let args = reader.parse()?;

    let url = match url_ref.get(&args) {
        Some(Ok(v)) => v,
        _ => "imem:probe".to_string(),
    };
    let data = match data_ref.get(&args) {
        Some(Ok(v)) => v,
        _ => return Err("missing --data".into()),
    };
    let extra = match option_ref.get(&args) {
        Some(Ok(v)) => v,
        Some(Err(_)) => unreachable!("OptionArgs parsing is infallible"),
        None => OptionArgs::default(),
    };
    let nonblock = matches!(nonblock_ref.get(&args), Some(Ok(true)));

    let options = options_for_url(&url, &extra)?;

    let backend = MemoryBackend::new();
    set_callbacks(CallbackTable::from_backend(Arc::new(backend.clone())));
    let protocol = ImemProtocol::global();

    let mut out = ImemStream::open(protocol.clone(), &url, OpenFlags::write_only(), options)?;
    out.write_all(data.as_bytes())?;
    out.close()?;

    let mut flags = OpenFlags::read_only();
    if nonblock {
        flags = flags.nonblocking();
    }
    let mut input = ImemStream::open(protocol, &url, flags, options)?;

    println!("url:       {url}");
    println!("options:   truncate={} blocksize={}", options.truncate, options.blocksize);
    println!("handle:    {}", input.get_handle()?);
    println!("size:      {}", input.size()?);
    println!("check:     {:#05b}", input.check(Access::ALL)?.bits());

    let mut buf = vec![0u8; 64 * 1024];
    let mut received = Vec::new();
    loop {
        let n = input.read_some(&mut buf)?;
        if n == 0 {
            break;
        }
        println!("read:      {n} bytes");
        received.extend_from_slice(&buf[..n]);
    }
    input.close()?;

    println!("contents:  {}", String::from_utf8_lossy(&received));
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("imem_probe error: {e}");
        print_usage();
        std::process::exit(1);
    }
}
