use std::io::{self, BufWriter, Write};

use anyhow::Context;
use clap::Parser;
use kallsyms_dec::{ArchitectureProfile, Decoded, Decoder};
use log::{debug, info};

mod cli;
mod config;
mod image;
mod output;

use cli::{Args, Format};
use config::Config;
use image::KernelImage;

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .parse_default_env()
        .init();
}

/// Runs every configured attempt until one decodes.
fn find_symbols(image: &[u8], config: &Config) -> anyhow::Result<(ArchitectureProfile, Decoded)> {
    let attempts = config.attempts()?;
    let mut last_err = None;

    for (profile, base) in attempts {
        debug!(
            "trying {}-bit profile, base {:#x}, align {:#x}",
            profile.pointer_size() * 8,
            base,
            profile.align_boundary()
        );
        match Decoder::new(image, profile).base(base).run() {
            Ok(decoded) => return Ok((profile, decoded)),
            Err(err) => {
                debug!("{}-bit attempt failed: {}", profile.pointer_size() * 8, err);
                last_err = Some(err);
            }
        }
    }

    match last_err {
        Some(err) => Err(err).context("no kallsyms table found"),
        None => anyhow::bail!("no architecture to try"),
    }
}

fn log_layout(decoded: &Decoded) {
    let l = &decoded.layout;
    info!("kallsyms_addresses      {:#x}..{:#x}", l.addresses_start, l.addresses_end);
    info!("kallsyms_num_syms       {:#x}", l.num_syms);
    info!("kallsyms_names          {:#x}", l.names_start);
    info!("kallsyms_markers        {:#x}", l.markers_start);
    info!("kallsyms_token_table    {:#x}", l.tokens_start);
    info!("kallsyms_token_index    {:#x}", l.token_index_start);
    info!("{} symbols", decoded.symbols.len());
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = Config::from_args(&args);
    let image = KernelImage::open(&args.kernel_file)?;
    let (profile, decoded) = find_symbols(&image, &config)
        .with_context(|| format!("{}", args.kernel_file.display()))?;
    log_layout(&decoded);

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    if !config.resolve.is_empty() {
        output::write_resolved(&mut out, &decoded.symbols, &config.resolve, &profile, config.demangle)?;
    } else {
        match config.format {
            Format::Text => output::write_text(&mut out, &decoded.symbols, &profile, config.demangle)?,
            Format::Json => output::write_json(&mut out, &decoded.symbols, &profile, config.demangle)?,
        }
    }
    out.flush()?;

    Ok(())
}
