// demos/voyager_synthetic.rs
//! Write a synthetic Voyager-1 style recording: a drifting carrier with two
//! sidebands on top of chi-squared-ish noise, then read it back.

use std::{path::PathBuf, time::Instant};

use clap::Parser;
use fbh5_rs::store::Hdf5Store;
use fbh5_rs::*;
use log::{error, info};
use rand::{rngs::StdRng, Rng, SeedableRng};

#[derive(Parser, Debug)]
#[command(
    name = "voyager-synthetic",
    version = env!("CARGO_PKG_VERSION"),
    about = "Write a synthetic filterbank recording",
    long_about = None,
)]
struct Cli {
    /// Output artifact
    #[arg(short, long, default_value = "voyager_synthetic.h5")]
    output: PathBuf,
    /// Fine channels
    #[arg(short = 'c', long, default_value = "1048576")]
    nchans: i32,
    /// Bits per sample: 8, 16, 32 or 64
    #[arg(short = 'b', long, default_value = "32")]
    nbits: i32,
    /// Number of appends
    #[arg(short, long, default_value = "16")]
    dumps: usize,
    /// Integrations per append
    #[arg(short, long, default_value = "1")]
    integrations: usize,
    /// Explicit chunk shape as time,ifs,chans
    #[arg(long)]
    chunk: Option<String>,
    /// Cache slots, bytes and preemption policy as slots,bytes,policy
    #[arg(long)]
    cache: Option<String>,
    /// Store chunks without the compression filter
    #[arg(long)]
    no_compress: bool,
    /// Random seed
    #[arg(long, default_value = "57650")]
    seed: u64,
    #[arg(short, long)]
    verbose: bool,
}

fn parse_chunk(text: &str) -> Option<ChunkShape> {
    let dims: Vec<u64> = text.split(',').map(|s| s.trim().parse().ok()).collect::<Option<_>>()?;
    match dims[..] {
        [time, ifs, chans] => Some(ChunkShape::new(time, ifs, chans)),
        _ => None,
    }
}

fn parse_cache(text: &str) -> Option<CacheTuning> {
    let parts: Vec<&str> = text.split(',').map(str::trim).collect();
    match parts[..] {
        [slots, bytes, policy] => Some(CacheTuning::new(
            slots.parse().ok()?,
            bytes.parse().ok()?,
            policy.parse().ok()?,
        )),
        _ => None,
    }
}

/// One spectrum as little-endian bytes in the element type for `nbits`
fn spectrum(rng: &mut StdRng, nchans: usize, nbits: i32, carrier: usize) -> Vec<u8> {
    let power = |chan: usize, rng: &mut StdRng| -> f64 {
        let noise: f64 = (0..4).map(|_| rng.gen::<f64>()).sum::<f64>() * 2.5;
        let line = |centre: usize, height: f64| {
            let d = chan as f64 - centre as f64;
            height * (-d * d / 8.0).exp()
        };
        noise + line(carrier, 60.0) + line(carrier.saturating_sub(nchans / 512), 12.0) + line(carrier + nchans / 512, 12.0)
    };

    let mut out = Vec::with_capacity(nchans * nbits as usize / 8);
    for chan in 0..nchans {
        let p = power(chan, rng);
        match nbits {
            8 => out.push(p.min(255.0) as u8),
            16 => out.extend_from_slice(&(p.min(65535.0) as u16).to_le_bytes()),
            32 => out.extend_from_slice(&(p as f32).to_le_bytes()),
            _ => out.extend_from_slice(&p.to_le_bytes()),
        }
    }
    out
}

fn run(cli: &Cli) -> Result<()> {
    let header = Header {
        machine_id: 20,
        telescope_id: 6,
        data_type: 1,
        src_raj: 171010.0,
        src_dej: 123017.6,
        fch1: 8421.38671875,
        foff: -2.7939677238464355e-06,
        nchans: cli.nchans,
        nbeams: 1,
        ibeam: 1,
        nbits: cli.nbits,
        tstart: 57650.78209490741,
        tsamp: 18.253611008,
        nifs: 1,
        source_name: "Voyager1".into(),
        rawdatafile: "guppi_57650_67573_Voyager1_0038.0000.raw".into(),
        ..Default::default()
    };

    let mut options = SessionOptions::new().verbose(cli.verbose);
    if let Some(text) = &cli.chunk {
        let shape = parse_chunk(text).ok_or_else(|| Fbh5Error::validation("chunk_shape", text.clone()))?;
        options = options.with_chunk_shape(shape);
    }
    if let Some(text) = &cli.cache {
        let tuning = parse_cache(text).ok_or_else(|| Fbh5Error::Store(format!("bad cache tuning '{}'", text)))?;
        options = options.with_cache(tuning);
    }

    let store = if cli.no_compress { Hdf5Store::without_compression() } else { Hdf5Store::new() };
    let mut session = WriteSession::open(&store, &cli.output, &header, &options)?;
    info!("writing {} with chunk shape {}", cli.output.display(), session.chunk_shape());

    let mut rng = StdRng::seed_from_u64(cli.seed);
    let nchans = cli.nchans.max(1) as usize;
    let started = Instant::now();
    let mut integration = 0usize;
    for _ in 0..cli.dumps {
        let mut block = Vec::with_capacity(session.tint_size() * cli.integrations);
        for _ in 0..cli.integrations {
            // Doppler drift of a few channels per integration.
            let carrier = (nchans / 2 + integration * 3) % nchans;
            block.extend_from_slice(&spectrum(&mut rng, nchans, cli.nbits, carrier));
            integration += 1;
        }
        session.append(&block)?;
    }
    let report = session.close()?;

    let secs = started.elapsed().as_secs_f64();
    info!(
        "{} dumps, {} integrations, {:.1} MiB/s",
        report.dumps,
        report.integrations,
        report.logical_bytes as f64 / (1024.0 * 1024.0) / secs.max(1e-9)
    );
    match report.compression_ratio() {
        Some(ratio) => info!("logical {} B, stored {} B, ratio {:.2}", report.logical_bytes, report.stored_bytes, ratio),
        None => info!("logical {} B, nothing stored", report.logical_bytes),
    }

    let reader = ArtifactReader::open(&cli.output)?;
    let back = reader.header()?;
    let array = reader.array(DATASET_NAME)?;
    info!(
        "read back: source {} extent {:?} labels {:?}",
        back.source_name, array.extent, array.labels
    );
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(if cli.verbose {
        "debug"
    } else {
        "info"
    }))
    .init();

    if let Err(err) = run(&cli) {
        error!("{}", err);
        std::process::exit(1);
    }
}
