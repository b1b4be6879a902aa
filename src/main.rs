use std::{
    fs,
    io::{self, BufWriter, Write},
    path::PathBuf,
};

use anyhow::{bail, Context};
use serde::Serialize;

use e20_cache::{
    cache::CacheStats,
    config::{Config, MachineConfig},
    image::MachineImage,
    sim::Simulator,
};

const USAGE: &str = "\
usage: e20-cache <program.bin> --cache <size,assoc,blocksize[,size,assoc,blocksize]>
                 [-p <config.json> | --config <json>] [--json <stats.json>]";

#[derive(Serialize)]
struct Report {
    instructions: u64,
    caches: Vec<CacheStats>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let mut args = pico_args::Arguments::from_env();
    if args.contains(["-h", "--help"]) {
        println!("{USAGE}");
        return Ok(());
    }

    let cache_arg: Option<String> = args.opt_value_from_str("--cache")?;
    let config_str: Option<String> = args.opt_value_from_str("--config")?;
    let config_path: Option<PathBuf> = args.opt_value_from_str("-p")?;
    let stats_path: Option<PathBuf> = args.opt_value_from_str("--json")?;
    let program: PathBuf = args
        .free_from_str()
        .context("missing program file\n".to_string() + USAGE)?;
    let rest = args.finish();
    if !rest.is_empty() {
        bail!("unexpected arguments: {rest:?}");
    }

    let machine = MachineConfig::default();
    let image = MachineImage::read(&program, machine.mem_size)
        .with_context(|| format!("could not load {}", program.display()))?;

    let config = match (cache_arg, config_str, config_path) {
        (Some(arg), None, None) => Config::from_cache_arg(&arg)?,
        (None, Some(json), None) => Config::from_json(&json)?,
        (None, None, Some(path)) => {
            let json = fs::read_to_string(&path)
                .with_context(|| format!("could not read config {}", path.display()))?;
            Config::from_json(&json)?
        }
        (None, None, None) => bail!("must provide a cache config with --cache, --config or -p"),
        _ => bail!("--cache, --config and -p are mutually exclusive"),
    };

    let mut sim = Simulator::new(&machine, image, config)?;
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let instructions = sim.run(&mut out)?;
    out.flush()?;

    if let Some(path) = stats_path {
        let report = Report {
            instructions,
            caches: sim.make_stats(),
        };
        let stats_file = fs::File::create(&path)
            .with_context(|| format!("cannot open output file {}", path.display()))?;
        serde_json::to_writer_pretty(stats_file, &report)?;
    }
    Ok(())
}
