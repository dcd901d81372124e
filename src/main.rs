use std::process::ExitCode;

use anyhow::{Context, bail};
use mdl_convert::{Converter, ConverterConfig, PoolMode, PreviewFormat};

const USAGE: &str = "usage: mdl-convert [--preview png|bmp] [--export-obj] [--shared-pools] [--no-verify] <asset>...";

fn parse_args(mut args: impl Iterator<Item = String>) -> anyhow::Result<(ConverterConfig, Vec<String>)> {
    let mut config = ConverterConfig::from_env();
    let mut assets = Vec::new();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--preview" => {
                let format = args.next().context("--preview needs a format")?;
                config.preview = Some(
                    format
                        .parse::<PreviewFormat>()
                        .map_err(anyhow::Error::msg)?,
                );
            }
            "--export-obj" => config.export_obj = true,
            "--shared-pools" => config.pool_mode = PoolMode::Shared,
            "--no-verify" => config.verify_round_trip = false,
            flag if flag.starts_with("--") => bail!("unknown option {flag}\n{USAGE}"),
            asset => assets.push(asset.to_string()),
        }
    }
    if assets.is_empty() {
        bail!("no asset given\n{USAGE}");
    }
    Ok((config, assets))
}

fn main() -> anyhow::Result<ExitCode> {
    if let Err(e) = env_logger::try_init() {
        println!("Warning: Could not initialize logger: {}", e);
    };

    let (config, assets) = parse_args(std::env::args().skip(1))?;
    log::info!(
        "Reading models from {}, textures from {}, writing to {}",
        config.models_dir.display(),
        config.textures_dir.display(),
        config.converted_dir.display()
    );

    let converter = Converter::new(config);
    let results = converter.convert_batch(&assets);

    let mut failed = 0;
    for (asset, result) in &results {
        match result {
            Ok(report) => println!(
                "{asset}: {} ({} surfaces, {} vertices, {} materials)",
                report.output.display(),
                report.surfaces,
                report.vertices,
                report.materials
            ),
            Err(e) => {
                failed += 1;
                eprintln!("{asset}: {e}");
            }
        }
    }

    if failed > 0 {
        eprintln!("{failed} of {} assets failed", results.len());
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
