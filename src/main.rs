mod convert_image;

use clap::{Parser, Subcommand};
use convert_image::Destination;
use dot_display::{output_file_name, LayoutParams};
use log::error;
use std::{path::PathBuf, process::ExitCode};

#[derive(Debug, Parser)]
struct Arguments {
    #[arg(short, long, default_value_t = 32768)]
    batch_size: usize,

    #[arg(short, long, default_value_t = num_cpus::get())]
    threads: usize,

    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Turn every opaque pixel of an image into a text_display summon command
    #[command(arg_required_else_help = true)]
    ConvertImage {
        #[arg(short, long)]
        image: PathBuf,

        #[arg(short, long, default_value_t = 0.1, allow_negative_numbers = true, value_parser = parse_finite)]
        pixel_scale: f64,

        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true, value_parser = parse_finite)]
        offset_x: f64,

        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true, value_parser = parse_finite)]
        offset_y: f64,

        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true, value_parser = parse_finite)]
        offset_z: f64,

        /// One glyph per block at unit scale, ignoring pixel scale and offsets
        #[arg(long, conflicts_with_all = ["pixel_scale", "offset_x", "offset_y", "offset_z"])]
        fixed_scale: bool,

        #[arg(short, long, conflicts_with_all = ["output_dir", "stdout"])]
        output: Option<PathBuf>,

        #[arg(long, conflicts_with = "stdout")]
        output_dir: Option<PathBuf>,

        #[arg(long)]
        stdout: bool,
    },
}

fn parse_finite(value: &str) -> Result<f64, String> {
    match value.parse::<f64>() {
        Ok(number) if number.is_finite() => Ok(number),
        Ok(_) => Err(format!("{value} is not a finite number")),
        Err(error) => Err(error.to_string()),
    }
}

fn main() -> ExitCode {
    let arguments = Arguments::parse();
    let default_filter = if arguments.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let mut max_threads = arguments.threads;
    if max_threads == 0 {
        max_threads = num_cpus::get()
    }

    match arguments.command {
        Commands::ConvertImage {
            image,
            pixel_scale,
            offset_x,
            offset_y,
            offset_z,
            fixed_scale,
            output,
            output_dir,
            stdout,
        } => {
            let params = if fixed_scale {
                LayoutParams::fixed_scale()
            } else {
                LayoutParams::new(pixel_scale, [offset_x, offset_y, offset_z])
            };
            let destination = if stdout {
                Destination::Stdout
            } else if let Some(output) = output {
                Destination::File(output)
            } else {
                Destination::File(output_dir.unwrap_or_default().join(output_file_name(&image)))
            };
            if let Err(error) = convert_image::convert(
                &image,
                &params,
                &destination,
                arguments.batch_size,
                max_threads,
            ) {
                error!("{error}");
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}
