use dot_display::{
    generate_parallel, read_image, spawn_decode, write_commands, write_commands_to, DisplayError,
    LayoutParams,
};
use log::{debug, info};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum Destination {
    File(PathBuf),
    Stdout,
}

pub fn convert(
    image: &Path,
    params: &LayoutParams,
    destination: &Destination,
    batch_size: usize,
    threads: usize,
) -> Result<usize, DisplayError> {
    debug!("reading {}...", image.display());
    let bytes = read_image(image)?;
    let buffer = spawn_decode(bytes).wait()?;
    debug!("generating commands with {params:?}...");
    let commands = generate_parallel(&buffer, params, batch_size, threads);
    match destination {
        Destination::File(path) => {
            write_commands(path, &commands)?;
            info!("wrote {} commands to {}", commands.len(), path.display());
        }
        Destination::Stdout => {
            write_commands_to(std::io::stdout().lock(), &commands)
                .map_err(DisplayError::WriteOutputFailed)?;
        }
    }
    Ok(commands.len())
}
