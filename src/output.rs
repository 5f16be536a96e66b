use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use crate::DisplayError;

const EXTENSION: &str = ".mcfunction";
const FALLBACK_STEM: &str = "image";

/// `photo.v2.png` becomes `photo.mcfunction`.
pub fn output_file_name(source: &Path) -> String {
    let name = source
        .file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_default();
    let stem = name.split('.').next().unwrap_or_default();
    if stem.is_empty() {
        format!("{FALLBACK_STEM}{EXTENSION}")
    } else {
        format!("{stem}{EXTENSION}")
    }
}

/// Writes one command per line, without a trailing newline.
pub fn write_commands_to<W: Write>(writer: W, commands: &[String]) -> std::io::Result<()> {
    let mut writer = BufWriter::new(writer);
    for (index, command) in commands.iter().enumerate() {
        if index > 0 {
            writer.write_all(b"\n")?;
        }
        writer.write_all(command.as_bytes())?;
    }
    writer.flush()
}

pub fn write_commands(path: impl AsRef<Path>, commands: &[String]) -> Result<(), DisplayError> {
    let file = File::create(path).map_err(DisplayError::WriteOutputFailed)?;
    write_commands_to(file, commands).map_err(DisplayError::WriteOutputFailed)
}
