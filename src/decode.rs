use std::{path::Path, thread};

use log::debug;

use crate::{DisplayError, PixelBuffer};

pub fn read_image(image_path: impl AsRef<Path>) -> Result<Vec<u8>, DisplayError> {
    std::fs::read(image_path).map_err(DisplayError::ReadImageFailed)
}

/// Decodes any format `image` recognises into RGBA8.
pub fn decode(bytes: &[u8]) -> Result<PixelBuffer, DisplayError> {
    if bytes.is_empty() {
        return Err(DisplayError::EmptyInput);
    }
    let image_object = match image::load_from_memory(bytes) {
        Ok(image_object) => image_object.into_rgba8(),
        Err(error) => return Err(DisplayError::DecodeImageFailed(error)),
    };
    debug!(
        "decoded {}x{} image",
        image_object.width(),
        image_object.height()
    );
    Ok(image_object)
}

/// A decode running on its own thread.
pub struct DecodeHandle {
    handle: thread::JoinHandle<Result<PixelBuffer, DisplayError>>,
}

impl DecodeHandle {
    /// Blocks until the decoder is done.
    pub fn wait(self) -> Result<PixelBuffer, DisplayError> {
        match self.handle.join() {
            Ok(result) => result,
            Err(_) => Err(DisplayError::DecodeThreadPanicked),
        }
    }
}

pub fn spawn_decode(bytes: Vec<u8>) -> DecodeHandle {
    debug!("launching decoder thread for {} bytes...", bytes.len());
    DecodeHandle {
        handle: thread::spawn(move || decode(&bytes)),
    }
}
