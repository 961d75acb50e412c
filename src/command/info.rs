use super::open_output;
use crate::audio::DecoderRegistry;
use crate::utils::{count_files, enumerate_files, format_size};
use crate::AUDIO_EXTENSIONS;

use anyhow::Result;
use std::io::Write;
use std::path::{Path, PathBuf};

// Print the folder's file count and the header of each audio file
pub fn get_audio_info(input: &Path, output: Option<&PathBuf>) -> Result<()> {
    let mut out = open_output(output)?;
    let decoders = DecoderRegistry::default();

    writeln!(out, "Folder: {}", input.display())?;
    writeln!(out, "Files: {}", count_files(input)?)?;
    writeln!(out, "Supported formats: {}\n", AUDIO_EXTENSIONS.join(", "))?;

    for file in enumerate_files(input)? {
        if !decoders.supports(&file) {
            continue;
        }

        writeln!(out, "File: {}", file.relative.display())?;
        writeln!(out, "Size: {}", format_size(file.size))?;
        match decoders.read_header(&file) {
            Ok(header) => writeln!(out, "{}\n", header.format_info())?,
            Err(e) => writeln!(out, "Error: {}\n", e)?,
        }
    }

    out.flush()?;
    Ok(())
}
