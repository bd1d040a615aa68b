//! Unpack command - spill a library's records out as individual files.
//!
//! Fragment libraries unpack to `vertex/<index>(<name>).fragment` and
//! `pixel/<index>(<name>).fragment`; shader libraries to
//! `<hexId>(<name>).shader` and `<hexId>(<name>).builder`. Both kinds also
//! get a small `library.txt` manifest.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use smelt_common::formats::{FragmentLibrary, ShaderLibrary};

use crate::container::{self, Container};

/// Arguments for the unpack command
#[derive(Args)]
pub struct UnpackArgs {
    /// Library file (fragment or shader library)
    pub file: PathBuf,

    /// Output directory (created if missing)
    #[arg(short, long)]
    pub output: PathBuf,
}

/// Execute the unpack command
pub fn execute(args: UnpackArgs) -> Result<()> {
    let written = match container::load(&args.file)? {
        Container::Fragments(library) => unpack_fragments(&library, &args.output)?,
        Container::Shaders(library) => unpack_shaders(&library, &args.output)?,
    };
    println!("unpacked {} files to {}", written, args.output.display());
    Ok(())
}

fn unpack_fragments(library: &FragmentLibrary, out: &Path) -> Result<usize> {
    let mut written = 0;
    for (stage_dir, table) in [
        ("vertex", &library.vertex_fragments),
        ("pixel", &library.pixel_fragments),
    ] {
        let dir = out.join(stage_dir);
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
        for (i, fragment) in table.iter().enumerate() {
            let file = dir.join(record_file_name(
                &format!("{:03}", i + 1),
                fragment.name.as_deref().unwrap_or(""),
                "fragment",
            ));
            fs::write(&file, fragment.to_bytes())
                .with_context(|| format!("failed to write {}", file.display()))?;
            written += 1;
        }
    }
    write_manifest(out, &library.name, library.version)?;
    Ok(written + 1)
}

fn unpack_shaders(library: &ShaderLibrary, out: &Path) -> Result<usize> {
    fs::create_dir_all(out).with_context(|| format!("failed to create {}", out.display()))?;
    let mut written = 0;
    for shader in &library.shaders {
        let file = out.join(record_file_name(
            &format!("{:08x}", shader.id),
            &shader.name,
            "shader",
        ));
        fs::write(&file, shader.to_bytes())
            .with_context(|| format!("failed to write {}", file.display()))?;
        written += 1;
    }
    for builder in &library.builders {
        let file = out.join(record_file_name(
            &format!("{:08x}", builder.id),
            &builder.name,
            "builder",
        ));
        fs::write(&file, builder.to_bytes(library.version))
            .with_context(|| format!("failed to write {}", file.display()))?;
        written += 1;
    }
    write_manifest(out, &library.name, library.version)?;
    Ok(written + 1)
}

fn write_manifest(out: &Path, name: &str, version: u32) -> Result<()> {
    let file = out.join("library.txt");
    fs::write(&file, format!("name: {name}\nversion: {version}\n"))
        .with_context(|| format!("failed to write {}", file.display()))
}

/// `<key>(<name>).<ext>`, dropping the parens when the record is unnamed.
fn record_file_name(key: &str, name: &str, ext: &str) -> String {
    if name.is_empty() {
        format!("{key}.{ext}")
    } else {
        format!("{key}({name}).{ext}")
    }
}
