//! Info command - print a summary of a library file.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use smelt_common::formats::{FragmentLibrary, ShaderLibrary};

use crate::container::{self, Container};

/// Arguments for the info command
#[derive(Args)]
pub struct InfoArgs {
    /// Library file (fragment or shader library)
    pub file: PathBuf,
}

/// Execute the info command
pub fn execute(args: InfoArgs) -> Result<()> {
    match container::load(&args.file)? {
        Container::Fragments(library) => print_fragments(&library),
        Container::Shaders(library) => print_shaders(&library),
    }
    Ok(())
}

fn print_fragments(library: &FragmentLibrary) {
    println!(
        "fragment library \"{}\" (version {})",
        library.name, library.version
    );
    for (label, table) in [
        ("vertex", &library.vertex_fragments),
        ("pixel", &library.pixel_fragments),
    ] {
        println!("  {} fragments: {}", label, table.len());
        for (i, fragment) in table.iter().enumerate() {
            println!(
                "    {:3} {:24} in={:#06x} out={:#06x} uniforms={}",
                i + 1,
                fragment.name.as_deref().unwrap_or("-"),
                fragment.input,
                fragment.output,
                fragment.uniforms.len()
            );
        }
    }
}

fn print_shaders(library: &ShaderLibrary) {
    println!(
        "shader library \"{}\" (version {})",
        library.name, library.version
    );
    println!("  shaders: {}", library.shaders.len());
    for shader in &library.shaders {
        println!(
            "    {:#010x} {:24} render types: {}",
            shader.id,
            or_dash(&shader.name),
            shader.entries.len()
        );
    }
    println!("  builders: {}", library.builders.len());
    for builder in &library.builders {
        let selectors: usize = builder
            .entries
            .iter()
            .map(|e| e.vertex_selectors.len() + e.pixel_selectors.len())
            .sum();
        println!(
            "    {:#010x} {:24} render types: {}, selectors: {}",
            builder.id,
            or_dash(&builder.name),
            builder.entries.len(),
            selectors
        );
    }
    if !library.legacy_a.is_empty() || !library.legacy_b.is_empty() {
        println!(
            "  legacy blobs: {} + {}",
            library.legacy_a.len(),
            library.legacy_b.len()
        );
    }
}

fn or_dash(name: &str) -> &str {
    if name.is_empty() { "-" } else { name }
}
