//! Build command - bake builder permutations into compiled shader records.
//!
//! For every builder record (and render type) in the input shader library,
//! enumerate the vertex and pixel fragment combinations, assemble each
//! combination's HLSL source, run the external compiler, and disassemble
//! the constant table back into uniform descriptors. Each vertex x pixel
//! pair becomes one `StandardShader` record named after its signatures.

use std::collections::HashSet;
use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use smelt_common::formats::{
    CompiledShader, FragmentLibrary, FragmentStage, ShaderLibrary, StandardShader,
    signature_string,
};
use smelt_common::shader_data::ShaderDataRegistry;
use smelt_gen::{
    AssembledSource, Combination, ExternalCompiler, assemble, enumerate, extract_uniforms,
    resolve_signature,
};

use crate::container;

/// Arguments for the build command
#[derive(Args)]
pub struct BuildArgs {
    /// Shader library holding the builder records
    pub library: PathBuf,

    /// Fragment library the builders' selectors index into
    #[arg(long)]
    pub fragments: PathBuf,

    /// Only build entries for this render type
    #[arg(long)]
    pub render_type: Option<u8>,

    /// Shader compiler executable (default: `fxc` from PATH)
    #[arg(long)]
    pub compiler: Option<PathBuf>,

    /// Include directory passed to the compiler
    #[arg(long, default_value = ".")]
    pub include: PathBuf,

    /// Vertex shader target profile
    #[arg(long, default_value = "vs_3_0")]
    pub vs_profile: String,

    /// Pixel shader target profile
    #[arg(long, default_value = "ps_3_0")]
    pub ps_profile: String,

    /// Output library file, or output directory with --dry-run
    #[arg(short, long)]
    pub output: PathBuf,

    /// Stop after assembly and write the .hlsl sources instead
    #[arg(long)]
    pub dry_run: bool,
}

/// Execute the build command
pub fn execute(args: BuildArgs) -> Result<()> {
    let library = container::load_shaders(&args.library)?;
    let fragments = container::load_fragments(&args.fragments)?;
    let registry = ShaderDataRegistry::new();

    if args.dry_run {
        return dry_run(&args, &library, &fragments);
    }

    let compiler = ExternalCompiler::locate(args.compiler.clone(), args.include.clone())?;
    println!("=== Building {} ===", args.library.display());
    println!("  compiler: {}", compiler.exe().display());
    println!("  builders: {}", library.builders.len());

    let mut baked = Vec::new();
    for builder in &library.builders {
        for entry in &builder.entries {
            if args.render_type.is_some_and(|rt| rt != entry.render_type) {
                continue;
            }
            let vertex = compile_stage(
                &entry.vertex_selectors,
                FragmentStage::Vertex,
                &args.vs_profile,
                &fragments,
                &compiler,
                &registry,
            )?;
            let pixel = compile_stage(
                &entry.pixel_selectors,
                FragmentStage::Pixel,
                &args.ps_profile,
                &fragments,
                &compiler,
                &registry,
            )?;
            tracing::info!(
                builder = format_args!("{:#010x}", builder.id),
                render_type = entry.render_type,
                vertex = vertex.len(),
                pixel = pixel.len(),
                "compiled combinations"
            );
            // Every vertex combination can run against every pixel
            // combination at this render type.
            for vs in &vertex {
                for ps in &pixel {
                    baked.push(StandardShader {
                        id: builder.id,
                        entries: vec![(entry.render_type, vs.clone(), ps.clone())],
                        name: pair_name(&vs.signature, &ps.signature),
                    });
                }
            }
        }
    }

    println!("  baked shaders: {}", baked.len());
    let mut output = library.clone();
    output.shaders.extend(baked);
    fs::write(&args.output, output.encode())
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    println!("  wrote {}", args.output.display());
    Ok(())
}

/// Enumerate and compile one stage's combinations. The enumerator already
/// merges converging branch paths; the guard here keeps the output to one
/// record per signature even if a selector list repeats one outright.
fn compile_stage(
    selectors: &[smelt_common::formats::ShaderFragmentSelector],
    stage: FragmentStage,
    profile: &str,
    fragments: &FragmentLibrary,
    compiler: &ExternalCompiler,
    registry: &ShaderDataRegistry,
) -> Result<Vec<CompiledShader>> {
    let mut seen: HashSet<[u8; 32]> = HashSet::new();
    let mut compiled = Vec::new();
    for combination in enumerate(selectors) {
        if !seen.insert(combination.signature) {
            continue;
        }
        let assembled = assemble_combination(fragments, stage, &combination)?;

        let mut source = tempfile::Builder::new()
            .suffix(".hlsl")
            .tempfile()
            .context("failed to create scratch source file")?;
        source
            .write_all(assembled.source.as_bytes())
            .context("failed to write scratch source file")?;
        let bytecode = compiler
            .compile(profile, source.path())
            .with_context(|| format!("compiling {stage:?} {}", sig_name(&combination.signature)))?;
        let uniforms = extract_uniforms(&bytecode, registry)
            .with_context(|| format!("constant table of {}", sig_name(&combination.signature)))?;

        let shader = CompiledShader {
            signature: combination.signature,
            start_registers: uniforms.iter().map(|u| u.register as i32).collect(),
            uniforms,
            bytecode,
            flags: combination.flags as i32,
        };
        compiled.push(shader);
    }
    Ok(compiled)
}

fn assemble_combination(
    fragments: &FragmentLibrary,
    stage: FragmentStage,
    combination: &Combination,
) -> Result<AssembledSource> {
    let resolved = resolve_signature(fragments, stage, &combination.signature)?;
    Ok(assemble(stage, &resolved)?)
}

/// Assemble every combination and write the sources instead of compiling.
fn dry_run(args: &BuildArgs, library: &ShaderLibrary, fragments: &FragmentLibrary) -> Result<()> {
    fs::create_dir_all(&args.output)
        .with_context(|| format!("failed to create {}", args.output.display()))?;
    let mut written = 0;
    for builder in &library.builders {
        for entry in &builder.entries {
            if args.render_type.is_some_and(|rt| rt != entry.render_type) {
                continue;
            }
            for (stage, ext, selectors) in [
                (FragmentStage::Vertex, "vs", &entry.vertex_selectors),
                (FragmentStage::Pixel, "ps", &entry.pixel_selectors),
            ] {
                for combination in enumerate(selectors) {
                    let assembled = assemble_combination(fragments, stage, &combination)?;
                    let file = args.output.join(format!(
                        "{:08x}_rt{}_{}.{ext}.hlsl",
                        builder.id,
                        entry.render_type,
                        sig_name(&combination.signature)
                    ));
                    write_if_absent(&file, assembled.source.as_bytes())?;
                    written += 1;
                }
            }
        }
    }
    println!("wrote {} sources to {}", written, args.output.display());
    Ok(())
}

/// Duplicate signatures reached through different branches produce the same
/// source; the first write wins.
fn write_if_absent(file: &Path, contents: &[u8]) -> Result<()> {
    if !file.exists() {
        fs::write(file, contents).with_context(|| format!("failed to write {}", file.display()))?;
    }
    Ok(())
}

fn sig_name(signature: &[u8; 32]) -> String {
    let s = signature_string(signature);
    if s.is_empty() { "empty".to_string() } else { s }
}

fn pair_name(vertex: &[u8; 32], pixel: &[u8; 32]) -> String {
    format!("v{}_p{}", sig_name(vertex), sig_name(pixel))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_names() {
        let mut vs = [0u8; 32];
        vs[0] = 5;
        vs[1] = 12;
        let ps = [0u8; 32];
        assert_eq!(pair_name(&vs, &ps), "v050c_pempty");
    }

    #[cfg(unix)]
    mod stage_compilation {
        use super::*;
        use smelt_common::formats::{CheckKind, ShaderFragment, ShaderFragmentSelector};
        use std::os::unix::fs::PermissionsExt;

        /// Bytecode carrying an empty constant table: `CTAB` tag at byte 8
        /// followed by a 20-byte body with count 0 and table offset 20.
        fn empty_ctab_bytecode() -> Vec<u8> {
            let mut buf = vec![0u8; 8];
            buf.extend_from_slice(b"CTAB");
            let mut body = [0u8; 20];
            body[16..20].copy_from_slice(&20u32.to_le_bytes());
            buf.extend_from_slice(&body);
            buf
        }

        #[test]
        fn test_one_compiled_record_per_signature() {
            let dir = tempfile::tempdir().unwrap();
            fs::write(dir.path().join("object.bin"), empty_ctab_bytecode()).unwrap();
            // argv: -T <profile> -Fo <object> -I <include> <source>
            let script = format!(
                "#!/bin/sh\necho run >> {0}/calls.log\ncp {0}/object.bin \"$4\"\n",
                dir.path().display()
            );
            let exe = dir.path().join("fakefxc");
            fs::write(&exe, script).unwrap();
            fs::set_permissions(&exe, fs::Permissions::from_mode(0o755)).unwrap();
            let compiler =
                ExternalCompiler::locate(Some(exe), dir.path().to_path_buf()).unwrap();

            let fragments = FragmentLibrary {
                version: 7,
                vertex_fragments: Vec::new(),
                pixel_fragments: vec![ShaderFragment {
                    stage: FragmentStage::Pixel,
                    input: 0,
                    output: 0x10,
                    texcoord_count: 0,
                    texcoord_components: 0,
                    flags: 0,
                    main_code: "current.color = float4(1, 1, 1, 1);".to_string(),
                    declare_code: String::new(),
                    uniforms: Vec::new(),
                    name: None,
                }],
                name: "test".to_string(),
            };

            // A branching terminator converges on the same [1] sequence
            // down both paths; the stage compiles that signature once and
            // the record keeps the include path's flags.
            let include = ShaderFragmentSelector {
                fragment_index: 1,
                check_kind: CheckKind::Unconditional,
                operands: [0; 3],
                vertex_usage_flags: 0,
                required_flags: 0,
                excluded_flags: 0,
                flags: 0,
            };
            let branch = ShaderFragmentSelector {
                fragment_index: 0,
                check_kind: CheckKind::HasData,
                operands: [0x020, 0, 0],
                flags: 0x8,
                ..include.clone()
            };

            let compiled = compile_stage(
                &[include, branch],
                FragmentStage::Pixel,
                "ps_3_0",
                &fragments,
                &compiler,
                &ShaderDataRegistry::new(),
            )
            .unwrap();

            assert_eq!(compiled.len(), 1);
            assert_eq!(compiled[0].flags, 0x8);
            let calls = fs::read_to_string(dir.path().join("calls.log")).unwrap();
            assert_eq!(calls.lines().count(), 1);
        }
    }
}
