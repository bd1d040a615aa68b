use super::*;

/// Build a minimal bytecode blob with a constant table: `CTAB` tag at
/// byte 8, table entries after a 20-byte body header, names at the end.
fn ctab(entries: &[(&str, i16, i16)]) -> Vec<u8> {
    const TABLE_AT: usize = 20;
    let names_at = TABLE_AT + entries.len() * CTAB_ENTRY_SIZE;

    let mut body = vec![0u8; names_at];
    body[12..16].copy_from_slice(&(entries.len() as u32).to_le_bytes());
    body[16..20].copy_from_slice(&(TABLE_AT as u32).to_le_bytes());
    let mut name_offset = names_at;
    for (i, (name, register, size)) in entries.iter().enumerate() {
        let e = TABLE_AT + i * CTAB_ENTRY_SIZE;
        body[e..e + 4].copy_from_slice(&(name_offset as u32).to_le_bytes());
        body[e + 6..e + 8].copy_from_slice(&register.to_le_bytes());
        body[e + 8..e + 10].copy_from_slice(&size.to_le_bytes());
        name_offset += name.len() + 1;
    }
    for (name, _, _) in entries {
        body.extend_from_slice(name.as_bytes());
        body.push(0);
    }

    let mut buf = vec![0u8; 8];
    buf.extend_from_slice(CTAB_TAG);
    buf.extend_from_slice(&body);
    buf
}

#[test]
fn test_extract_resolves_registered_names() {
    let registry = ShaderDataRegistry::new();
    let bytecode = ctab(&[("modelToClip", 0, 4), ("materialColor", 4, 1)]);
    let uniforms = extract_uniforms(&bytecode, &registry).unwrap();

    assert_eq!(uniforms.len(), 2);
    assert_eq!(uniforms[0].name.as_deref(), Some("modelToClip"));
    assert_eq!(uniforms[0].data_index, 0x001);
    assert_eq!(uniforms[0].secondary_index, 0x001);
    assert_eq!(uniforms[0].register, 0);
    assert_eq!(uniforms[0].register_size, 4);
    assert_eq!(uniforms[0].flags, registry.flags_for(0x001) as i32);

    assert_eq!(uniforms[1].data_index, 0x020);
    assert_eq!(uniforms[1].register, 4);
    assert_eq!(uniforms[1].register_size, 1);
}

#[test]
fn test_missing_tag_is_rejected() {
    let mut bytecode = ctab(&[("modelToClip", 0, 4)]);
    bytecode[8] = b'X';
    assert!(matches!(
        extract_uniforms(&bytecode, &ShaderDataRegistry::new()),
        Err(CompileError::MissingConstantTable)
    ));
    assert!(matches!(
        extract_uniforms(&[0u8; 4], &ShaderDataRegistry::new()),
        Err(CompileError::MissingConstantTable)
    ));
}

#[test]
fn test_unregistered_name_is_an_error() {
    let bytecode = ctab(&[("notAShaderData", 0, 1)]);
    match extract_uniforms(&bytecode, &ShaderDataRegistry::new()) {
        Err(CompileError::UnknownUniform { name }) => assert_eq!(name, "notAShaderData"),
        other => panic!("expected UnknownUniform, got {other:?}"),
    }
}

#[test]
fn test_truncated_table_never_panics() {
    let registry = ShaderDataRegistry::new();
    let bytecode = ctab(&[("modelToClip", 0, 4)]);
    for len in 12..bytecode.len() {
        match extract_uniforms(&bytecode[..len], &registry) {
            Err(CompileError::Truncated) | Ok(_) => {}
            other => panic!("unexpected result at len {len}: {other:?}"),
        }
    }
}

#[test]
fn test_oversized_count_is_truncated() {
    let mut bytecode = ctab(&[("modelToClip", 0, 4)]);
    bytecode[24..28].copy_from_slice(&u32::MAX.to_le_bytes());
    assert!(matches!(
        extract_uniforms(&bytecode, &ShaderDataRegistry::new()),
        Err(CompileError::Truncated)
    ));
}

#[cfg(unix)]
mod subprocess {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    fn fake_compiler(dir: &Path, script: &str) -> PathBuf {
        let exe = dir.join("fakefxc");
        fs::write(&exe, script).unwrap();
        fs::set_permissions(&exe, fs::Permissions::from_mode(0o755)).unwrap();
        exe
    }

    #[test]
    fn test_compile_reads_back_the_object_file() {
        let dir = tempfile::tempdir().unwrap();
        // argv: -T <profile> -Fo <object> -I <include> <source>
        let exe = fake_compiler(dir.path(), "#!/bin/sh\ncp \"$7\" \"$4\"\n");
        let source = dir.path().join("shader.hlsl");
        fs::write(&source, b"float4 main() : COLOR0 { return 0; }").unwrap();

        let compiler =
            ExternalCompiler::locate(Some(exe), dir.path().to_path_buf()).unwrap();
        let bytecode = compiler.compile("ps_3_0", &source).unwrap();
        assert_eq!(bytecode, fs::read(&source).unwrap());
    }

    #[test]
    fn test_compiler_stderr_is_carried_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let exe = fake_compiler(dir.path(), "#!/bin/sh\necho 'X3000: syntax error' >&2\nexit 1\n");
        let source = dir.path().join("shader.hlsl");
        fs::write(&source, b"garbage").unwrap();

        let compiler =
            ExternalCompiler::locate(Some(exe), dir.path().to_path_buf()).unwrap();
        match compiler.compile("vs_3_0", &source) {
            Err(CompileError::CompilerFailed { source_file, stderr }) => {
                assert_eq!(source_file, source);
                assert!(stderr.contains("X3000: syntax error"));
            }
            other => panic!("expected CompilerFailed, got {other:?}"),
        }
    }
}
