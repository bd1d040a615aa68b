use super::*;
use smelt_common::formats::FragmentLibrary;

fn fragment(stage: FragmentStage) -> ShaderFragment {
    ShaderFragment {
        stage,
        input: 0,
        output: 0,
        texcoord_count: 0,
        texcoord_components: 0,
        flags: 0,
        main_code: String::new(),
        declare_code: String::new(),
        uniforms: Vec::new(),
        name: None,
    }
}

fn uniform(name: &str, size: i16) -> UniformDescriptor {
    UniformDescriptor {
        name: Some(name.to_string()),
        data_index: 0x080,
        secondary_index: 0x080,
        register_size: size,
        register: 0,
        flags: 0,
    }
}

#[test]
fn test_register_allocation_is_a_running_sum() {
    let first = ShaderFragment {
        uniforms: vec![uniform("customParams0", 2), uniform("customParams1", 1)],
        ..fragment(FragmentStage::Vertex)
    };
    let second = ShaderFragment {
        uniforms: vec![uniform("customParams2", 3)],
        ..fragment(FragmentStage::Vertex)
    };
    let assembled = assemble(FragmentStage::Vertex, &[&first, &second]).unwrap();

    let registers: Vec<i16> = assembled.uniforms.iter().map(|u| u.register).collect();
    assert_eq!(registers, vec![0, 2, 3]);
    assert_eq!(assembled.start_registers(), vec![0, 2, 3]);
    assert!(assembled.source.contains("register(c0)"));
    assert!(assembled.source.contains("register(c2)"));
    assert!(assembled.source.contains("register(c3)"));
}

#[test]
fn test_uniform_declaration_types() {
    let frag = ShaderFragment {
        uniforms: vec![
            uniform("materialColor", 1),
            uniform("modelToClip", 4),
            uniform("skinningPalette", 54),
        ],
        ..fragment(FragmentStage::Vertex)
    };
    let assembled = assemble(FragmentStage::Vertex, &[&frag]).unwrap();
    assert!(
        assembled
            .source
            .contains("extern uniform float4 materialColor : register(c0);")
    );
    assert!(
        assembled
            .source
            .contains("extern uniform float4x4 modelToClip : register(c1);")
    );
    assert!(
        assembled
            .source
            .contains("extern uniform float4 skinningPalette[54] : register(c5);")
    );
}

#[test]
fn test_struct_fields_follow_the_or_of_masks() {
    let a = ShaderFragment {
        input: 0x1,   // position
        output: 0x1,
        ..fragment(FragmentStage::Vertex)
    };
    let b = ShaderFragment {
        input: 0x2,   // normal
        output: 0x100, // texcoord0
        ..fragment(FragmentStage::Vertex)
    };
    let assembled = assemble(FragmentStage::Vertex, &[&a, &b]).unwrap();
    let src = &assembled.source;

    assert!(src.contains("float4 position : POSITION;"));
    assert!(src.contains("float3 normal : NORMAL;"));
    assert!(src.contains("float4 texcoord0 : TEXCOORD0;"));
    // Prologue copies declared inputs, epilogue copies declared outputs.
    assert!(src.contains("current.position = In.position;"));
    assert!(src.contains("current.normal = In.normal;"));
    assert!(src.contains("Out.position = current.position;"));
    assert!(src.contains("Out.texcoord0 = current.texcoord0;"));
    // Undeclared channels stay out.
    assert!(!src.contains("tangent"));
}

#[test]
fn test_bodies_concatenate_in_list_order() {
    let a = ShaderFragment {
        main_code: "current.position = mul(modelToClip, In.position);".to_string(),
        input: 0x1,
        output: 0x1,
        ..fragment(FragmentStage::Vertex)
    };
    let b = ShaderFragment {
        main_code: "current.color = materialColor;".to_string(),
        output: 0x10,
        ..fragment(FragmentStage::Vertex)
    };
    let assembled = assemble(FragmentStage::Vertex, &[&a, &b]).unwrap();
    let first = assembled.source.find("mul(modelToClip").unwrap();
    let second = assembled.source.find("current.color").unwrap();
    assert!(first < second);
}

#[test]
fn test_sampler_and_texcoord_renumbering() {
    // Two pixel fragments each authored against local sampler 0 and local
    // TEXCOORD 0 semantics; the second is shifted by the first's counts.
    let a = ShaderFragment {
        input: 0x100, // texcoord0
        output: 0x10, // color
        declare_code: "sampler sampler0 : register(s0);".to_string(),
        main_code: "current.color = tex2D(sampler0, uv); // TEXCOORD0".to_string(),
        ..fragment(FragmentStage::Pixel)
    };
    let b = ShaderFragment {
        input: 0x200, // texcoord1
        output: 0x10,
        declare_code: "sampler sampler0 : register(s0);".to_string(),
        main_code: "current.color *= tex2D(sampler0, uv2); // TEXCOORD0".to_string(),
        ..fragment(FragmentStage::Pixel)
    };
    let assembled = assemble(FragmentStage::Pixel, &[&a, &b]).unwrap();
    let src = &assembled.source;

    assert!(src.contains("sampler sampler0 : register(s0);"));
    assert!(src.contains("sampler sampler1 : register(s1);"));
    assert!(src.contains("tex2D(sampler0, uv)"));
    assert!(src.contains("tex2D(sampler1, uv2)"));
    assert!(src.contains("// TEXCOORD0"));
    assert!(src.contains("// TEXCOORD1"));
}

#[test]
fn test_stacked_sampler_bindings_get_distinct_registers() {
    // Two fragments authored against the same local slot: the second's
    // identifier and its register binding must shift together, or both
    // declarations end up bound to s0.
    let frag = ShaderFragment {
        input: 0x100,
        output: 0x10,
        declare_code: "sampler sampler0 : register(s0);".to_string(),
        main_code: "current.color = tex2D(sampler0, current.texcoord0.xy);".to_string(),
        ..fragment(FragmentStage::Pixel)
    };
    let assembled = assemble(FragmentStage::Pixel, &[&frag, &frag]).unwrap();
    let src = &assembled.source;

    assert!(src.contains("sampler sampler0 : register(s0);"));
    assert!(src.contains("sampler sampler1 : register(s1);"));
    assert!(!src.contains("sampler1 : register(s0)"));
}

#[test]
fn test_named_sampler_binding_still_occupies_a_slot() {
    // A fragment may bind a descriptive name straight to a register with
    // no sampler<n> identifier; the slot still counts toward the base
    // offset of everything stacked after it.
    let a = ShaderFragment {
        output: 0x10,
        declare_code: "sampler diffuse : register(s0);".to_string(),
        main_code: "current.color = tex2D(diffuse, uv);".to_string(),
        ..fragment(FragmentStage::Pixel)
    };
    let b = ShaderFragment {
        output: 0x10,
        declare_code: "sampler sampler0 : register(s0);".to_string(),
        main_code: "current.color *= tex2D(sampler0, uv);".to_string(),
        ..fragment(FragmentStage::Pixel)
    };
    let assembled = assemble(FragmentStage::Pixel, &[&a, &b]).unwrap();
    assert!(assembled.source.contains("sampler diffuse : register(s0);"));
    assert!(assembled.source.contains("sampler sampler1 : register(s1);"));
}

#[test]
fn test_sampler_type_names_are_not_renumbered() {
    let a = ShaderFragment {
        declare_code: "sampler sampler0 : register(s0);".to_string(),
        main_code: "current.color = tex2D(sampler0, uv);".to_string(),
        output: 0x10,
        ..fragment(FragmentStage::Pixel)
    };
    let b = ShaderFragment {
        declare_code: "sampler2D sampler0;".to_string(),
        main_code: String::new(),
        ..fragment(FragmentStage::Pixel)
    };
    let assembled = assemble(FragmentStage::Pixel, &[&a, &b]).unwrap();
    // `sampler2D` is a type name; only the slot token shifts.
    assert!(assembled.source.contains("sampler2D sampler1;"));
}

#[test]
fn test_vertex_texcoord_base_uses_declared_counts() {
    let a = ShaderFragment {
        texcoord_count: 2,
        texcoord_components: 4,
        output: 0x300, // texcoord0, texcoord1
        main_code: "// writes TEXCOORD0 and TEXCOORD1".to_string(),
        ..fragment(FragmentStage::Vertex)
    };
    let b = ShaderFragment {
        texcoord_count: 1,
        texcoord_components: 4,
        output: 0x400, // texcoord2
        main_code: "// writes TEXCOORD0".to_string(),
        ..fragment(FragmentStage::Vertex)
    };
    let assembled = assemble(FragmentStage::Vertex, &[&a, &b]).unwrap();
    assert!(assembled.source.contains("// writes TEXCOORD0 and TEXCOORD1"));
    assert!(assembled.source.contains("// writes TEXCOORD2"));
}

#[test]
fn test_conflicting_texcoord_widths_are_an_error() {
    let a = ShaderFragment {
        texcoord_count: 1,
        texcoord_components: 2,
        output: 0x100,
        ..fragment(FragmentStage::Vertex)
    };
    let b = ShaderFragment {
        texcoord_count: 1,
        texcoord_components: 4,
        output: 0x100,
        ..fragment(FragmentStage::Vertex)
    };
    assert_eq!(
        assemble(FragmentStage::Vertex, &[&a, &b]).unwrap_err(),
        AssembleError::ChannelConflict {
            channel: 0,
            first: 2,
            second: 4
        }
    );
}

#[test]
fn test_resolve_signature() {
    let library = FragmentLibrary {
        version: 7,
        vertex_fragments: vec![fragment(FragmentStage::Vertex)],
        pixel_fragments: vec![],
        name: String::new(),
    };
    let mut signature = [0u8; SIGNATURE_SLOTS];
    signature[0] = 1;
    let resolved = resolve_signature(&library, FragmentStage::Vertex, &signature).unwrap();
    assert_eq!(resolved.len(), 1);

    signature[1] = 2;
    assert_eq!(
        resolve_signature(&library, FragmentStage::Vertex, &signature).unwrap_err(),
        AssembleError::MissingFragment {
            index: 2,
            stage: FragmentStage::Vertex
        }
    );
}
