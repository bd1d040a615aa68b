//! Semantic uniform registry ("shader data").
//!
//! Every uniform a fragment declares is addressed by a symbolic name that
//! resolves to a numeric slot id plus a set of dependency flags telling the
//! engine which state feeds the register. The two source tables below are
//! the single source of truth for the registered names; unknown names and
//! ids always resolve to a deterministic fallback, so this module never
//! fails.
//!
//! The registry is an explicit immutable value: build it once with
//! [`ShaderDataRegistry::new`] and pass it by reference to whatever needs
//! it. Concurrent reads are safe; there are no writes after construction.

use hashbrown::HashMap;

// ============================================================================
// Dependency flags
// ============================================================================

/// Register contents change with per-model shader data.
pub const DEPENDS_MODEL_DATA: u32 = 1 << 0;
/// Register contents change with the model transform.
pub const DEPENDS_MODEL_TRANSFORM: u32 = 1 << 1;
/// Register contents change with the world (camera/projection) transforms.
pub const DEPENDS_WORLD_TRANSFORM: u32 = 1 << 2;
/// Register contents change with the material color block.
pub const DEPENDS_MATERIAL_COLOR: u32 = 1 << 3;
/// Register contents change with the ambient color block.
pub const DEPENDS_AMBIENT_COLOR: u32 = 1 << 4;
/// Register contents change with the light rig.
pub const DEPENDS_LIGHT_DATA: u32 = 1 << 5;

/// Opaque composite used only by `skinningPalette`.
pub const COMPOSITE_SKINNING: u32 = 0x8000_0000 | DEPENDS_MODEL_DATA | DEPENDS_MODEL_TRANSFORM;
/// Opaque composite used only by `lightingSet`.
pub const COMPOSITE_LIGHTING: u32 = 0x4000_0000 | DEPENDS_AMBIENT_COLOR | DEPENDS_LIGHT_DATA;

// ============================================================================
// Source tables
// ============================================================================

/// Registered (name, slot id) pairs.
///
/// Ids are grouped by concern and carry gaps for the same reason the file
/// format carries them: real containers reference these exact values.
const NAMES: &[(&str, u32)] = &[
    // Transforms
    ("modelToClip", 0x001),
    ("modelToCamera", 0x002),
    ("modelToWorld", 0x003),
    ("worldToClip", 0x004),
    ("worldToCamera", 0x005),
    ("worldToModel", 0x006),
    ("cameraToClip", 0x007),
    ("cameraToWorld", 0x008),
    ("clipToWorld", 0x009),
    ("clipToCamera", 0x00A),
    ("viewTransform", 0x00B),
    ("projectionTransform", 0x00C),
    ("viewProjTransform", 0x00D),
    ("prevModelToClip", 0x00E),
    // Camera
    ("cameraPosition", 0x010),
    ("cameraDirection", 0x011),
    ("cameraUp", 0x012),
    ("cameraRight", 0x013),
    ("cameraParams", 0x014),
    ("viewportSize", 0x015),
    ("pixelSize", 0x016),
    // Time
    ("time", 0x018),
    ("elapsedTime", 0x019),
    ("frameCount", 0x01A),
    ("randomVector", 0x01B),
    ("gameSpeed", 0x01C),
    // Material
    ("materialColor", 0x020),
    ("materialParams0", 0x021),
    ("materialParams1", 0x022),
    ("materialParams2", 0x023),
    ("materialParams3", 0x024),
    ("materialParams4", 0x025),
    ("materialParams5", 0x026),
    ("materialParams6", 0x027),
    ("materialParams7", 0x028),
    ("diffuseColor", 0x029),
    ("specularColor", 0x02A),
    ("specularExponent", 0x02B),
    ("emissiveColor", 0x02C),
    ("tintColor", 0x02D),
    ("identityColor", 0x02E),
    ("objectTypeColor", 0x02F),
    // Lighting
    ("ambientColor", 0x030),
    ("sunDirection", 0x031),
    ("sunColor", 0x032),
    ("lightCount", 0x033),
    ("lightPosition0", 0x034),
    ("lightPosition1", 0x035),
    ("lightPosition2", 0x036),
    ("lightPosition3", 0x037),
    ("lightColor0", 0x038),
    ("lightColor1", 0x039),
    ("lightColor2", 0x03A),
    ("lightColor3", 0x03B),
    ("lightAttenuation0", 0x03C),
    ("lightAttenuation1", 0x03D),
    ("lightAttenuation2", 0x03E),
    ("lightAttenuation3", 0x03F),
    ("shadowTransform", 0x040),
    ("shadowParams", 0x041),
    ("lightingSet", 0x042),
    ("rimParams", 0x043),
    ("highlightColor", 0x044),
    // Skinning
    ("skinningPalette", 0x048),
    ("skinWeights", 0x049),
    ("boneCount", 0x04A),
    ("morphWeights", 0x04B),
    // Texture coordinates
    ("uvTweak0", 0x050),
    ("uvTweak1", 0x051),
    ("uvTweak2", 0x052),
    ("uvTweak3", 0x053),
    ("texcoordOffset", 0x054),
    ("texcoordScale", 0x055),
    ("atlasTransform", 0x056),
    // Fog and atmosphere
    ("fogParams", 0x058),
    ("fogColor", 0x059),
    ("windDirection", 0x05A),
    ("seasonBlend", 0x05B),
    // Effects
    ("pulseRate", 0x060),
    ("pulseAmplitude", 0x061),
    ("patternParams", 0x062),
    ("noiseScale", 0x063),
    ("dissolveThreshold", 0x064),
    ("outlineColor", 0x065),
    ("lodBlendFactor", 0x066),
    // Screen space
    ("screenTransform", 0x070),
    ("screenParams", 0x071),
    ("depthRange", 0x072),
    ("nearFarPlane", 0x073),
    // Custom per-model parameter block
    ("customParams0", 0x080),
    ("customParams1", 0x081),
    ("customParams2", 0x082),
    ("customParams3", 0x083),
    ("customParams4", 0x084),
    ("customParams5", 0x085),
    ("customParams6", 0x086),
    ("customParams7", 0x087),
    ("customParams8", 0x088),
    ("customParams9", 0x089),
    ("customParams10", 0x08A),
    ("customParams11", 0x08B),
    ("customParams12", 0x08C),
    ("customParams13", 0x08D),
    ("customParams14", 0x08E),
    ("customParams15", 0x08F),
    // Terrain and water
    ("terrainTransform", 0x090),
    ("terrainLightmapScale", 0x091),
    ("waterParams", 0x092),
    ("waveFrequency", 0x093),
    ("waveAmplitude", 0x094),
    // Instancing and sprites
    ("instanceOffset", 0x0A0),
    ("instanceCount", 0x0A1),
    ("billboardAxis", 0x0A2),
    ("spriteParams", 0x0A3),
    ("debugColor", 0x0A4),
];

/// Registered (slot id, dependency flags) pairs.
///
/// Ids absent from this table have no dependency flags (the engine never
/// refreshes the register implicitly).
const FLAGS: &[(u32, u32)] = &[
    // Transforms
    (0x001, DEPENDS_MODEL_TRANSFORM | DEPENDS_WORLD_TRANSFORM),
    (0x002, DEPENDS_MODEL_TRANSFORM | DEPENDS_WORLD_TRANSFORM),
    (0x003, DEPENDS_MODEL_TRANSFORM),
    (0x004, DEPENDS_WORLD_TRANSFORM),
    (0x005, DEPENDS_WORLD_TRANSFORM),
    (0x006, DEPENDS_MODEL_TRANSFORM),
    (0x007, DEPENDS_WORLD_TRANSFORM),
    (0x008, DEPENDS_WORLD_TRANSFORM),
    (0x009, DEPENDS_WORLD_TRANSFORM),
    (0x00A, DEPENDS_WORLD_TRANSFORM),
    (0x00B, DEPENDS_WORLD_TRANSFORM),
    (0x00C, DEPENDS_WORLD_TRANSFORM),
    (0x00D, DEPENDS_WORLD_TRANSFORM),
    (0x00E, DEPENDS_MODEL_TRANSFORM | DEPENDS_WORLD_TRANSFORM),
    // Camera
    (0x010, DEPENDS_WORLD_TRANSFORM),
    (0x011, DEPENDS_WORLD_TRANSFORM),
    (0x012, DEPENDS_WORLD_TRANSFORM),
    (0x013, DEPENDS_WORLD_TRANSFORM),
    (0x014, DEPENDS_WORLD_TRANSFORM),
    // Material
    (0x020, DEPENDS_MATERIAL_COLOR),
    (0x029, DEPENDS_MATERIAL_COLOR),
    (0x02A, DEPENDS_MATERIAL_COLOR),
    (0x02B, DEPENDS_MATERIAL_COLOR),
    (0x02C, DEPENDS_MATERIAL_COLOR),
    (0x02D, DEPENDS_MATERIAL_COLOR),
    (0x02E, DEPENDS_MODEL_DATA),
    (0x02F, DEPENDS_MODEL_DATA),
    // Per-model parameter blocks
    (0x021, DEPENDS_MODEL_DATA),
    (0x022, DEPENDS_MODEL_DATA),
    (0x023, DEPENDS_MODEL_DATA),
    (0x024, DEPENDS_MODEL_DATA),
    (0x025, DEPENDS_MODEL_DATA),
    (0x026, DEPENDS_MODEL_DATA),
    (0x027, DEPENDS_MODEL_DATA),
    (0x028, DEPENDS_MODEL_DATA),
    // Lighting
    (0x030, DEPENDS_AMBIENT_COLOR),
    (0x031, DEPENDS_LIGHT_DATA),
    (0x032, DEPENDS_LIGHT_DATA),
    (0x033, DEPENDS_LIGHT_DATA),
    (0x034, DEPENDS_LIGHT_DATA),
    (0x035, DEPENDS_LIGHT_DATA),
    (0x036, DEPENDS_LIGHT_DATA),
    (0x037, DEPENDS_LIGHT_DATA),
    (0x038, DEPENDS_LIGHT_DATA),
    (0x039, DEPENDS_LIGHT_DATA),
    (0x03A, DEPENDS_LIGHT_DATA),
    (0x03B, DEPENDS_LIGHT_DATA),
    (0x03C, DEPENDS_LIGHT_DATA),
    (0x03D, DEPENDS_LIGHT_DATA),
    (0x03E, DEPENDS_LIGHT_DATA),
    (0x03F, DEPENDS_LIGHT_DATA),
    (0x040, DEPENDS_LIGHT_DATA | DEPENDS_WORLD_TRANSFORM),
    (0x041, DEPENDS_LIGHT_DATA),
    (0x042, COMPOSITE_LIGHTING),
    (0x043, DEPENDS_LIGHT_DATA),
    (0x044, DEPENDS_MATERIAL_COLOR),
    // Skinning
    (0x048, COMPOSITE_SKINNING),
    (0x049, DEPENDS_MODEL_DATA),
    (0x04A, DEPENDS_MODEL_DATA),
    (0x04B, DEPENDS_MODEL_DATA),
    // Texture coordinates
    (0x050, DEPENDS_MODEL_DATA),
    (0x051, DEPENDS_MODEL_DATA),
    (0x052, DEPENDS_MODEL_DATA),
    (0x053, DEPENDS_MODEL_DATA),
    (0x054, DEPENDS_MODEL_DATA),
    (0x055, DEPENDS_MODEL_DATA),
    (0x056, DEPENDS_MODEL_DATA),
    // Custom per-model parameter block
    (0x080, DEPENDS_MODEL_DATA),
    (0x081, DEPENDS_MODEL_DATA),
    (0x082, DEPENDS_MODEL_DATA),
    (0x083, DEPENDS_MODEL_DATA),
    (0x084, DEPENDS_MODEL_DATA),
    (0x085, DEPENDS_MODEL_DATA),
    (0x086, DEPENDS_MODEL_DATA),
    (0x087, DEPENDS_MODEL_DATA),
    (0x088, DEPENDS_MODEL_DATA),
    (0x089, DEPENDS_MODEL_DATA),
    (0x08A, DEPENDS_MODEL_DATA),
    (0x08B, DEPENDS_MODEL_DATA),
    (0x08C, DEPENDS_MODEL_DATA),
    (0x08D, DEPENDS_MODEL_DATA),
    (0x08E, DEPENDS_MODEL_DATA),
    (0x08F, DEPENDS_MODEL_DATA),
    // Terrain and instancing
    (0x090, DEPENDS_MODEL_TRANSFORM),
    (0x091, DEPENDS_MODEL_DATA),
    (0x0A0, DEPENDS_MODEL_DATA),
    (0x0A1, DEPENDS_MODEL_DATA),
    (0x0A2, DEPENDS_WORLD_TRANSFORM),
    (0x0A3, DEPENDS_MODEL_DATA),
];

// ============================================================================
// Fallback hashing
// ============================================================================

/// FNV-1a over the name bytes; the fallback id for unregistered names.
pub fn fnv1a(name: &str) -> u32 {
    let mut hash: u32 = 0x811c_9dc5;
    for byte in name.bytes() {
        hash ^= byte as u32;
        hash = hash.wrapping_mul(0x0100_0193);
    }
    hash
}

// ============================================================================
// Registry
// ============================================================================

/// Read-only name ↔ slot id ↔ dependency-flag mapping.
#[derive(Debug)]
pub struct ShaderDataRegistry {
    by_name: HashMap<&'static str, u32>,
    by_id: HashMap<u32, &'static str>,
    flags: HashMap<u32, u32>,
}

impl ShaderDataRegistry {
    /// Build the registry from the fixed source tables.
    pub fn new() -> Self {
        let mut by_name = HashMap::with_capacity(NAMES.len());
        let mut by_id = HashMap::with_capacity(NAMES.len());
        for &(name, id) in NAMES {
            by_name.insert(name, id);
            by_id.insert(id, name);
        }
        let flags = FLAGS.iter().copied().collect();
        Self {
            by_name,
            by_id,
            flags,
        }
    }

    /// Slot id for a registered name, if any.
    pub fn registered_id(&self, name: &str) -> Option<u32> {
        self.by_name.get(name).copied()
    }

    /// Slot id for `name`; unregistered names hash deterministically.
    pub fn id_for(&self, name: &str) -> u32 {
        self.registered_id(name).unwrap_or_else(|| fnv1a(name))
    }

    /// Name for `id`; unregistered ids render as fixed-width hex.
    pub fn name_for(&self, id: u32) -> String {
        match self.by_id.get(&id) {
            Some(name) => (*name).to_string(),
            None => format!("{id:#010x}"),
        }
    }

    /// Dependency flags for `id`; zero when the id carries none.
    pub fn flags_for(&self, id: u32) -> u32 {
        self.flags.get(&id).copied().unwrap_or(0)
    }

    /// Number of registered names.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// True if the fixed table is empty (it never is).
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl Default for ShaderDataRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_have_no_duplicates() {
        let registry = ShaderDataRegistry::new();
        assert_eq!(registry.len(), NAMES.len());
        assert_eq!(registry.by_id.len(), NAMES.len());
    }

    #[test]
    fn test_name_id_bijection_over_fixed_table() {
        let registry = ShaderDataRegistry::new();
        for &(name, id) in NAMES {
            assert_eq!(registry.id_for(name), id);
            assert_eq!(registry.id_for(&registry.name_for(id)), id);
        }
    }

    #[test]
    fn test_unregistered_name_falls_back_to_hash() {
        let registry = ShaderDataRegistry::new();
        let id = registry.id_for("nonexistentName123");
        assert_eq!(id, fnv1a("nonexistentName123"));
        // Deterministic across calls
        assert_eq!(id, registry.id_for("nonexistentName123"));
    }

    #[test]
    fn test_unregistered_id_renders_as_hex() {
        let registry = ShaderDataRegistry::new();
        assert_eq!(registry.name_for(0xDEAD_BEEF), "0xdeadbeef");
        assert_eq!(registry.name_for(0x7), "0x00000007");
    }

    #[test]
    fn test_flags_lookup() {
        let registry = ShaderDataRegistry::new();
        assert_eq!(
            registry.flags_for(registry.id_for("modelToWorld")),
            DEPENDS_MODEL_TRANSFORM
        );
        assert_eq!(
            registry.flags_for(registry.id_for("skinningPalette")),
            COMPOSITE_SKINNING
        );
        assert_eq!(
            registry.flags_for(registry.id_for("lightingSet")),
            COMPOSITE_LIGHTING
        );
        // Unknown ids carry no flags
        assert_eq!(registry.flags_for(0xFFFF_FFFF), 0);
    }
}
