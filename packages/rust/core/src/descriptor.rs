//! Texture-set descriptor rendering.
//!
//! One descriptor document is emitted per canonical name. Downstream
//! resource-pack tooling consumes the schema byte-for-byte, so the document
//! is rendered from a fixed template instead of being serialized: the
//! indentation and field spacing must not change between releases.

/// File-name suffix appended to a canonical name.
pub const DESCRIPTOR_SUFFIX: &str = ".texture_set.json";

/// Value of the `format_version` field in every emitted document.
pub const FORMAT_VERSION: &str = "1.16.100";

/// Placeholder in [`TEMPLATE`] replaced by the canonical name.
const NAME_SLOT: &str = "%s";

const TEMPLATE: &str = r##"{
    "format_version": "1.16.100",
    "minecraft:texture_set": {
        "color":"%s",
        "metalness_emissive_roughness": "#0000ff",
        "heightmap": "flat_heightmap"
    }
}"##;

/// Render the descriptor document for one canonical name.
///
/// Pure and total: any string is a legal name, including the empty string.
/// The name lands in the `color` field unvalidated; the downstream consumer
/// enforces its own constraints.
pub fn render(name: &str) -> String {
    TEMPLATE.replacen(NAME_SLOT, name, 1)
}

/// Descriptor file name for a canonical name.
pub fn file_name(name: &str) -> String {
    format!("{name}{DESCRIPTOR_SUFFIX}")
}
