#![forbid(unsafe_code)]

//! The JSON scene-manifest codec.
//!
//! A manifest names the scene's sub-parts and, optionally, their authored
//! materials. It is the decode half of asset loading: fetchers hand bytes to
//! [`decode`], which yields the shared [`SceneTemplate`] or a
//! [`ManifestError`] describing what was malformed.
//!
//! ```json
//! {
//!   "name": "heart",
//!   "parts": [
//!     { "name": "LeftVentricle" },
//!     { "name": "Aorta", "material": { "base_color": { "r": 180, "g": 60, "b": 60 },
//!       "roughness": 0.7, "metalness": 0.0,
//!       "emissive": { "r": 0, "g": 0, "b": 0 }, "emissive_intensity": 0.0,
//!       "flat_shading": false } }
//!   ]
//! }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::graph::{Node, SceneTemplate};
use crate::material::Material;

/// Why a manifest failed to decode.
#[derive(Debug)]
pub enum ManifestError {
    /// Input was not valid JSON or did not match the schema.
    Syntax(serde_json::Error),
    /// A structurally valid manifest with no parts; nothing to render.
    Empty,
    /// A part with an empty name; it could never be matched or lit.
    UnnamedPart(usize),
}

impl fmt::Display for ManifestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax(err) => write!(f, "manifest is not valid scene JSON: {err}"),
            Self::Empty => write!(f, "manifest contains no parts"),
            Self::UnnamedPart(index) => write!(f, "part {index} has an empty name"),
        }
    }
}

impl std::error::Error for ManifestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Syntax(err) => Some(err),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SceneManifest {
    name: String,
    parts: Vec<PartSpec>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PartSpec {
    name: String,
    #[serde(default)]
    material: Option<Material>,
}

/// Decode manifest bytes into a scene template.
pub fn decode(bytes: &[u8]) -> Result<SceneTemplate, ManifestError> {
    let manifest: SceneManifest = serde_json::from_slice(bytes).map_err(ManifestError::Syntax)?;
    if manifest.parts.is_empty() {
        return Err(ManifestError::Empty);
    }
    let mut nodes = Vec::with_capacity(manifest.parts.len());
    for (index, part) in manifest.parts.into_iter().enumerate() {
        if part.name.trim().is_empty() {
            return Err(ManifestError::UnnamedPart(index));
        }
        nodes.push(Node::with_material(
            part.name,
            part.material.unwrap_or_default(),
        ));
    }
    Ok(SceneTemplate::new(manifest.name, nodes))
}

/// Encode a template back into manifest JSON (round-trip/testing aid).
pub fn encode(template: &SceneTemplate) -> Result<String, serde_json::Error> {
    let manifest = SceneManifest {
        name: template.name().to_string(),
        parts: template
            .nodes()
            .iter()
            .map(|node| PartSpec {
                name: node.name.clone(),
                material: Some(node.material),
            })
            .collect(),
    };
    serde_json::to_string_pretty(&manifest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_minimal_manifest() {
        let json = br#"{ "name": "heart", "parts": [ { "name": "Aorta" } ] }"#;
        let template = decode(json).unwrap();
        assert_eq!(template.name(), "heart");
        assert_eq!(template.nodes().len(), 1);
        assert_eq!(template.nodes()[0].material, Material::default());
    }

    #[test]
    fn decodes_authored_material() {
        let json = br#"{
            "name": "heart",
            "parts": [ { "name": "Aorta", "material": {
                "base_color": { "r": 180, "g": 60, "b": 60 },
                "roughness": 0.4, "metalness": 0.1,
                "emissive": { "r": 0, "g": 0, "b": 0 },
                "emissive_intensity": 0.0, "flat_shading": false
            } } ]
        }"#;
        let template = decode(json).unwrap();
        assert_eq!(template.nodes()[0].material.roughness, 0.4);
    }

    #[test]
    fn rejects_invalid_json() {
        let err = decode(b"{ not json").unwrap_err();
        assert!(matches!(err, ManifestError::Syntax(_)));
        assert!(err.to_string().contains("not valid scene JSON"));
    }

    #[test]
    fn rejects_empty_part_list() {
        let err = decode(br#"{ "name": "heart", "parts": [] }"#).unwrap_err();
        assert!(matches!(err, ManifestError::Empty));
    }

    #[test]
    fn rejects_unnamed_part() {
        let err = decode(br#"{ "name": "heart", "parts": [ { "name": "  " } ] }"#).unwrap_err();
        assert!(matches!(err, ManifestError::UnnamedPart(0)));
    }

    #[test]
    fn encode_decode_round_trip() {
        let json = br#"{ "name": "heart", "parts": [ { "name": "Aorta" }, { "name": "Septum" } ] }"#;
        let template = decode(json).unwrap();
        let encoded = encode(&template).unwrap();
        let again = decode(encoded.as_bytes()).unwrap();
        assert_eq!(again.name(), template.name());
        assert_eq!(again.nodes(), template.nodes());
    }
}
