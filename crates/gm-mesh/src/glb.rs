use std::collections::HashMap;

use gm_core::mesh::{Face, Mesh, Vertex};
use serde::Deserialize;

use crate::error::MeshError;
use crate::reader::ByteReader;

/// `"glTF"` en little-endian.
pub const GLB_MAGIC: u32 = 0x4654_6C67;
/// Chunk JSON.
pub const CHUNK_JSON: u32 = 0x4E4F_534A;
/// Chunk binaire (`"BIN\0"`).
pub const CHUNK_BIN: u32 = 0x004E_4942;

const HEADER_LEN: usize = 12;
const COMPONENT_U8: u32 = 5121;
const COMPONENT_U16: u32 = 5123;
const COMPONENT_U32: u32 = 5125;
const COMPONENT_F32: u32 = 5126;
/// Taille d'un élément POSITION (VEC3 f32).
const POSITION_SIZE: usize = 12;
/// Stride maximal autorisé par glTF 2.0.
const MAX_STRIDE: usize = 252;

#[derive(Deserialize)]
struct Document {
    #[serde(default)]
    meshes: Vec<JsonMesh>,
    #[serde(default)]
    accessors: Vec<Accessor>,
    #[serde(default, rename = "bufferViews")]
    buffer_views: Vec<BufferView>,
}

#[derive(Deserialize)]
struct JsonMesh {
    name: Option<String>,
    #[serde(default)]
    primitives: Vec<Primitive>,
}

#[derive(Deserialize)]
struct Primitive {
    #[serde(default)]
    attributes: HashMap<String, usize>,
    indices: Option<usize>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Accessor {
    buffer_view: Option<usize>,
    #[serde(default)]
    byte_offset: usize,
    component_type: u32,
    count: usize,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BufferView {
    #[serde(default)]
    byte_offset: usize,
    byte_stride: Option<usize>,
}

/// Chunks bruts d'un conteneur GLB.
struct Chunks<'a> {
    json: Option<&'a [u8]>,
    bin: Option<&'a [u8]>,
}

/// Decodes a binary glTF (GLB) container: first primitive of the first mesh.
///
/// Any structural inconsistency fails the whole decode; never a mesh
/// partially built.
///
/// # Errors
/// - [`MeshError::Format`] on bad magic, missing JSON/BIN chunk, invalid
///   JSON, no mesh, no `POSITION`, bad accessor/bufferView reference,
///   truncated data or out-of-range indices.
/// - [`MeshError::Empty`] if the position accessor has zero elements.
///
/// # Example
/// ```
/// use gm_mesh::glb::decode_glb;
/// use gm_mesh::MeshError;
/// let err = decode_glb(b"NOPE\x02\x00\x00\x00\x0c\x00\x00\x00").unwrap_err();
/// assert!(matches!(err, MeshError::Format(_)));
/// ```
pub fn decode_glb(bytes: &[u8]) -> Result<Mesh, MeshError> {
    let chunks = read_chunks(bytes)?;

    let json = chunks
        .json
        .ok_or_else(|| MeshError::format("chunk JSON absent"))?;
    let json = std::str::from_utf8(json)
        .map_err(|e| MeshError::format(format!("chunk JSON non UTF-8 : {e}")))?;
    let doc: Document = serde_json::from_str(json.trim_end_matches(['\0', ' ']))
        .map_err(|e| MeshError::format(format!("JSON glTF invalide : {e}")))?;

    let mesh = doc
        .meshes
        .first()
        .ok_or_else(|| MeshError::format("aucun mesh dans le document"))?;
    let primitive = mesh
        .primitives
        .first()
        .ok_or_else(|| MeshError::format("le premier mesh n'a aucune primitive"))?;
    let position = *primitive
        .attributes
        .get("POSITION")
        .ok_or_else(|| MeshError::format("primitive sans accessor POSITION"))?;

    let bin = chunks
        .bin
        .ok_or_else(|| MeshError::format("chunk BIN absent"))?;
    let bin = ByteReader::new(bin);

    let vertices = read_positions(&doc, position, &bin)?;
    if vertices.is_empty() {
        return Err(MeshError::Empty);
    }

    let faces = match primitive.indices {
        Some(accessor) => {
            let indices = read_indices(&doc, accessor, &bin)?;
            if let Some(bad) = indices.iter().find(|&&i| i >= vertices.len()) {
                return Err(MeshError::format(format!(
                    "index {bad} hors limites ({} sommets)",
                    vertices.len()
                )));
            }
            indices
                .chunks_exact(3)
                .map(|t| Face::tri(t[0], t[1], t[2]))
                .collect::<Vec<_>>()
        }
        None => (0..vertices.len() / 3)
            .map(|t| Face::tri(3 * t, 3 * t + 1, 3 * t + 2))
            .collect(),
    };

    let name = mesh.name.clone().unwrap_or_else(|| "glb".to_string());
    log::debug!(
        "GLB décodé '{name}' : {} sommets, {} faces",
        vertices.len(),
        faces.len()
    );
    Ok(Mesh::new(name, vertices, faces))
}

/// 12-byte header, then sequential chunks up to the declared length.
fn read_chunks(bytes: &[u8]) -> Result<Chunks<'_>, MeshError> {
    let mut header = ByteReader::new(bytes);
    let magic = header
        .read_u32()
        .map_err(|_| MeshError::format("fichier trop court pour un en-tête GLB"))?;
    if magic != GLB_MAGIC {
        return Err(MeshError::format(format!(
            "magic GLB invalide : {magic:#010x}"
        )));
    }
    let version = header.read_u32()?;
    let declared = header.read_u32()? as usize;
    if version != 2 {
        log::warn!("GLB version {version}, seule la v2 est testée");
    }
    if declared > bytes.len() {
        log::warn!(
            "GLB tronqué : {declared} octets déclarés, {} disponibles",
            bytes.len()
        );
    }

    let body = &bytes[..declared.clamp(HEADER_LEN, bytes.len())];
    let mut reader = ByteReader::new(body);
    reader.read_bytes(HEADER_LEN)?;

    let mut chunks = Chunks {
        json: None,
        bin: None,
    };
    while reader.remaining() >= 8 {
        let len = reader.read_u32()? as usize;
        let kind = reader.read_u32()?;
        let payload = reader.read_bytes(len)?;
        match kind {
            CHUNK_JSON if chunks.json.is_none() => chunks.json = Some(payload),
            CHUNK_BIN if chunks.bin.is_none() => chunks.bin = Some(payload),
            other => log::trace!("chunk GLB ignoré : {other:#010x} ({len} octets)"),
        }
    }
    Ok(chunks)
}

fn accessor_and_view<'d>(
    doc: &'d Document,
    index: usize,
) -> Result<(&'d Accessor, &'d BufferView), MeshError> {
    let accessor = doc
        .accessors
        .get(index)
        .ok_or_else(|| MeshError::format(format!("accessor {index} inexistant")))?;
    let view_index = accessor
        .buffer_view
        .ok_or_else(|| MeshError::format(format!("accessor {index} sans bufferView")))?;
    let view = doc
        .buffer_views
        .get(view_index)
        .ok_or_else(|| MeshError::format(format!("bufferView {view_index} inexistant")))?;
    Ok((accessor, view))
}

/// Start offset and stride of an accessor's elements inside the BIN chunk.
///
/// The stride must cover at least one element of `element_size` bytes and
/// stay within the glTF limit.
fn element_layout(
    accessor: &Accessor,
    view: &BufferView,
    element_size: usize,
) -> Result<(usize, usize), MeshError> {
    let base = view
        .byte_offset
        .checked_add(accessor.byte_offset)
        .ok_or_else(|| MeshError::format("byteOffset hors limites"))?;
    let stride = match view.byte_stride {
        None => element_size,
        Some(stride) if (element_size..=MAX_STRIDE).contains(&stride) => stride,
        Some(stride) => {
            return Err(MeshError::format(format!(
                "byteStride {stride} invalide (attendu {element_size}..={MAX_STRIDE})"
            )));
        }
    };
    Ok((base, stride))
}

fn read_positions(
    doc: &Document,
    accessor_index: usize,
    bin: &ByteReader<'_>,
) -> Result<Vec<Vertex>, MeshError> {
    let (accessor, view) = accessor_and_view(doc, accessor_index)?;
    if accessor.component_type != COMPONENT_F32 {
        return Err(MeshError::format(format!(
            "POSITION de type {} (f32 attendu)",
            accessor.component_type
        )));
    }
    let (base, stride) = element_layout(accessor, view, POSITION_SIZE)?;

    let mut vertices = Vec::with_capacity(accessor.count.min(bin.len() / POSITION_SIZE + 1));
    for i in 0..accessor.count {
        let offset = i
            .checked_mul(stride)
            .and_then(|o| o.checked_add(base))
            .ok_or_else(|| MeshError::format("offset de sommet hors limites"))?;
        let [x, y, z] = bin.vec3_at(offset)?;
        vertices.push(Vertex::new(x, y, z));
    }
    Ok(vertices)
}

fn read_indices(
    doc: &Document,
    accessor_index: usize,
    bin: &ByteReader<'_>,
) -> Result<Vec<usize>, MeshError> {
    let (accessor, view) = accessor_and_view(doc, accessor_index)?;
    let width = match accessor.component_type {
        COMPONENT_U8 => 1,
        COMPONENT_U16 => 2,
        COMPONENT_U32 => 4,
        other => {
            return Err(MeshError::format(format!(
                "type de composant d'index non supporté : {other}"
            )));
        }
    };
    let (base, stride) = element_layout(accessor, view, width)?;

    let mut indices = Vec::with_capacity(accessor.count.min(bin.len() + 1));
    for i in 0..accessor.count {
        let offset = i
            .checked_mul(stride)
            .and_then(|o| o.checked_add(base))
            .ok_or_else(|| MeshError::format("offset d'index hors limites"))?;
        let value = match width {
            1 => usize::from(bin.u8_at(offset)?),
            2 => usize::from(bin.u16_at(offset)?),
            _ => bin.u32_at(offset)? as usize,
        };
        indices.push(value);
    }
    Ok(indices)
}
