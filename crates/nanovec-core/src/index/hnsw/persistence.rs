//! Binary persistence format for the HNSW graph (§6).
//!
//! The engine never loads from this format — it rebuilds the index from
//! the vector log on every open (§4.3, §9: "dual index, one source of
//! truth"). This exists purely as a diagnostic/backup artifact a host can
//! snapshot and inspect offline.
//!
//! Layout: magic, version, then scalar header fields, then `node_count`
//! node records. Each node record is `id, level, dimension`, the raw
//! vector floats, then for each level `0..=level` a connection count
//! followed by that many neighbor indices. All multi-byte values are
//! little-endian.

use super::graph::HnswIndex;
use super::node::HnswNode;
use super::params::HnswParams;
use crate::distance::Metric;
use crate::error::{Error, Result};
use std::io::{self, Read, Write};

/// Magic number identifying an HNSW snapshot file.
pub const MAGIC: u32 = 0x484E_5357;
/// Format version.
pub const VERSION: u32 = 1;

fn write_u32<W: Write>(w: &mut W, v: u32) -> io::Result<()> {
    w.write_all(&v.to_le_bytes())
}
fn write_u64<W: Write>(w: &mut W, v: u64) -> io::Result<()> {
    w.write_all(&v.to_le_bytes())
}
fn write_i64<W: Write>(w: &mut W, v: i64) -> io::Result<()> {
    w.write_all(&v.to_le_bytes())
}
fn write_f64<W: Write>(w: &mut W, v: f64) -> io::Result<()> {
    w.write_all(&v.to_le_bytes())
}
fn write_f32<W: Write>(w: &mut W, v: f32) -> io::Result<()> {
    w.write_all(&v.to_le_bytes())
}

fn read_u32<R: Read>(r: &mut R) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}
fn read_u64<R: Read>(r: &mut R) -> io::Result<u64> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}
fn read_i64<R: Read>(r: &mut R) -> io::Result<i64> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(i64::from_le_bytes(buf))
}
fn read_f64<R: Read>(r: &mut R) -> io::Result<f64> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(f64::from_le_bytes(buf))
}
fn read_f32<R: Read>(r: &mut R) -> io::Result<f32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(f32::from_le_bytes(buf))
}

/// Writes a full snapshot of `index` to `writer`.
pub fn write<W: Write>(index: &HnswIndex, writer: &mut W) -> Result<()> {
    write_u32(writer, MAGIC)?;
    write_u32(writer, VERSION)?;
    write_u32(writer, index.dimension() as u32)?;
    write_u32(writer, index.metric().tag())?;
    write_u32(writer, index.params_snapshot().m as u32)?;
    write_u32(writer, index.params_snapshot().ef_construction as u32)?;
    write_u32(writer, index.params_snapshot().ef_search as u32)?;
    write_f64(writer, index.params_snapshot().level_mult)?;
    write_u64(writer, index.nodes_snapshot().len() as u64)?;
    write_i64(
        writer,
        index.entry_point_snapshot().map_or(-1, |v| v as i64),
    )?;
    write_u32(writer, index.max_level_snapshot() as u32)?;

    for slot in index.nodes_snapshot() {
        match slot {
            Some(node) => {
                write_u64(writer, node.id)?;
                write_u32(writer, node.level() as u32)?;
                write_u32(writer, node.vector.len() as u32)?;
                for &f in &node.vector {
                    write_f32(writer, f)?;
                }
                for level_neighbors in &node.connections {
                    write_u32(writer, level_neighbors.len() as u32)?;
                    for &n in level_neighbors {
                        write_u32(writer, n as u32)?;
                    }
                }
            }
            None => {
                // Vacant slot: id = u64::MAX sentinel, level = 0, dim = 0.
                write_u64(writer, u64::MAX)?;
                write_u32(writer, 0)?;
                write_u32(writer, 0)?;
            }
        }
    }
    Ok(())
}

/// Reads a snapshot back into a freestanding `HnswIndex`. Used only by
/// diagnostics/tests — the engine does not call this on open.
pub fn read<R: Read>(reader: &mut R) -> Result<HnswIndex> {
    let magic = read_u32(reader)?;
    if magic != MAGIC {
        return Err(Error::DbCorrupt(format!(
            "hnsw snapshot magic mismatch: got {magic:#x}"
        )));
    }
    let version = read_u32(reader)?;
    if version != VERSION {
        return Err(Error::DbCorrupt(format!(
            "hnsw snapshot version mismatch: got {version}"
        )));
    }
    let dimension = read_u32(reader)? as usize;
    let metric_tag = read_u32(reader)?;
    let metric = Metric::from_tag(metric_tag)
        .ok_or_else(|| Error::DbCorrupt(format!("unknown metric tag {metric_tag}")))?;
    let m = read_u32(reader)? as usize;
    let ef_construction = read_u32(reader)? as usize;
    let ef_search = read_u32(reader)? as usize;
    let level_mult = read_f64(reader)?;
    let node_count = read_u64(reader)?;
    let entry_point_raw = read_i64(reader)?;
    let max_level = read_u32(reader)? as usize;

    let params = HnswParams {
        m,
        ef_construction,
        ef_search,
        level_mult,
        max_level_cap: 15,
    };

    let mut nodes: Vec<Option<HnswNode>> = Vec::with_capacity(node_count as usize);
    for _ in 0..node_count {
        let id = read_u64(reader)?;
        let level = read_u32(reader)? as usize;
        let dim = read_u32(reader)? as usize;
        if id == u64::MAX && dim == 0 {
            nodes.push(None);
            continue;
        }
        let mut vector = Vec::with_capacity(dim);
        for _ in 0..dim {
            vector.push(read_f32(reader)?);
        }
        let mut node = HnswNode::new(id, vector, level);
        for l in 0..=level {
            let count = read_u32(reader)? as usize;
            let mut neighbors = Vec::with_capacity(count);
            for _ in 0..count {
                neighbors.push(read_u32(reader)? as usize);
            }
            node.connections[l] = neighbors;
        }
        nodes.push(Some(node));
    }

    let entry_point = if entry_point_raw < 0 {
        None
    } else {
        Some(entry_point_raw as usize)
    };

    Ok(HnswIndex::from_parts(
        dimension,
        metric,
        params,
        nodes,
        entry_point,
        max_level,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_small_index() {
        let mut idx = HnswIndex::new(3, Metric::Cosine, HnswParams::default());
        idx.insert(1, vec![1.0, 0.0, 0.0]).unwrap();
        idx.insert(2, vec![0.0, 1.0, 0.0]).unwrap();
        idx.remove(1).unwrap();
        idx.insert(3, vec![0.0, 0.0, 1.0]).unwrap();

        let mut buf = Vec::new();
        write(&idx, &mut buf).unwrap();
        let restored = read(&mut buf.as_slice()).unwrap();

        assert_eq!(restored.len(), idx.len());
        let hits = restored.search(&[0.0, 0.0, 1.0], 1, 50).unwrap();
        assert_eq!(hits[0].id, 3);
    }

    #[test]
    fn rejects_bad_magic() {
        let buf = vec![0u8; 64];
        let err = read(&mut buf.as_slice()).unwrap_err();
        assert_eq!(err.code(), -7);
    }
}
