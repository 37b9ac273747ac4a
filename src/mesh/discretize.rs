//! Uniform subdivision of members into solver elements

use log::debug;

use super::IdAllocator;
use crate::elements::{Member, Mesh, MeshNode, SubMember};
use crate::error::{FrameError, FrameResult};
use crate::math::{distance, lerp};

/// Slack on the segment-count ratio so round-off in the length never adds a segment
const COUNT_SLACK: f64 = 1e-9;

/// Number of segments for a member of `length` with target `segment_length`
pub fn segment_count(length: f64, segment_length: f64) -> usize {
    ((length / segment_length - COUNT_SLACK).ceil() as usize).max(1)
}

/// Split `member` into a chain of equal segments no longer than `segment_length`.
///
/// The end nodes keep their user ids; interior nodes take ids from
/// `node_ids`, sub-members from `element_ids`.
pub fn discretize(
    member: &Member,
    start: [f64; 3],
    end: [f64; 3],
    segment_length: f64,
    node_ids: &mut IdAllocator,
    element_ids: &mut IdAllocator,
) -> FrameResult<Mesh> {
    if !(segment_length.is_finite() && segment_length > 0.0) {
        return Err(FrameError::InvalidInput(format!(
            "segment length must be positive, got {}",
            segment_length
        )));
    }

    let length = distance(start, end);
    let count = segment_count(length, segment_length);

    let mut nodes = Vec::with_capacity(count + 1);
    nodes.push(MeshNode {
        id: member.i_node,
        coords: start,
    });
    for k in 1..count {
        nodes.push(MeshNode {
            id: node_ids.allocate(),
            coords: lerp(start, end, k as f64 / count as f64),
        });
    }
    nodes.push(MeshNode {
        id: member.j_node,
        coords: end,
    });

    let members = nodes
        .windows(2)
        .map(|pair| SubMember {
            id: element_ids.allocate(),
            nodes: [pair[0].id, pair[1].id],
            section: member.section,
        })
        .collect();

    debug!(
        "Member {}: length {:.3}, {} segments",
        member.id, length, count
    );

    Ok(Mesh {
        nodes,
        members,
        length,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn mesh_of(length: f64) -> Mesh {
        let member = Member::new(1, 1, 2, 1);
        let mut node_ids = IdAllocator::above([1, 2]);
        let mut element_ids = IdAllocator::above([1]);
        discretize(
            &member,
            [0.0, 0.0, 0.0],
            [length, 0.0, 0.0],
            0.5,
            &mut node_ids,
            &mut element_ids,
        )
        .unwrap()
    }

    #[test]
    fn test_segment_count() {
        assert_eq!(segment_count(2.0, 0.5), 4);
        assert_eq!(segment_count(2.1, 0.5), 5);
        assert_eq!(segment_count(0.2, 0.5), 1);
        assert_eq!(segment_count(2.0000000000000004, 0.5), 4);
    }

    #[test]
    fn test_two_metre_member() {
        let mesh = mesh_of(2.0);
        assert_eq!(mesh.members.len(), 4);
        assert_eq!(mesh.nodes.len(), 5);
        assert_eq!(mesh.nodes.first().map(|n| n.id), Some(1));
        assert_eq!(mesh.nodes.last().map(|n| n.id), Some(2));
        assert_relative_eq!(mesh.length, 2.0);

        for (k, node) in mesh.nodes.iter().enumerate() {
            assert_relative_eq!(node.coords[0], 0.5 * k as f64, epsilon = 1e-12);
        }
        for (k, sub) in mesh.members.iter().enumerate() {
            assert_eq!(sub.nodes, [mesh.nodes[k].id, mesh.nodes[k + 1].id]);
            assert_eq!(sub.section, 1);
            assert!(sub.id > 1);
        }
        assert_eq!(mesh.interior_nodes().len(), 3);
    }

    #[test]
    fn test_uneven_length_spacing_is_uniform() {
        let mesh = mesh_of(1.3);
        assert_eq!(mesh.members.len(), 3);
        let spacing = 1.3 / 3.0;
        for pair in mesh.nodes.windows(2) {
            assert_relative_eq!(distance(pair[0].coords, pair[1].coords), spacing, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_short_member_single_segment() {
        let mesh = mesh_of(0.3);
        assert_eq!(mesh.members.len(), 1);
        assert!(mesh.interior_nodes().is_empty());
    }

    #[test]
    fn test_rejects_bad_segment_length() {
        let member = Member::new(1, 1, 2, 1);
        let mut ids = IdAllocator::above([2]);
        let mut elems = IdAllocator::above([1]);
        let err = discretize(&member, [0.0; 3], [1.0, 0.0, 0.0], 0.0, &mut ids, &mut elems);
        assert!(matches!(err, Err(FrameError::InvalidInput(_))));
    }
}
