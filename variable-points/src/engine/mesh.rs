use bevy::prelude::*;
use bevy::render::mesh::{Indices, MeshVertexAttribute, PrimitiveTopology};
use bevy::render::render_asset::RenderAssetUsages;
use bevy::render::render_resource::VertexFormat;
use constants::render_settings::{SPRITE_CORNERS, SPRITE_TRIANGLES};

use super::geometry::PointCloudGeometry;

/// On-screen diameter in pixels, one value per sprite corner.
pub const ATTRIBUTE_POINT_SIZE: MeshVertexAttribute =
    MeshVertexAttribute::new("Vertex_PointSize", 988_540_917, VertexFormat::Float32);

/// Build the render mesh for a point cloud.
///
/// Each candidate point expands to four corner vertices sharing the point's
/// local position, size and colour. `ATTRIBUTE_UV_0` carries the corner's
/// normalised sprite coordinate; the vertex shader turns it into a pixel
/// offset and the fragment shader into the disk test.
pub fn create_variable_points_mesh(geometry: &PointCloudGeometry) -> Mesh {
    let count = geometry.candidate_indices().len();

    let mut positions = Vec::with_capacity(count * 4);
    let mut corners = Vec::with_capacity(count * 4);
    let mut sizes = Vec::with_capacity(count * 4);
    let mut colours = Vec::with_capacity(count * 4);
    let mut indices = Vec::with_capacity(count * 6);

    for (sprite, point) in geometry.candidate_indices().enumerate() {
        let position = geometry.positions()[point as usize];
        let size = geometry.size(point);
        let colour = geometry.colour(point).extend(1.0).to_array();

        for corner in SPRITE_CORNERS {
            positions.push(position);
            corners.push(corner);
            sizes.push(size);
            colours.push(colour);
        }

        let base = (sprite * 4) as u32;
        indices.extend(SPRITE_TRIANGLES.iter().map(|i| base + i));
    }

    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::RENDER_WORLD,
    );
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, corners);
    mesh.insert_attribute(ATTRIBUTE_POINT_SIZE, sizes);
    mesh.insert_attribute(Mesh::ATTRIBUTE_COLOR, colours);
    mesh.insert_indices(Indices::U32(indices));
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::render::mesh::VertexAttributeValues;

    fn cloud() -> PointCloudGeometry {
        PointCloudGeometry::new(
            vec![[0.0, 0.0, 0.0], [1.0, 2.0, 3.0], [4.0, 5.0, 6.0]],
            vec![8.0, 16.0, 32.0],
            vec![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        )
    }

    #[test]
    fn every_point_becomes_a_quad() {
        let mesh = create_variable_points_mesh(&cloud());
        assert_eq!(mesh.count_vertices(), 12);
        assert_eq!(mesh.indices().map(|i| i.len()), Some(18));
    }

    #[test]
    fn index_buffer_selects_and_orders_sprites() {
        let mesh = create_variable_points_mesh(&cloud().with_index(vec![2, 1]));
        assert_eq!(mesh.count_vertices(), 8);

        let Some(VertexAttributeValues::Float32(sizes)) = mesh.attribute(ATTRIBUTE_POINT_SIZE)
        else {
            panic!("missing point size attribute");
        };
        assert_eq!(&sizes[..], &[32.0, 32.0, 32.0, 32.0, 16.0, 16.0, 16.0, 16.0]);
    }

    #[test]
    fn colours_are_opaque() {
        let mesh = create_variable_points_mesh(&cloud());
        let Some(VertexAttributeValues::Float32x4(colours)) = mesh.attribute(Mesh::ATTRIBUTE_COLOR)
        else {
            panic!("missing colour attribute");
        };
        assert!(colours.iter().all(|c| c[3] == 1.0));
        assert_eq!(colours[4], [0.0, 1.0, 0.0, 1.0]);
    }
}
