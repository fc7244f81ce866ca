//! Variable point material: screen-aligned disks sized and coloured per point.
use bevy::pbr::{MaterialPipeline, MaterialPipelineKey};
use bevy::render::mesh::MeshVertexBufferLayoutRef;
use bevy::render::render_resource::{
    RenderPipelineDescriptor, SpecializedMeshPipelineError,
};
use bevy::{
    prelude::*,
    reflect::TypePath,
    render::render_resource::{AsBindGroup, ShaderRef},
};
use constants::render_settings::{DISK_RADIUS, VARIABLE_POINTS_SHADER_PATH};

use super::mesh::ATTRIBUTE_POINT_SIZE;

/// Unlit material drawing each sprite quad as a disk of `size` pixels.
///
/// The vertex stage projects the point centre with `clip_from_world *
/// world_from_local`, then pushes each corner out by half the point size in
/// pixels using the view's viewport size. The fragment stage discards
/// everything at or beyond `disk_radius` from the sprite centre and writes the
/// point colour with alpha 1.
#[derive(Asset, TypePath, AsBindGroup, Debug, Clone)]
pub struct VariablePointsMaterial {
    #[uniform(0)]
    pub disk_radius: f32,
}

impl Default for VariablePointsMaterial {
    fn default() -> Self {
        Self {
            disk_radius: DISK_RADIUS,
        }
    }
}

impl Material for VariablePointsMaterial {
    fn vertex_shader() -> ShaderRef {
        VARIABLE_POINTS_SHADER_PATH.into()
    }

    fn fragment_shader() -> ShaderRef {
        VARIABLE_POINTS_SHADER_PATH.into()
    }

    fn specialize(
        _pipeline: &MaterialPipeline<Self>,
        descriptor: &mut RenderPipelineDescriptor,
        layout: &MeshVertexBufferLayoutRef,
        _key: MaterialPipelineKey<Self>,
    ) -> Result<(), SpecializedMeshPipelineError> {
        let vertex_layout = layout.0.get_layout(&[
            Mesh::ATTRIBUTE_POSITION.at_shader_location(0),
            Mesh::ATTRIBUTE_UV_0.at_shader_location(1),
            ATTRIBUTE_POINT_SIZE.at_shader_location(2),
            Mesh::ATTRIBUTE_COLOR.at_shader_location(3),
        ])?;
        descriptor.vertex.buffers = vec![vertex_layout];
        // Sprites face the camera but their winding depends on the projection.
        descriptor.primitive.cull_mode = None;
        Ok(())
    }
}

/// CPU mirror of the fragment discard rule. `point_coord` is the fragment's
/// normalised position inside the sprite, `(0.5, 0.5)` being the centre.
pub fn disk_covers(point_coord: Vec2, disk_radius: f32) -> bool {
    point_coord.distance(Vec2::splat(0.5)) < disk_radius
}
