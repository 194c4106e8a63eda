//! Waterfront scene: a walled keep on a stone island, wire fence, billboard trees and an
//! animated lake.

use anyhow::{Context, Result};
use glam::{Mat4, Vec2, Vec3, Vec4};
use tidewater_engine::render::{SpriteVertex, TextureData};
use tidewater_engine::scene::{
    DrawLayer, GeometryProvider, Material, MaterialHandle, Mesh, MeshVertices, Scene,
};
use tidewater_engine::waves::{DisturbanceConfig, WaveConfig, WaveSimulation};

use crate::shapes::{create_box, create_cylinder, create_grid, ShapeSet};
use crate::textures;

/// Everything the app needs before a GPU exists.
pub struct DemoScene {
    pub scene: Scene,
    pub waves: WaveSimulation,
    pub textures: Vec<TextureData>,
    pub water: MaterialHandle,
}

/// Water scroll rate in texture units per second.
pub const WATER_SCROLL: Vec2 = Vec2::new(0.1, 0.02);

const WATER_LEVEL: f32 = -1.0;

pub fn build(ring_size: usize, waves: &WaveConfig, disturbances: &DisturbanceConfig) -> Result<DemoScene> {
    let sim = WaveSimulation::new(waves, disturbances).context("invalid wave settings")?;
    let mut scene = Scene::new(ring_size)?;

    scene.meshes_mut().insert(
        ShapeSet::default()
            .push("box", create_box(1.0, 1.0, 1.0))
            .push("grid", create_grid(1.0, 1.0, 16, 16))
            .push("cylinder", create_cylinder(0.5, 1.0, 20, 4))
            .into_mesh("shapes"),
    )?;
    scene.meshes_mut().insert(Mesh::new(
        "water",
        MeshVertices::Dynamic {
            count: sim.field().vertex_count(),
        },
        sim.field().indices(),
    ))?;
    scene
        .meshes_mut()
        .insert(Mesh::new("trees", MeshVertices::Sprites(tree_sprites()), Vec::new()))?;

    let materials = scene.materials_mut();
    let grass = materials.insert(
        Material::new("grass", textures::GRASS).with_fresnel(Vec3::splat(0.01), 0.125),
    )?;
    let water = materials.insert(
        Material::new("water", textures::WATER)
            .with_albedo(Vec4::new(1.0, 1.0, 1.0, 0.5))
            .with_fresnel(Vec3::splat(0.1), 0.0),
    )?;
    let fence = materials.insert(
        Material::new("wirefence", textures::FENCE).with_fresnel(Vec3::splat(0.02), 0.25),
    )?;
    let brick = materials.insert(
        Material::new("brick", textures::BRICK).with_fresnel(Vec3::splat(0.01), 0.125),
    )?;
    let stone = materials.insert(
        Material::new("stone", textures::STONE).with_fresnel(Vec3::splat(0.01), 0.125),
    )?;
    let tile = materials.insert(
        Material::new("tile", textures::TILE).with_fresnel(Vec3::splat(0.01), 0.125),
    )?;
    let trees = materials.insert(
        Material::new("treeSprites", textures::TREE).with_fresnel(Vec3::splat(0.01), 0.125),
    )?;

    let geo = |scene: &Scene, shape: &str| {
        scene
            .meshes()
            .resolve(shape)
            .with_context(|| format!("unknown shape '{shape}'"))
    };
    let tiled = |u: f32, v: f32| Mat4::from_scale(Vec3::new(u, v, 1.0));
    let place = |scale: Vec3, pos: Vec3| Mat4::from_translation(pos) * Mat4::from_scale(scale);

    // Island and keep.
    let grid = geo(&scene, "shapes/grid")?;
    let cube = geo(&scene, "shapes/box")?;
    let cylinder = geo(&scene, "shapes/cylinder")?;

    scene.add_item(
        DrawLayer::Opaque,
        grid,
        grass,
        place(Vec3::new(40.0, 1.0, 40.0), Vec3::ZERO),
        tiled(8.0, 8.0),
    )?;
    scene.add_item(
        DrawLayer::Opaque,
        cube,
        stone,
        place(Vec3::new(14.0, 0.5, 10.0), Vec3::new(0.0, 0.25, 0.0)),
        tiled(4.0, 3.0),
    )?;
    scene.add_item(
        DrawLayer::Opaque,
        cube,
        tile,
        place(Vec3::new(6.0, 4.0, 4.0), Vec3::new(0.0, 2.5, 0.0)),
        tiled(1.0, 1.0),
    )?;
    scene.add_item(
        DrawLayer::Opaque,
        cube,
        brick,
        place(Vec3::new(3.0, 2.0, 2.0), Vec3::new(0.0, 5.5, 0.0)),
        tiled(1.0, 1.0),
    )?;
    for (x, z) in [(-6.0, -4.0), (6.0, -4.0), (-6.0, 4.0), (6.0, 4.0)] {
        scene.add_item(
            DrawLayer::Opaque,
            cylinder,
            brick,
            place(Vec3::new(2.0, 6.0, 2.0), Vec3::new(x, 3.5, z)),
            tiled(2.0, 3.0),
        )?;
    }

    // Wire fence along the shore.
    for (scale, pos) in [
        (Vec3::new(16.0, 2.0, 0.1), Vec3::new(0.0, 1.5, -8.0)),
        (Vec3::new(0.1, 2.0, 12.0), Vec3::new(-9.0, 1.5, -2.0)),
        (Vec3::new(0.1, 2.0, 12.0), Vec3::new(9.0, 1.5, -2.0)),
    ] {
        let u = scale.x.max(scale.z) / 2.0;
        scene.add_item(DrawLayer::AlphaTested, cube, fence, place(scale, pos), tiled(u, 1.0))?;
    }

    let tree_geo = geo(&scene, "trees")?;
    scene.add_item(DrawLayer::AlphaTestedSprites, tree_geo, trees, Mat4::IDENTITY, Mat4::IDENTITY)?;

    let water_geo = geo(&scene, "water")?;
    scene.add_item(
        DrawLayer::Transparent,
        water_geo,
        water,
        Mat4::from_translation(Vec3::new(0.0, WATER_LEVEL, 0.0)),
        tiled(5.0, 5.0),
    )?;

    log::info!(
        "scene: {} items, {} materials, {} wave vertices",
        scene.item_count(),
        scene.materials().len(),
        sim.field().vertex_count()
    );

    Ok(DemoScene {
        scene,
        waves: sim,
        textures: textures::load_all()?,
        water,
    })
}

/// Billboards around the island edge.
fn tree_sprites() -> Vec<SpriteVertex> {
    let size = Vec2::new(4.0, 6.0);
    let mut trees = Vec::new();
    for i in 0..12 {
        let angle = i as f32 / 12.0 * std::f32::consts::TAU;
        let radius = if i % 2 == 0 { 14.0 } else { 16.5 };
        let pos = Vec3::new(radius * angle.cos(), 0.5 * size.y, radius * angle.sin());
        trees.push(SpriteVertex::new(pos, size));
    }
    trees
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> DemoScene {
        let waves = WaveConfig {
            rows: 32,
            cols: 32,
            ..WaveConfig::default()
        };
        let disturbances = DisturbanceConfig {
            seed: Some(3),
            ..DisturbanceConfig::default()
        };
        build(3, &waves, &disturbances).unwrap()
    }

    #[test]
    fn every_layer_is_populated() {
        let demo = small();
        for layer in DrawLayer::ALL {
            assert!(!demo.scene.layer(layer).is_empty(), "{layer:?} empty");
        }
        assert_eq!(demo.scene.draw_calls(DrawLayer::Opaque).len(), 8);
        assert_eq!(demo.scene.draw_calls(DrawLayer::AlphaTested).len(), 3);
    }

    #[test]
    fn materials_reference_loaded_textures() {
        let demo = small();
        for m in demo.scene.materials().iter() {
            assert!((m.texture_index as usize) < demo.textures.len(), "{}", m.name);
        }
        assert_eq!(demo.scene.materials().resolve("water"), Some((1, textures::WATER)));
    }

    #[test]
    fn water_mesh_matches_simulation() {
        let demo = small();
        let (_, count) = demo.scene.meshes().dynamic().unwrap();
        assert_eq!(count, demo.waves.field().vertex_count());
        assert_eq!(demo.scene.slot_capacity().dynamic_vertices, 32 * 32);
    }
}
