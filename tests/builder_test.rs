use std::path::Path;

use mdl_convert::{
    ConvertError, Image, ResourceManager,
    builder::{ModelBuilder, to_material},
    data_structures::material::MAX_MATERIAL_NAME_LEN,
    resources::{SourceMaterial, SourceMesh},
};

use crate::common::test_utils::{FailingCodec, SolidCodec, shape, triangle_mesh, two_shape_mesh};

mod common;

fn codec() -> SolidCodec {
    SolidCodec(Image::solid(2, 2, [0, 255, 0, 255]))
}

#[test]
fn single_triangle_without_materials() -> anyhow::Result<()> {
    let mut rm = ResourceManager::with_fresh_pools();
    let codec = codec();

    let handle = ModelBuilder::new(&mut rm, &codec, Path::new("textures")).build("tri", &triangle_mesh())?;

    let model = rm.model(handle)?;
    assert_eq!(model.name, "tri");
    assert_eq!(model.surfaces.len(), 1);
    assert_eq!(model.material_count(), 0);

    let surface = model.surfaces[0];
    assert_eq!(surface.vertex_count(), 3);
    assert_eq!(surface.ib_end - surface.ib_offset, 3);
    assert_eq!(surface.material_id, 0);
    assert_eq!(rm.indices(model.ib, surface.index_range())?, &[0, 1, 2]);
    assert!(model.resolve_material(&rm, &surface)?.is_none());
    Ok(())
}

#[test]
fn shapes_share_one_vertex_range() -> anyhow::Result<()> {
    let mut rm = ResourceManager::with_fresh_pools();
    let codec = codec();

    let handle = ModelBuilder::new(&mut rm, &codec, Path::new("textures")).build("pair", &two_shape_mesh())?;

    let model = rm.model(handle)?;
    let [a, b] = [model.surfaces[0], model.surfaces[1]];
    assert_eq!(a.vertex_range(), b.vertex_range());
    assert_eq!(a.vertex_count(), 4);
    assert_eq!(rm.vertex_pool(model.vb)?.len(), 4);
    assert_eq!(a.index_range(), 0..3);
    assert_eq!(b.index_range(), 3..6);
    assert_eq!(rm.indices(model.ib, b.index_range())?, &[1, 3, 2]);
    Ok(())
}

#[test]
fn indices_stay_inside_their_surface() -> anyhow::Result<()> {
    let mut rm = ResourceManager::with_fresh_pools();
    let codec = codec();
    // Something already sits in the pools, so absolute and local indices differ.
    ModelBuilder::new(&mut rm, &codec, Path::new("textures")).build("first", &triangle_mesh())?;

    let handle = ModelBuilder::new(&mut rm, &codec, Path::new("textures")).build("second", &two_shape_mesh())?;

    let model = rm.model(handle)?;
    for surface in &model.surfaces {
        assert!(surface.is_well_formed());
        assert_eq!(surface.index_count() % 3, 0);
        assert_eq!(surface.vb_offset, 3);
        for &index in rm.indices(model.ib, surface.index_range())? {
            assert!(
                surface.vertex_range().contains(&index),
                "index {index} outside {:?}",
                surface.vertex_range()
            );
        }
    }
    Ok(())
}

#[test]
fn material_comes_from_first_face() -> anyhow::Result<()> {
    let mut rm = ResourceManager::with_fresh_pools();
    let codec = codec();
    let mut mesh = two_shape_mesh();
    // Later faces with other materials do not split or override the surface.
    let mut mixed = shape("mixed", &[[0, 1, 2]], Some(1));
    mixed.faces.extend(shape("", &[[1, 3, 2]], Some(0)).faces);
    mesh.shapes = vec![mixed];

    let handle = ModelBuilder::new(&mut rm, &codec, Path::new("textures")).build("mixed", &mesh)?;

    let model = rm.model(handle)?;
    assert_eq!(model.surfaces.len(), 1);
    assert_eq!(model.surfaces[0].material_id, 1);
    let material = model
        .resolve_material(&rm, &model.surfaces[0])?
        .expect("material 1 exists");
    assert_eq!(material.name, "checker");
    Ok(())
}

#[test]
fn oversized_material_reference_resolves_to_nothing() -> anyhow::Result<()> {
    let mut rm = ResourceManager::with_fresh_pools();
    let codec = codec();
    let mut mesh = two_shape_mesh();
    mesh.shapes = vec![shape("far", &[[0, 1, 2]], Some(usize::MAX))];

    let handle = ModelBuilder::new(&mut rm, &codec, Path::new("textures")).build("far", &mesh)?;

    let model = rm.model(handle)?;
    assert_eq!(model.surfaces[0].material_id, u32::MAX);
    assert!(model.resolve_material(&rm, &model.surfaces[0])?.is_none());
    Ok(())
}

#[test]
fn textured_materials_keep_their_image() -> anyhow::Result<()> {
    let mut rm = ResourceManager::with_fresh_pools();
    let codec = codec();

    let handle = ModelBuilder::new(&mut rm, &codec, Path::new("textures")).build("pair", &two_shape_mesh())?;

    let model = rm.model(handle)?;
    let plain = rm.material(model.materials[0])?;
    let textured = rm.material(model.materials[1])?;
    assert!(!plain.textured);
    assert!(plain.image.is_none());
    assert!(textured.textured);
    assert_eq!(textured.shininess, 16.0);
    assert_eq!(textured.illumination_model, 2);
    let image = textured.image.expect("textured material has an image");
    assert_eq!(rm.image(image)?, &Image::solid(2, 2, [0, 255, 0, 255]));
    assert_eq!(rm.image_count(), 1);
    Ok(())
}

#[test]
fn failing_texture_leaves_pools_untouched() -> anyhow::Result<()> {
    let mut rm = ResourceManager::with_fresh_pools();

    let result = ModelBuilder::new(&mut rm, &FailingCodec, Path::new("textures")).build("pair", &two_shape_mesh());

    assert!(matches!(result, Err(ConvertError::ImageDecodeFailure { .. })));
    assert_eq!(rm.vb_offset()?, 0);
    assert_eq!(rm.ib_offset()?, 0);
    assert_eq!(rm.model_count(), 0);
    assert_eq!(rm.material_count(), 0);
    Ok(())
}

#[test]
fn zero_shapes_give_zero_surfaces() -> anyhow::Result<()> {
    let mut rm = ResourceManager::with_fresh_pools();
    let codec = codec();

    let handle = ModelBuilder::new(&mut rm, &codec, Path::new("textures")).build("empty", &SourceMesh::default())?;

    let model = rm.model(handle)?;
    assert!(model.surfaces.is_empty());
    assert_eq!(model.vertex_range(), 0..0);
    Ok(())
}

#[test]
fn building_needs_pushed_pools() {
    let mut rm = ResourceManager::new();
    let codec = codec();

    let result = ModelBuilder::new(&mut rm, &codec, Path::new("textures")).build("tri", &triangle_mesh());

    assert!(matches!(result, Err(ConvertError::NoCurrentPool(_))));
}

#[test]
fn long_material_names_are_truncated() {
    let source = SourceMaterial {
        name: "é".repeat(MAX_MATERIAL_NAME_LEN),
        ..Default::default()
    };

    let material = to_material(&source);

    assert!(material.name.len() <= MAX_MATERIAL_NAME_LEN);
    assert_eq!(material.name, "é".repeat(MAX_MATERIAL_NAME_LEN / 2));
}
