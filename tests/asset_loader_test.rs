use product_viewer::{
    Rgb,
    error::{LoadStage, MaterialMissing},
    resources::{AssetLoader, FileStore, MemoryStore, texture::load_images},
};

use crate::common::test_utils::{BOX_MTL, BOX_OBJ, box_store};
mod common;

#[tokio::test]
async fn loads_every_object_of_the_obj() {
    let mut loader = AssetLoader::new(box_store());
    let object = loader.load("box.obj", "box.mtl").await.unwrap();

    let names: Vec<_> = object.meshes().iter().map(|m| m.name.clone()).collect();
    assert_eq!(names, vec!["body", "lid", "flap"]);
    assert_eq!(object.meshes()[0].geometry.triangle_count(), 4);
    assert_eq!(object.meshes()[2].geometry.triangle_count(), 1);
    assert_eq!(loader.store().requests(), vec!["box.mtl", "box.obj"]);
}

#[tokio::test]
async fn meshes_are_bound_to_their_source_materials() {
    let mut loader = AssetLoader::new(box_store());
    let object = loader.load("box.obj", "box.mtl").await.unwrap();
    let meshes = object.meshes();

    let body = meshes[0].source_material.as_ref().unwrap();
    assert_eq!(body.name, "cardboard");
    assert_eq!(body.diffuse, Some(Rgb::from_unit([0.8, 0.7, 0.5])));
    assert_eq!(body.diffuse_texture.as_deref(), Some("cardboard.png"));
    assert_eq!(meshes[0].material().texture.as_deref(), Some("cardboard.png"));

    let flap = meshes[2].source_material.as_ref().unwrap();
    assert_eq!(flap.name, "print");
    assert_eq!(meshes[2].material().base_color, Some(Rgb::WHITE));
}

#[tokio::test]
async fn texture_coordinates_are_flipped() {
    let mut loader = AssetLoader::new(box_store());
    let object = loader.load("box.obj", "box.mtl").await.unwrap();

    for mesh in object.meshes() {
        let geometry = &mesh.geometry;
        assert_eq!(geometry.positions.len(), geometry.tex_coords.len());
        assert!(geometry.tex_coords.iter().all(|[_, v]| (0.0..=1.0).contains(v)));
    }
    let flap = &object.meshes()[2].geometry;
    // vt 0 0 is the first corner of the flap
    assert_eq!(flap.tex_coords[0], [0.0, 1.0]);
}

#[tokio::test]
async fn missing_material_library_stops_before_geometry() {
    let store = MemoryStore::new().with("box.obj", BOX_OBJ);
    let mut loader = AssetLoader::new(store);

    let err = loader.load("box.obj", "box.mtl").await.unwrap_err();

    assert_eq!(err.stage, LoadStage::Material);
    assert_eq!(loader.store().requests(), vec!["box.mtl"]);
    assert!(loader.materials().is_none());
    assert!(err.to_string().contains("material"));
}

#[tokio::test]
async fn geometry_before_materials_is_refused() {
    let loader = AssetLoader::new(box_store());

    let err = loader.fetch_geometry("box.obj").await.unwrap_err();

    assert_eq!(err.stage, LoadStage::Geometry);
    assert!(err.cause.downcast_ref::<MaterialMissing>().is_some());
    assert!(loader.store().requests().is_empty());
}

#[tokio::test]
async fn missing_geometry_is_a_geometry_error() {
    let store = MemoryStore::new().with("box.mtl", BOX_MTL);
    let mut loader = AssetLoader::new(store);

    let err = loader.load("box.obj", "box.mtl").await.unwrap_err();

    assert_eq!(err.stage, LoadStage::Geometry);
    assert!(loader.materials().is_some());
}

#[tokio::test]
async fn malformed_geometry_is_a_geometry_error() {
    let mut loader = AssetLoader::new(box_store());

    let err = loader.load("broken.obj", "box.mtl").await.unwrap_err();

    assert_eq!(err.stage, LoadStage::Geometry);
}

#[tokio::test]
async fn steps_can_run_separately() {
    let mut loader = AssetLoader::new(box_store());

    let library = loader.fetch_materials("box.mtl").await.unwrap();
    assert_eq!(library.materials.len(), 2);
    assert!(library.index.contains_key("print"));

    let object = loader.fetch_geometry("box.obj").await.unwrap();
    assert_eq!(object.mesh_count(), 3);
}

#[tokio::test]
async fn image_failures_are_reported_per_image() {
    let store = box_store();
    let names = vec![
        "swatch.png".to_string(),
        "garbage.png".to_string(),
        "absent.png".to_string(),
    ];

    let images = load_images(&store, names).await;

    assert_eq!(images.len(), 3);
    let swatch = images[0].1.as_ref().unwrap();
    assert_eq!((swatch.width(), swatch.height()), (2, 2));
    assert!(images[1].1.is_err());
    assert!(images[2].1.is_err());
}

#[tokio::test]
async fn stock_assets_load_from_disk() {
    let store = FileStore::new(concat!(env!("CARGO_MANIFEST_DIR"), "/assets"));
    let mut loader = AssetLoader::new(store);

    let object = loader.load("untitled.obj", "untitled.mtl").await.unwrap();
    assert_eq!(object.mesh_count(), 3);

    let images = load_images(loader.store(), vec!["carton.png".to_string(), "blanc.png".to_string()]).await;
    assert!(images.iter().all(|(_, image)| image.is_ok()));
}

#[tokio::test]
async fn default_config_reads_the_copied_assets() {
    let config = product_viewer::ViewerConfig::default();
    let mut loader = AssetLoader::new(FileStore::new(config.assets_root.clone()));

    let object = loader.load(&config.geometry, &config.materials).await.unwrap();
    assert!(object.mesh_count() > 0);
    let images = load_images(loader.store(), config.image_sources()).await;
    assert_eq!(images.len(), config.catalog.len());
}
