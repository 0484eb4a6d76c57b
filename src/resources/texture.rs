use anyhow::Context;

use crate::resources::store::AssetStore;

/// Fetch and decode one image.
pub async fn load_image<S: AssetStore>(store: &S, name: &str) -> anyhow::Result<image::DynamicImage> {
    let bytes = store.load_binary(name).await?;
    image::load_from_memory(&bytes).with_context(|| format!("could not decode image {name}"))
}

/// Fetch and decode every image in `names` concurrently.
///
/// Failures are reported per image; one broken swatch does not stop the others.
pub async fn load_images<S: AssetStore>(
    store: &S,
    names: Vec<String>,
) -> Vec<(String, anyhow::Result<image::DynamicImage>)> {
    let loads = names.into_iter().map(|name| async move {
        let image = load_image(store, &name).await;
        (name, image)
    });
    futures::future::join_all(loads).await
}
