//! Loading of the demo's external files: the OBJ model with its MTL
//! library, the GUI image and the blur shader sources.

use std::{
    io::{BufReader, Cursor},
    path::{Path, PathBuf},
};

use anyhow::Context;

use crate::data_structures::{
    model::{self, Material, MaterialAttributes},
    texture::Texture,
};

pub mod mesh;
pub mod shader;
pub mod texture;

/// Resolves asset names against one root directory.
#[derive(Clone, Debug)]
pub struct Assets {
    root: PathBuf,
}

impl Assets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, name: impl AsRef<Path>) -> PathBuf {
        self.root.join(name)
    }

    pub async fn load_string(&self, name: impl AsRef<Path>) -> anyhow::Result<String> {
        let path = self.path(name);
        tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("reading {}", path.display()))
    }

    pub async fn load_binary(&self, name: impl AsRef<Path>) -> anyhow::Result<Vec<u8>> {
        let path = self.path(name);
        tokio::fs::read(&path)
            .await
            .with_context(|| format!("reading {}", path.display()))
    }

    pub async fn load_texture(
        &self,
        name: impl AsRef<Path>,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> anyhow::Result<Texture> {
        let name = name.as_ref();
        let data = self.load_binary(name).await?;
        Texture::from_bytes(device, queue, &data, &name.to_string_lossy())
    }
}

/// Directory of `file_name` inside the asset root, used to resolve MTL and
/// texture references written relative to the OBJ file.
fn sibling_dir(file_name: &str) -> PathBuf {
    Path::new(file_name)
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default()
}

pub async fn load_model_obj(
    assets: &Assets,
    file_name: &str,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
) -> anyhow::Result<model::Model> {
    let obj_text = assets.load_string(file_name).await?;
    let base_dir = sibling_dir(file_name);
    let mut obj_reader = BufReader::new(Cursor::new(obj_text));

    let (models, obj_materials) = tobj::load_obj_buf_async(
        &mut obj_reader,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
        |p| {
            let path = base_dir.join(p);
            async move {
                match assets.load_string(&path).await {
                    Ok(mat_text) => tobj::load_mtl_buf(&mut BufReader::new(Cursor::new(mat_text))),
                    Err(e) => {
                        log::warn!("{e:#}");
                        Err(tobj::LoadError::OpenFileFailed)
                    }
                }
            }
        },
    )
    .await
    .with_context(|| format!("parsing {file_name}"))?;

    let obj_materials = obj_materials.unwrap_or_else(|e| {
        log::warn!("{file_name} has no usable material library ({e}), using white");
        Vec::new()
    });

    let mut materials =
        texture::load_materials(assets, &base_dir, &obj_materials, device, queue, layout).await?;
    // Meshes without a material (or pointing past the library) share one white fallback.
    let fallback = materials.len();
    let mut needs_fallback = false;

    let meshes = mesh::load_meshes(&models, file_name, device)
        .into_iter()
        .enumerate()
        .filter_map(|(idx, result)| match result {
            Ok(mut mesh) => {
                if mesh.material >= fallback {
                    mesh.material = fallback;
                    needs_fallback = true;
                }
                Some(mesh)
            }
            Err(e) => {
                log::warn!("Mesh at index {idx} in file {file_name} was skipped: {e}");
                None
            }
        })
        .collect::<Vec<_>>();

    if needs_fallback {
        let white = Texture::create_solid(device, queue, [255; 4], 1, 1, "white");
        materials.push(Material::new(
            device,
            "fallback",
            white,
            MaterialAttributes::default(),
            layout,
        ));
    }

    log::info!(
        "loaded {file_name}: {} meshes, {} materials",
        meshes.len(),
        materials.len()
    );
    Ok(model::Model { meshes, materials })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sibling_dir_of_nested_model() {
        assert_eq!(
            sibling_dir("models/Low poly House.obj"),
            PathBuf::from("models")
        );
        assert_eq!(sibling_dir("house.obj"), PathBuf::new());
    }

    #[test]
    fn paths_join_the_root() {
        let assets = Assets::new("/data/assets");
        assert_eq!(
            assets.path("shaders/blur.vert.wgsl"),
            PathBuf::from("/data/assets/shaders/blur.vert.wgsl")
        );
    }

    #[tokio::test]
    async fn missing_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let assets = Assets::new(dir.path());
        let err = assets.load_string("nope.txt").await.unwrap_err();
        assert!(format!("{err:#}").contains("nope.txt"));
    }

    #[tokio::test]
    async fn reads_text_assets() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "hello").unwrap();
        let assets = Assets::new(dir.path());
        assert_eq!(assets.load_string("a.txt").await.unwrap(), "hello");
    }
}
