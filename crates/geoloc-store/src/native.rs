//! 原生场景文档（.geoloc）
//!
//! 带格式标识与版本号的 JSON 文档，保存场景名、对象列表（按创建顺序）与视图。

use crate::error::StoreError;
use crate::store::SceneData;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// 格式标识
const FORMAT: &str = "geoloc-scene";

/// 当前文档格式版本
const FORMAT_VERSION: u32 = 1;

/// 文档内容
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    pub format: String,
    pub version: u32,
    pub name: String,
    #[serde(flatten)]
    pub scene: SceneData,
}

impl SceneDocument {
    pub fn new(name: impl Into<String>, scene: SceneData) -> Self {
        Self {
            format: FORMAT.to_string(),
            version: FORMAT_VERSION,
            name: name.into(),
            scene,
        }
    }
}

/// 保存场景到文件
pub fn save(name: &str, scene: &SceneData, path: &Path) -> Result<(), StoreError> {
    let document = SceneDocument::new(name, scene.clone());

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &document)?;
    writer.flush()?;

    tracing::info!(
        "Saved scene '{}' ({} objects) to {}",
        name,
        scene.objects.len(),
        path.display()
    );

    Ok(())
}

/// 从文件加载场景
pub fn load(path: &Path) -> Result<SceneDocument, StoreError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let document: SceneDocument = serde_json::from_reader(reader)?;

    if document.format != FORMAT {
        return Err(StoreError::InvalidFormat(format!(
            "Unexpected format '{}', not a scene document",
            document.format
        )));
    }

    if document.version > FORMAT_VERSION {
        return Err(StoreError::UnsupportedVersion(format!(
            "Document version {} is newer than supported version {}",
            document.version, FORMAT_VERSION
        )));
    }

    tracing::info!(
        "Loaded scene '{}' ({} objects) from {}",
        document.name,
        document.scene.objects.len(),
        path.display()
    );

    Ok(document)
}
