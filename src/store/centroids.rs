use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::info;

use super::{encode_row, read_rows};
use crate::error::{Error, Result};
use crate::feature::FeatureVector;
use crate::utils::ensure_parent_dir;

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = OsString::from(path.as_os_str());
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

/// 写入聚类中心，行号即聚类编号
///
/// 先写入临时文件再重命名，覆盖已有的文件
pub fn write_centroids(path: &Path, centroids: &[FeatureVector]) -> Result<()> {
    let io_err = |source: std::io::Error| Error::Persistence { path: path.to_path_buf(), source };

    ensure_parent_dir(path).map_err(io_err)?;
    let tmp = tmp_path(path);
    let mut writer = BufWriter::new(File::create(&tmp).map_err(io_err)?);
    for centroid in centroids {
        writer.write_all(encode_row(centroid).as_bytes()).map_err(io_err)?;
    }
    writer
        .into_inner()
        .map_err(|e| io_err(e.into_error()))?
        .sync_all()
        .map_err(io_err)?;
    fs::rename(&tmp, path).map_err(io_err)?;

    info!("已写入 {} 个聚类中心到 {}", centroids.len(), path.display());
    Ok(())
}

/// 读取聚类中心，每行长度必须等于 `dims`
pub fn read_centroids(path: &Path, dims: usize) -> Result<Vec<FeatureVector>> {
    let centroids = read_rows(path, None)?;
    if centroids.is_empty() {
        return Err(Error::Format {
            path: path.to_path_buf(),
            line: 1,
            reason: "没有聚类中心".to_string(),
        });
    }
    if let Some(c) = centroids.iter().find(|c| c.len() != dims) {
        return Err(Error::DimensionMismatch { expected: dims, actual: c.len() });
    }
    Ok(centroids)
}
