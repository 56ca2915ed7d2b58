use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::info;

use super::{encode_row, read_rows};
use crate::error::{Error, Result};
use crate::feature::FeatureVector;
use crate::utils::ensure_parent_dir;

/// 将向量追加到训练数据 CSV，文件不存在时创建
///
/// 不会检查重复，同一批图片追加两次就会得到两份数据。返回追加的行数。
pub fn append<'a, I>(path: &Path, vectors: I) -> Result<usize>
where
    I: IntoIterator<Item = &'a FeatureVector>,
{
    let io_err = |source: std::io::Error| Error::Persistence { path: path.to_path_buf(), source };

    ensure_parent_dir(path).map_err(io_err)?;
    let file = OpenOptions::new().create(true).append(true).open(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);

    let mut count = 0;
    for vector in vectors {
        writer.write_all(encode_row(vector).as_bytes()).map_err(io_err)?;
        count += 1;
    }
    writer.flush().map_err(io_err)?;

    info!("向 {} 追加了 {} 行训练数据", path.display(), count);
    Ok(count)
}

/// 读取训练数据 CSV，每行必须恰好有 `dims` 个值
pub fn load(path: &Path, dims: usize) -> Result<Vec<FeatureVector>> {
    let vectors = read_rows(path, Some(dims))?;
    info!("从 {} 读取了 {} 行训练数据", path.display(), vectors.len());
    Ok(vectors)
}
