//! 特征向量的 CSV 存储
//!
//! 每行一个向量，每个值后面都跟一个逗号（包括最后一个），以 `\n` 结尾：
//!
//! ```text
//! 0.501961,0.498039,0.003922,
//! ```

mod centroids;
mod dataset;

use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

pub use centroids::*;
pub use dataset::*;

use crate::error::{Error, Result};
use crate::feature::FeatureVector;

/// 将一个向量编码为一行 CSV（包含换行符）
pub fn encode_row(vector: &[f32]) -> String {
    let mut row = String::with_capacity(vector.len() * 10);
    for v in vector {
        // 保留 6 位小数，与 C 的 %f 一致
        let _ = write!(row, "{v:.6},");
    }
    row.push('\n');
    row
}

/// 解析一行 CSV，末尾的逗号可有可无
pub fn decode_row(row: &str) -> std::result::Result<Vec<f32>, String> {
    let row = row.trim_end();
    let row = row.strip_suffix(',').unwrap_or(row);
    row.split(',')
        .map(|field| {
            let field = field.trim();
            field.parse::<f32>().map_err(|_| format!("无效的数值 {field:?}"))
        })
        .collect()
}

/// 读取 CSV 中的所有向量
///
/// 给定 `dims` 时每行必须恰好有 `dims` 个值，否则所有行的长度必须与第一行相同
fn read_rows(path: &Path, dims: Option<usize>) -> Result<Vec<FeatureVector>> {
    let io_err = |source: std::io::Error| Error::Persistence { path: path.to_path_buf(), source };
    let file = File::open(path).map_err(io_err)?;

    let mut expected = dims;
    let mut vectors = vec![];
    for (i, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(io_err)?;
        if line.trim().is_empty() {
            continue;
        }
        let format_err =
            |reason: String| Error::Format { path: path.to_path_buf(), line: i + 1, reason };
        let values = decode_row(&line).map_err(format_err)?;
        let want = *expected.get_or_insert(values.len());
        if values.len() != want {
            return Err(format_err(format!("期望 {} 个值，实际 {} 个", want, values.len())));
        }
        vectors.push(FeatureVector::new(values));
    }
    Ok(vectors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_row() {
        assert_eq!(encode_row(&[0.5, 1.0, 128.0]), "0.500000,1.000000,128.000000,\n");
        assert_eq!(encode_row(&[]), "\n");
    }

    #[test]
    fn test_decode_row() {
        assert_eq!(decode_row("0.500000,1.000000,\n").unwrap(), vec![0.5, 1.0]);
        assert_eq!(decode_row("0.25,3").unwrap(), vec![0.25, 3.0]);
        assert!(decode_row("0.25,,3,").is_err());
        assert!(decode_row("0.25,abc,").is_err());
    }
}
