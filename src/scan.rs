use std::io;
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressIterator};
use log::{debug, info, warn};
use regex::Regex;
use walkdir::WalkDir;

use crate::config::{FeatureConfig, split_list};
use crate::error::{Error, Result};
use crate::feature::{self, FeatureVector};
use crate::route::Router;
use crate::utils::pb_style;

/// 文件后缀白名单，区分大小写，匹配最后一个 `.` 之后的部分
#[derive(Debug, Clone)]
pub struct ExtensionFilter {
    /// 白名单为空时不匹配任何文件
    re: Option<Regex>,
}

impl ExtensionFilter {
    pub fn new<S: AsRef<str>>(suffixes: &[S]) -> Self {
        if suffixes.is_empty() {
            return Self { re: None };
        }
        let alternatives =
            suffixes.iter().map(|s| regex::escape(s.as_ref())).collect::<Vec<_>>().join("|");
        let re = Regex::new(&format!("^(?:{alternatives})$")).expect("failed to build regex");
        Self { re: Some(re) }
    }

    /// 从逗号分隔的列表构造，例如 `jpg,png`
    pub fn parse(list: &str) -> Self {
        Self::new(&split_list(list))
    }

    /// 返回文件名的后缀（如果在白名单中）
    pub fn matches<'a>(&self, file_name: &'a str) -> Option<&'a str> {
        let (_, ext) = file_name.rsplit_once('.')?;
        self.re.as_ref()?.is_match(ext).then_some(ext)
    }
}

/// 扫描得到的一张图片
///
/// 聚类结果直接写回 `cluster`，文件名、向量和聚类编号始终在同一条记录里
#[derive(Debug, Clone)]
pub struct ImageRecord {
    pub file_name: String,
    pub extension: Option<String>,
    pub vector: FeatureVector,
    pub cluster: Option<usize>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// 目录中的条目数量
    pub entries: usize,
    /// 后缀匹配的普通文件数量
    pub matched: usize,
    /// 作为同组文件跟随主文件、不单独解码的文件数量
    pub siblings: usize,
    pub decoded: usize,
    /// 解码失败被跳过的文件数量
    pub skipped: usize,
}

/// 扫描目录（不递归）中的图片并提取特征向量
///
/// 只处理普通文件，符号链接和子目录会被忽略；解码失败的图片会被跳过。
/// 给定 `router` 时，能由其他图片推导出文件名的同组文件不会被解码。
/// 返回的记录按文件名排序。
pub fn scan(
    dir: &Path,
    filter: &ExtensionFilter,
    config: &FeatureConfig,
    router: Option<&Router>,
) -> Result<(Vec<ImageRecord>, ScanReport)> {
    let dir_err = |source: io::Error| Error::Directory { path: dir.to_path_buf(), source };

    info!("开始扫描目录: {}", dir.display());
    let mut report = ScanReport::default();
    let mut candidates: Vec<(PathBuf, String, String)> = vec![];

    for entry in WalkDir::new(dir).max_depth(1).follow_links(false).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => return Err(dir_err(io::Error::from(e))),
            Err(e) => {
                warn!("无法读取目录条目: {}", e);
                continue;
            }
        };
        if entry.depth() == 0 {
            if !entry.file_type().is_dir() {
                return Err(dir_err(io::Error::new(io::ErrorKind::NotADirectory, "不是目录")));
            }
            continue;
        }

        report.entries += 1;
        if !entry.file_type().is_file() {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if let Some(ext) = filter.matches(&file_name) {
            let ext = ext.to_owned();
            candidates.push((entry.into_path(), file_name, ext));
        }
    }
    report.matched = candidates.len();

    if let Some(router) = router {
        let names = candidates.iter().map(|(_, name, _)| name.as_str()).collect::<Vec<_>>();
        let mut mask = router.sibling_mask(&names).into_iter();
        candidates.retain(|(_, name, _)| {
            let sibling = mask.next().unwrap_or(false);
            if sibling {
                debug!("同组文件不单独解码: {}", name);
            }
            !sibling
        });
        report.siblings = report.matched - candidates.len();
    }

    let pb = ProgressBar::new(candidates.len() as u64).with_style(pb_style());
    let mut records = Vec::with_capacity(candidates.len());
    for (path, file_name, ext) in candidates.into_iter().progress_with(pb.clone()) {
        match feature::build(&path, config) {
            Ok(vector) => records.push(ImageRecord {
                file_name,
                extension: Some(ext),
                vector,
                cluster: None,
            }),
            Err(e) if e.is_recoverable() => {
                warn!("跳过无效或损坏的图片 {}: {}", file_name, e);
                report.skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }
    pb.finish_and_clear();

    report.decoded = records.len();
    info!(
        "扫描完成，共 {} 个条目，{} 张图片，同组文件 {} 个，成功 {} 张，跳过 {} 张",
        report.entries, report.matched, report.siblings, report.decoded, report.skipped
    );
    Ok((records, report))
}
