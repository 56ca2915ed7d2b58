use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::{debug, info, warn};

use crate::error::{Error, Result};

/// 由主文件名推导同组文件名的规则
pub trait NameCorrelation {
    /// 返回与 `file_name` 属于同一张图片、后缀为 `sibling_ext` 的文件名
    fn sibling_name(&self, file_name: &str, sibling_ext: &str) -> String;
}

fn split_ext(file_name: &str) -> (&str, &str) {
    file_name.rsplit_once('.').unwrap_or((file_name, ""))
}

/// 同组文件与主文件只有后缀不同
#[derive(Debug, Clone, Copy, Default)]
pub struct SameStem;

impl NameCorrelation for SameStem {
    fn sibling_name(&self, file_name: &str, sibling_ext: &str) -> String {
        let (stem, _) = split_ext(file_name);
        format!("{stem}.{sibling_ext}")
    }
}

/// 主文件（缩略图）的文件名比其他同组文件多一个后缀，例如
/// `img_1_thumbnail.jpeg` 对应 `img_1.png`
#[derive(Debug, Clone)]
pub struct StripAffix {
    affix: String,
}

impl StripAffix {
    pub fn new(affix: impl Into<String>) -> Self {
        Self { affix: affix.into() }
    }
}

impl NameCorrelation for StripAffix {
    fn sibling_name(&self, file_name: &str, sibling_ext: &str) -> String {
        let (stem, ext) = split_ext(file_name);
        let stem = if sibling_ext == ext {
            stem
        } else {
            stem.strip_suffix(self.affix.as_str()).unwrap_or(stem)
        };
        format!("{stem}.{sibling_ext}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteMode {
    /// 训练时复制文件
    Copy,
    /// 预测时移动文件
    Move,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteReport {
    pub routed: usize,
    /// 不存在而被跳过的同组文件数量
    pub missing: usize,
    pub failed: usize,
}

/// 将文件复制或移动到 `<output>/<cluster>/` 目录
pub struct Router {
    siblings: Vec<String>,
    correlation: Box<dyn NameCorrelation>,
    mode: RouteMode,
}

impl Router {
    /// `siblings` 为空时只处理文件本身
    pub fn new(
        siblings: Vec<String>,
        correlation: Box<dyn NameCorrelation>,
        mode: RouteMode,
    ) -> Self {
        Self { siblings, correlation, mode }
    }

    fn file_names(&self, file_name: &str) -> Vec<String> {
        if self.siblings.is_empty() {
            return vec![file_name.to_owned()];
        }
        self.siblings.iter().map(|ext| self.correlation.sibling_name(file_name, ext)).collect()
    }

    /// 以 `file_name` 为主文件时，其他后缀的同组文件名
    fn derived_names<'a>(&'a self, file_name: &'a str) -> impl Iterator<Item = String> + 'a {
        self.file_names(file_name).into_iter().filter(move |name| name != file_name)
    }

    /// 标记 `names` 中哪些文件是其他文件的同组文件
    ///
    /// 同组文件只跟随主文件移动，不参与解码和聚类。两个文件互为同组文件时保留排在前面的一个。
    pub fn sibling_mask<S: AsRef<str>>(&self, names: &[S]) -> Vec<bool> {
        let index = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_ref(), i))
            .collect::<HashMap<_, _>>();

        let mut mask = vec![false; names.len()];
        for (i, name) in names.iter().enumerate() {
            let name = name.as_ref();
            for derived in self.derived_names(name) {
                let Some(&j) = index.get(derived.as_str()) else { continue };
                let mutual = self.derived_names(&derived).any(|n| n == name);
                if !mutual || i < j {
                    mask[j] = true;
                }
            }
        }
        mask
    }

    /// 按聚类结果处理每个文件及其同组文件
    ///
    /// 无法创建目标目录时立即返回错误，已处理的文件不会回滚；
    /// 单个文件复制或移动失败只记录日志。
    pub fn route<'a, I>(&self, input: &Path, output: &Path, assignments: I) -> Result<RouteReport>
    where
        I: IntoIterator<Item = (&'a str, usize)>,
    {
        let mut report = RouteReport::default();
        for (file_name, cluster) in assignments {
            let dir = output.join(cluster.to_string());
            fs::create_dir_all(&dir)
                .map_err(|source| Error::Routing { path: dir.clone(), source })?;

            for name in self.file_names(file_name) {
                let src = input.join(&name);
                if !src.is_file() {
                    debug!("同组文件不存在，跳过: {}", src.display());
                    report.missing += 1;
                    continue;
                }
                let dst = dir.join(&name);
                let result = match self.mode {
                    RouteMode::Copy => fs::copy(&src, &dst).map(|_| ()),
                    RouteMode::Move => fs::rename(&src, &dst),
                };
                match result {
                    Ok(()) => {
                        debug!("{} -> {}", src.display(), dst.display());
                        report.routed += 1;
                    }
                    Err(e) => {
                        warn!("无法处理文件 {}: {}", src.display(), e);
                        report.failed += 1;
                    }
                }
            }
        }
        info!(
            "文件整理完成，成功 {} 个，不存在 {} 个，失败 {} 个",
            report.routed, report.missing, report.failed
        );
        Ok(report)
    }
}
