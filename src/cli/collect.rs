use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::Pipeline;
use crate::cli::SubCommandExtend;
use crate::config::{FeatureOptions, Opts, ScanOptions};
use crate::scan::ExtensionFilter;

#[derive(Parser, Debug, Clone)]
pub struct CollectCommand {
    #[command(flatten)]
    pub feature: FeatureOptions,
    #[command(flatten)]
    pub scan: ScanOptions,
    /// 图片所在目录
    pub images: PathBuf,
    /// 训练数据 CSV 文件，不存在时创建，存在时追加
    pub dataset: PathBuf,
}

impl SubCommandExtend for CollectCommand {
    fn run(&self, _opts: &Opts) -> Result<()> {
        let pipeline = Pipeline::new((&self.feature).into())
            .filter(ExtensionFilter::parse(&self.scan.suffix));
        let count = pipeline.collect(&self.images, &self.dataset)?;
        println!("{}", count);
        Ok(())
    }
}
